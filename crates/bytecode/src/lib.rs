//! # cinder-bytecode
//!
//! Bytecode wrapper with jump-dest analysis, plus the static opcode tables
//! the dispatcher is built from.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod bytecode;
mod jump_table;
pub mod opcode;

pub use bytecode::Bytecode;
pub use jump_table::JumpTable;
pub use opcode::{OpInfo, OPCODE_INFO, OPCODE_NAMES};
