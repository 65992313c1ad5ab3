//! # cinder-primitives
//!
//! Primitive types shared by every cinder crate: 256-bit words, addresses,
//! hashes, the hardfork schedule, the execution environment and the
//! transaction result types.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod constants;
pub mod env;
pub mod hardfork;
mod log;
pub mod result;

pub use constants::*;
pub use env::{AnalysisKind, BlobExcessGasAndPrice, BlockEnv, CfgEnv, Env, TransactTo, TxEnv};
pub use hardfork::SpecId;
pub use log::Log;
pub use result::{
    EvmError, ExecutionResult, HaltReason, InvalidHeader, InvalidTransaction, Output,
    OutOfGasError, SuccessReason,
};

pub use alloy_primitives::{
    self, address, b256, bytes, fixed_bytes, hex, keccak256,
    map::{self, hash_map, hash_set, HashMap, HashSet},
    uint, Address, Bytes, FixedBytes, B256, I256, U256,
};
