//! # cinder
//!
//! A stack-based EVM execution core: bytecode interpreter, call/create
//! trampoline, journaled world state and per-hardfork gas accounting.
//!
//! The [`Evm`] orchestrator drives one transaction: it validates the
//! environment, charges intrinsic gas, pushes a root frame and runs the
//! interpreter until it suspends, consuming suspension actions to spawn
//! child frames or settle finished ones against the journal.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod context;
mod evm;
mod frame;
pub mod journaled_state;

pub use context::Context;
pub use evm::{Evm, ResultAndState};
pub use journaled_state::{JournalCheckpoint, JournalEntry, JournaledState, TransferError};

// Re-export the component crates under their short names.
pub use bytecode;
pub use interpreter;
pub use precompile;
pub use primitives;
pub use state;

pub use primitives::{
    Env, EvmError, ExecutionResult, HaltReason, InvalidHeader, InvalidTransaction, Output,
    SpecId,
};
pub use state::{Database, EmptyDb, InMemoryDb};
