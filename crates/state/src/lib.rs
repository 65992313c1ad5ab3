//! # cinder-state
//!
//! The account/storage model the journal operates on, and the read-only
//! backing-store interface it loads from.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod account;
mod db;

pub use account::{Account, AccountInfo, AccountStatus, StorageSlot};
pub use db::{Database, EmptyDb, InMemoryDb};

use primitives::{Address, HashMap, U256};

/// The in-memory world state: every account touched by the transaction.
pub type EvmState = HashMap<Address, Account>;

/// Per-account storage cache.
pub type EvmStorage = HashMap<U256, StorageSlot>;

/// EIP-1153 transient storage, keyed by `(address, slot)`.
pub type TransientStorage = HashMap<(Address, U256), U256>;
