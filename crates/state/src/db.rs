//! The read-only backing store the journal loads world state from.

use crate::AccountInfo;
use bytecode::Bytecode;
use core::convert::Infallible;
use primitives::{keccak256, Address, HashMap, B256, KECCAK_EMPTY, U256};

/// Backing-store interface consumed by the journal.
///
/// Implementations are only ever read; all mutation goes through the journal
/// and is surfaced to the caller as the finalized state.
pub trait Database {
    /// Error the backing store can fail with.
    type Error;

    /// Basic account data, or `None` if the account does not exist.
    fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error>;

    /// Account code by its hash.
    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, Self::Error>;

    /// Value of a storage slot.
    fn storage(&mut self, address: Address, key: U256) -> Result<U256, Self::Error>;

    /// Hash of the block with the given number.
    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error>;
}

/// A backing store with nothing in it. Block hashes are keccak of the number,
/// so they are stable across calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyDb;

impl Database for EmptyDb {
    type Error = Infallible;

    fn basic(&mut self, _address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Ok(None)
    }

    fn code_by_hash(&mut self, _code_hash: B256) -> Result<Bytecode, Self::Error> {
        Ok(Bytecode::default())
    }

    fn storage(&mut self, _address: Address, _key: U256) -> Result<U256, Self::Error> {
        Ok(U256::ZERO)
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error> {
        Ok(keccak256(number.to_be_bytes()))
    }
}

/// A map-backed store for tests and small tools.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InMemoryDb {
    accounts: HashMap<Address, InMemoryAccount>,
    contracts: HashMap<B256, Bytecode>,
    block_hashes: HashMap<u64, B256>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct InMemoryAccount {
    info: AccountInfo,
    storage: HashMap<U256, U256>,
}

impl InMemoryDb {
    /// Inserts or replaces the basic data of an account. Code, if present,
    /// also lands in the contract map so `code_by_hash` can find it.
    pub fn insert_account_info(&mut self, address: Address, info: AccountInfo) {
        if let Some(code) = &info.code {
            if !code.is_empty() {
                self.contracts.insert(info.code_hash, code.clone());
            }
        }
        self.accounts.entry(address).or_default().info = info;
    }

    /// Inserts a single storage value.
    pub fn insert_account_storage(&mut self, address: Address, key: U256, value: U256) {
        self.accounts
            .entry(address)
            .or_default()
            .storage
            .insert(key, value);
    }

    /// Registers a block hash.
    pub fn insert_block_hash(&mut self, number: u64, hash: B256) {
        self.block_hashes.insert(number, hash);
    }
}

impl Database for InMemoryDb {
    type Error = Infallible;

    fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Ok(self.accounts.get(&address).map(|account| account.info.clone()))
    }

    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, Self::Error> {
        if code_hash == KECCAK_EMPTY {
            return Ok(Bytecode::default());
        }
        Ok(self.contracts.get(&code_hash).cloned().unwrap_or_default())
    }

    fn storage(&mut self, address: Address, key: U256) -> Result<U256, Self::Error> {
        Ok(self
            .accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key).copied())
            .unwrap_or(U256::ZERO))
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error> {
        if let Some(hash) = self.block_hashes.get(&number) {
            return Ok(*hash);
        }
        EmptyDb.block_hash(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::address;

    #[test]
    fn code_round_trips_through_hash() {
        let mut db = InMemoryDb::default();
        let code = Bytecode::new_raw(primitives::bytes!("6001"));
        let info = AccountInfo::new(U256::from(10), 0, code.clone());
        let hash = info.code_hash;
        db.insert_account_info(address!("0x1000000000000000000000000000000000000001"), info);
        assert_eq!(db.code_by_hash(hash).unwrap(), code);
    }

    #[test]
    fn missing_storage_reads_zero() {
        let mut db = InMemoryDb::default();
        let addr = address!("0x2000000000000000000000000000000000000002");
        assert_eq!(db.storage(addr, U256::from(3)).unwrap(), U256::ZERO);
        db.insert_account_storage(addr, U256::from(3), U256::from(42));
        assert_eq!(db.storage(addr, U256::from(3)).unwrap(), U256::from(42));
    }

    #[test]
    fn block_hash_is_stable() {
        let mut db = InMemoryDb::default();
        assert_eq!(db.block_hash(5).unwrap(), db.block_hash(5).unwrap());
        assert_ne!(db.block_hash(5).unwrap(), db.block_hash(6).unwrap());
    }
}
