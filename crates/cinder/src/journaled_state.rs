//! The journaled world state: an account cache over the backing store with
//! an append-only undo log, giving every call frame atomic rollback.

use bytecode::Bytecode;
use interpreter::{SStoreResult, SelfDestructResult, StateLoad};
use primitives::{
    hardfork::SpecId, hash_map::Entry, Address, HashSet, Log, B256, KECCAK_EMPTY, PRECOMPILE3,
    U256,
};
use state::{Account, Database, EvmState, StorageSlot, TransientStorage};
use std::vec::Vec;

/// World-state cache plus the undo log.
///
/// Every mutation appends an entry carrying enough information for exact
/// undo. A [`JournalCheckpoint`] is a pair of list lengths; reverting to it
/// walks the log backwards and truncates.
#[derive(Clone, Debug)]
pub struct JournaledState {
    /// Accounts touched by the transaction.
    pub state: EvmState,
    /// EIP-1153 transient storage, cleared at the end of the transaction.
    pub transient_storage: TransientStorage,
    /// Logs emitted so far.
    pub logs: Vec<Log>,
    /// The undo log; append-only within a checkpoint window.
    pub journal: Vec<JournalEntry>,
    /// Current call depth.
    pub depth: usize,
    /// Active hardfork; gates EIP-161 and EIP-6780 behavior.
    pub spec_id: SpecId,
    /// Addresses that count as warm on first touch: sender, target,
    /// precompiles and access-list entries.
    pub warm_preloaded_addresses: HashSet<Address>,
}

/// A restore point: lengths of the journal and the log list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JournalCheckpoint {
    /// Journal length at the checkpoint.
    pub journal_i: usize,
    /// Log count at the checkpoint.
    pub log_i: usize,
}

/// Reasons a balance movement or account creation can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferError {
    /// Sender balance is insufficient.
    OutOfFunds,
    /// Receiver balance would overflow.
    OverflowPayment,
    /// The create target already has a nonce or code.
    CreateCollision,
}

impl From<TransferError> for interpreter::InstructionResult {
    fn from(error: TransferError) -> Self {
        match error {
            TransferError::OutOfFunds => Self::OutOfFunds,
            TransferError::OverflowPayment => Self::OverflowPayment,
            TransferError::CreateCollision => Self::CreateCollision,
        }
    }
}

/// One undo-log entry. Each variant carries its exact inverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalEntry {
    /// A fresh backing-store load entered the cache cold. Revert evicts it.
    AccountLoaded {
        /// The loaded address.
        address: Address,
    },
    /// A cached account went from cold to warm. Revert re-colds it.
    AccountWarmed {
        /// The warmed address.
        address: Address,
    },
    /// An account was touched (EIP-161). Revert untouches it.
    AccountTouched {
        /// The touched address.
        address: Address,
    },
    /// Balance moved between two accounts. Revert moves it back.
    BalanceTransfer {
        /// Sender.
        from: Address,
        /// Receiver.
        to: Address,
        /// Amount moved.
        balance: U256,
    },
    /// A nonce was incremented. Revert restores the recorded value.
    NonceChanged {
        /// The account.
        address: Address,
        /// Nonce before the increment.
        old: u64,
    },
    /// Account code was replaced. Revert restores code and hash.
    CodeChanged {
        /// The account.
        address: Address,
        /// Code before the change.
        old_code: Option<Bytecode>,
        /// Code hash before the change.
        old_hash: B256,
    },
    /// A storage slot went from cold to warm. Revert re-colds it.
    StorageWarmed {
        /// The account.
        address: Address,
        /// The slot key.
        key: U256,
    },
    /// A storage slot was written. Revert restores the present value.
    StorageChanged {
        /// The account.
        address: Address,
        /// The slot key.
        key: U256,
        /// Present value before the write.
        had_value: U256,
    },
    /// A transient slot was written. Revert restores the previous value,
    /// removing the entry when it was zero.
    TransientSet {
        /// The account.
        address: Address,
        /// The slot key.
        key: U256,
        /// Previous value.
        had_value: U256,
    },
    /// An account was created in this transaction. Revert unmarks it and
    /// resets the nonce.
    AccountCreated {
        /// The created address.
        address: Address,
    },
    /// An account self-destructed, moving its balance. Revert restores the
    /// balance and, unless it was already destroyed, the mark.
    AccountDestroyed {
        /// The destroyed account.
        address: Address,
        /// The beneficiary.
        target: Address,
        /// Whether the account had already self-destructed this transaction.
        was_destroyed: bool,
        /// Balance moved to the beneficiary.
        had_balance: U256,
    },
}

impl JournaledState {
    /// Empty journal for the given hardfork.
    pub fn new(spec_id: SpecId, warm_preloaded_addresses: HashSet<Address>) -> Self {
        Self {
            state: EvmState::default(),
            transient_storage: TransientStorage::default(),
            logs: Vec::new(),
            journal: Vec::new(),
            depth: 0,
            spec_id,
            warm_preloaded_addresses,
        }
    }

    /// Current call depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The loaded account at `address`.
    ///
    /// # Panics
    ///
    /// Panics if the account was never loaded; frame setup always loads the
    /// accounts it operates on.
    #[inline]
    pub fn account(&self, address: Address) -> &Account {
        self.state
            .get(&address)
            .expect("account expected to be loaded")
    }

    /// Marks an account touched so state clearing can see it (EIP-161).
    pub fn touch(&mut self, address: &Address) {
        if let Some(account) = self.state.get_mut(address) {
            Self::touch_account(&mut self.journal, address, account);
        }
    }

    fn touch_account(journal: &mut Vec<JournalEntry>, address: &Address, account: &mut Account) {
        if !account.is_touched() {
            journal.push(JournalEntry::AccountTouched { address: *address });
            account.mark_touch();
        }
    }

    /// Loads an account from the cache or the backing store, marking it
    /// warm. Returns whether this was the first (cold) access.
    pub fn load_account<DB: Database>(
        &mut self,
        address: Address,
        db: &mut DB,
    ) -> Result<StateLoad<&mut Account>, DB::Error> {
        self.load_account_optional(address, false, db)
    }

    /// Like [`Self::load_account`], additionally materializing the code.
    pub fn load_code<DB: Database>(
        &mut self,
        address: Address,
        db: &mut DB,
    ) -> Result<StateLoad<&mut Account>, DB::Error> {
        self.load_account_optional(address, true, db)
    }

    fn load_account_optional<DB: Database>(
        &mut self,
        address: Address,
        load_code: bool,
        db: &mut DB,
    ) -> Result<StateLoad<&mut Account>, DB::Error> {
        let load = match self.state.entry(address) {
            Entry::Occupied(entry) => {
                let account = entry.into_mut();
                let is_cold = account.mark_warm();
                if is_cold {
                    self.journal.push(JournalEntry::AccountWarmed { address });
                }
                StateLoad::new(account, is_cold)
            }
            Entry::Vacant(vacant) => {
                let account = match db.basic(address)? {
                    Some(info) => info.into(),
                    None => Account::new_not_existing(),
                };
                let is_cold = !self.warm_preloaded_addresses.contains(&address);
                if is_cold {
                    self.journal.push(JournalEntry::AccountLoaded { address });
                }
                StateLoad::new(vacant.insert(account), is_cold)
            }
        };

        if load_code {
            let info = &mut load.data.info;
            if info.code.is_none() {
                let code = if info.code_hash == KECCAK_EMPTY {
                    Bytecode::default()
                } else {
                    db.code_by_hash(info.code_hash)?
                };
                info.code = Some(code);
            }
        }

        Ok(load)
    }

    /// Load used for access-list warming. Not journaled: these loads belong
    /// to the transaction itself, not to any frame.
    pub fn initial_account_load<DB: Database>(
        &mut self,
        address: Address,
        storage_keys: impl IntoIterator<Item = U256>,
        db: &mut DB,
    ) -> Result<&mut Account, DB::Error> {
        let account = match self.state.entry(address) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(vacant) => {
                let account = match db.basic(address)? {
                    Some(info) => info.into(),
                    None => Account::new_not_existing(),
                };
                vacant.insert(account)
            }
        };
        for key in storage_keys {
            if let Entry::Vacant(entry) = account.storage.entry(key) {
                let value = db.storage(address, key)?;
                let mut slot = StorageSlot::new(value);
                slot.is_cold = false;
                entry.insert(slot);
            }
        }
        Ok(account)
    }

    /// Moves `balance` from `from` to `to`. Both accounts are loaded and
    /// touched; a zero-value transfer only touches the receiver.
    pub fn transfer<DB: Database>(
        &mut self,
        from: &Address,
        to: &Address,
        balance: U256,
        db: &mut DB,
    ) -> Result<Option<TransferError>, DB::Error> {
        if balance.is_zero() {
            self.load_account(*to, db)?;
            let to_account = self.state.get_mut(to).unwrap();
            Self::touch_account(&mut self.journal, to, to_account);
            return Ok(None);
        }

        self.load_account(*from, db)?;
        self.load_account(*to, db)?;

        let from_account = self.state.get_mut(from).unwrap();
        Self::touch_account(&mut self.journal, from, from_account);
        let Some(from_balance) = from_account.info.balance.checked_sub(balance) else {
            return Ok(Some(TransferError::OutOfFunds));
        };
        from_account.info.balance = from_balance;

        let to_account = self.state.get_mut(to).unwrap();
        Self::touch_account(&mut self.journal, to, to_account);
        let Some(to_balance) = to_account.info.balance.checked_add(balance) else {
            // Roll the deduction back; nothing was journaled yet.
            self.state.get_mut(from).unwrap().info.balance += balance;
            return Ok(Some(TransferError::OverflowPayment));
        };
        to_account.info.balance = to_balance;

        self.journal.push(JournalEntry::BalanceTransfer {
            from: *from,
            to: *to,
            balance,
        });

        Ok(None)
    }

    /// Increments the nonce of a loaded account, journaling the old value.
    /// Returns `None` when the nonce is saturated.
    pub fn inc_nonce(&mut self, address: Address) -> Option<u64> {
        let account = self.state.get_mut(&address).unwrap();
        if account.info.nonce == u64::MAX {
            return None;
        }
        Self::touch_account(&mut self.journal, &address, account);
        self.journal.push(JournalEntry::NonceChanged {
            address,
            old: account.info.nonce,
        });
        account.info.nonce += 1;
        Some(account.info.nonce)
    }

    /// Prepares the journal for a contract creation: verifies solvency,
    /// checks for a collision, opens a checkpoint, marks the target created
    /// and moves the endowment. Both accounts must be loaded.
    ///
    /// The caller's nonce is bumped by the orchestrator beforehand; that
    /// increment survives collisions and init-code reverts.
    pub fn create_account_checkpoint(
        &mut self,
        caller: Address,
        target_address: Address,
        balance: U256,
        spec_id: SpecId,
    ) -> Result<JournalCheckpoint, TransferError> {
        let checkpoint = self.checkpoint();

        let caller_balance = self.state.get(&caller).unwrap().info.balance;
        if caller_balance < balance {
            self.checkpoint_revert(checkpoint);
            return Err(TransferError::OutOfFunds);
        }

        let target_account = self.state.get_mut(&target_address).unwrap();
        // A target with a nonce or code is a collision.
        if target_account.info.code_hash != KECCAK_EMPTY || target_account.info.nonce != 0 {
            self.checkpoint_revert(checkpoint);
            return Err(TransferError::CreateCollision);
        }

        target_account.mark_created();
        self.journal.push(JournalEntry::AccountCreated {
            address: target_address,
        });
        let target_account = self.state.get_mut(&target_address).unwrap();
        target_account.info.code = None;
        // EIP-161: created accounts start at nonce 1.
        if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            target_account.info.nonce = 1;
        }
        Self::touch_account(&mut self.journal, &target_address, target_account);

        let Some(new_balance) = target_account.info.balance.checked_add(balance) else {
            self.checkpoint_revert(checkpoint);
            return Err(TransferError::OverflowPayment);
        };
        target_account.info.balance = new_balance;
        // Solvency was checked above.
        self.state.get_mut(&caller).unwrap().info.balance -= balance;

        self.journal.push(JournalEntry::BalanceTransfer {
            from: caller,
            to: target_address,
            balance,
        });

        Ok(checkpoint)
    }

    /// Replaces the code of a loaded account, journaling the old state.
    pub fn set_code(&mut self, address: Address, code: Bytecode) {
        let hash = code.hash_slow();
        let account = self.state.get_mut(&address).unwrap();
        Self::touch_account(&mut self.journal, &address, account);
        self.journal.push(JournalEntry::CodeChanged {
            address,
            old_code: account.info.code.take(),
            old_hash: account.info.code_hash,
        });
        account.info.code_hash = hash;
        account.info.code = Some(code);
    }

    /// Reads a storage slot of a loaded account, pulling it from the
    /// backing store on first access and marking it warm.
    pub fn sload<DB: Database>(
        &mut self,
        address: Address,
        key: U256,
        db: &mut DB,
    ) -> Result<StateLoad<U256>, DB::Error> {
        let account = self.state.get_mut(&address).unwrap();
        // Accounts created in this transaction have empty storage; skip the
        // backing store for them.
        let is_newly_created = account.is_created();
        let (value, is_cold) = match account.storage.entry(key) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                (slot.present_value, slot.mark_warm())
            }
            Entry::Vacant(entry) => {
                let value = if is_newly_created {
                    U256::ZERO
                } else {
                    db.storage(address, key)?
                };
                let mut slot = StorageSlot::new(value);
                let _ = slot.mark_warm();
                entry.insert(slot);
                (value, true)
            }
        };

        if is_cold {
            self.journal.push(JournalEntry::StorageWarmed { address, key });
        }

        Ok(StateLoad::new(value, is_cold))
    }

    /// Writes a storage slot, returning the `(original, present, new)`
    /// triple for gas accounting. No-op writes are not journaled.
    pub fn sstore<DB: Database>(
        &mut self,
        address: Address,
        key: U256,
        new: U256,
        db: &mut DB,
    ) -> Result<StateLoad<SStoreResult>, DB::Error> {
        let present = self.sload(address, key, db)?;
        let slot = self
            .state
            .get_mut(&address)
            .unwrap()
            .storage
            .get_mut(&key)
            .unwrap();

        let result = SStoreResult {
            original_value: slot.original_value,
            present_value: present.data,
            new_value: new,
        };
        if present.data != new {
            self.journal.push(JournalEntry::StorageChanged {
                address,
                key,
                had_value: present.data,
            });
            slot.present_value = new;
        }
        Ok(StateLoad::new(result, present.is_cold))
    }

    /// Reads transient storage (EIP-1153).
    pub fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.transient_storage
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    /// Writes transient storage (EIP-1153). Writing zero removes the entry
    /// so empty slots never linger.
    pub fn tstore(&mut self, address: Address, key: U256, new: U256) {
        let had_value = if new.is_zero() {
            self.transient_storage.remove(&(address, key))
        } else {
            let previous = self
                .transient_storage
                .insert((address, key), new)
                .unwrap_or_default();
            (previous != new).then_some(previous)
        };

        if let Some(had_value) = had_value {
            self.journal.push(JournalEntry::TransientSet {
                address,
                key,
                had_value,
            });
        }
    }

    /// Appends a log.
    pub fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Marks `address` for destruction, moving its balance to `target`.
    ///
    /// Idempotent within a transaction. From Cancun, EIP-6780 restricts the
    /// destruction itself to accounts created in the same transaction; the
    /// balance still moves.
    pub fn selfdestruct<DB: Database>(
        &mut self,
        address: Address,
        target: Address,
        db: &mut DB,
    ) -> Result<StateLoad<SelfDestructResult>, DB::Error> {
        let spec_id = self.spec_id;
        let load = self.load_account(target, db)?;
        let is_cold = load.is_cold;
        let is_empty = load.data.state_clear_aware_is_empty(spec_id);

        if address != target {
            let balance = self.state.get(&address).unwrap().info.balance;
            let target_account = self.state.get_mut(&target).unwrap();
            Self::touch_account(&mut self.journal, &target, target_account);
            target_account.info.balance += balance;
        }

        let account = self.state.get_mut(&address).unwrap();
        let balance = account.info.balance;
        let previously_destroyed = account.is_selfdestructed();
        let is_cancun_enabled = spec_id.is_enabled_in(SpecId::CANCUN);

        let entry = if account.is_created() || !is_cancun_enabled {
            account.mark_selfdestruct();
            account.info.balance = U256::ZERO;
            Some(JournalEntry::AccountDestroyed {
                address,
                target,
                was_destroyed: previously_destroyed,
                had_balance: balance,
            })
        } else if address != target {
            account.info.balance = U256::ZERO;
            Some(JournalEntry::BalanceTransfer {
                from: address,
                to: target,
                balance,
            })
        } else {
            // Cancun, not created in this tx, self-beneficiary: no change.
            None
        };
        if let Some(entry) = entry {
            self.journal.push(entry);
        }

        Ok(StateLoad::new(
            SelfDestructResult {
                had_value: !balance.is_zero(),
                target_exists: !is_empty,
                previously_destroyed,
            },
            is_cold,
        ))
    }

    /// Opens a restore point and increments the depth counter.
    pub fn checkpoint(&mut self) -> JournalCheckpoint {
        let checkpoint = JournalCheckpoint {
            journal_i: self.journal.len(),
            log_i: self.logs.len(),
        };
        self.depth += 1;
        checkpoint
    }

    /// Commits the youngest checkpoint. Entries stay in the log; they now
    /// belong to the enclosing frame's window.
    pub fn checkpoint_commit(&mut self) {
        self.depth -= 1;
    }

    /// Reverts to `checkpoint`: undoes journal entries in reverse order and
    /// truncates journal and logs to the recorded lengths.
    pub fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint) {
        self.depth -= 1;
        let is_spurious_dragon_enabled = self.spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON);
        let state = &mut self.state;
        let transient_storage = &mut self.transient_storage;
        for entry in self.journal.drain(checkpoint.journal_i..).rev() {
            entry.revert(state, transient_storage, is_spurious_dragon_enabled);
        }
        self.logs.truncate(checkpoint.log_i);
    }

    /// Ends the transaction: resets the journal, transient storage and
    /// depth, drops destroyed accounts and hands out state and logs.
    pub fn finalize(&mut self) -> (EvmState, Vec<Log>) {
        self.transient_storage.clear();
        self.journal.clear();
        self.depth = 0;
        self.warm_preloaded_addresses.clear();
        let mut state = core::mem::take(&mut self.state);
        // Accounts that were actually destroyed leave the state entirely;
        // EIP-6780 gating already happened when the mark was set.
        state.retain(|_, account| !account.is_selfdestructed());
        let logs = core::mem::take(&mut self.logs);
        (state, logs)
    }
}

impl JournalEntry {
    /// Applies the inverse of this entry.
    pub fn revert(
        self,
        state: &mut EvmState,
        transient_storage: &mut TransientStorage,
        is_spurious_dragon_enabled: bool,
    ) {
        match self {
            Self::AccountLoaded { address } => {
                state.remove(&address);
            }
            Self::AccountWarmed { address } => {
                state.get_mut(&address).unwrap().mark_cold();
            }
            Self::AccountTouched { address } => {
                // The 0x03 precompile stays touched on revert; see the
                // yellow paper, appendix K.1.
                if is_spurious_dragon_enabled && address == PRECOMPILE3 {
                    return;
                }
                state.get_mut(&address).unwrap().unmark_touch();
            }
            Self::BalanceTransfer { from, to, balance } => {
                state.get_mut(&from).unwrap().info.balance += balance;
                state.get_mut(&to).unwrap().info.balance -= balance;
            }
            Self::NonceChanged { address, old } => {
                state.get_mut(&address).unwrap().info.nonce = old;
            }
            Self::CodeChanged {
                address,
                old_code,
                old_hash,
            } => {
                let account = state.get_mut(&address).unwrap();
                account.info.code = old_code;
                account.info.code_hash = old_hash;
            }
            Self::StorageWarmed { address, key } => {
                state
                    .get_mut(&address)
                    .unwrap()
                    .storage
                    .get_mut(&key)
                    .unwrap()
                    .mark_cold();
            }
            Self::StorageChanged {
                address,
                key,
                had_value,
            } => {
                state
                    .get_mut(&address)
                    .unwrap()
                    .storage
                    .get_mut(&key)
                    .unwrap()
                    .present_value = had_value;
            }
            Self::TransientSet {
                address,
                key,
                had_value,
            } => {
                if had_value.is_zero() {
                    transient_storage.remove(&(address, key));
                } else {
                    transient_storage.insert((address, key), had_value);
                }
            }
            Self::AccountCreated { address } => {
                let account = state.get_mut(&address).unwrap();
                account.unmark_created();
                // Only nonce-zero accounts can be created, so zero is exact.
                account.info.nonce = 0;
            }
            Self::AccountDestroyed {
                address,
                target,
                was_destroyed,
                had_balance,
            } => {
                let account = state.get_mut(&address).unwrap();
                if !was_destroyed {
                    account.unmark_selfdestruct();
                }
                account.info.balance += had_balance;
                if address != target {
                    state.get_mut(&target).unwrap().info.balance -= had_balance;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::address;
    use state::{AccountInfo, EmptyDb, InMemoryDb};

    const ADDR_A: Address = address!("0x1000000000000000000000000000000000000001");
    const ADDR_B: Address = address!("0x2000000000000000000000000000000000000002");

    fn new_journal() -> JournaledState {
        JournaledState::new(SpecId::CANCUN, HashSet::default())
    }

    fn funded_db() -> InMemoryDb {
        let mut db = InMemoryDb::default();
        db.insert_account_info(ADDR_A, AccountInfo::from_balance(U256::from(1000)));
        db.insert_account_info(ADDR_B, AccountInfo::from_balance(U256::from(50)));
        db
    }

    #[test]
    fn revert_restores_the_checkpoint_state_exactly(){
        let mut db = funded_db();
        db.insert_account_storage(ADDR_A, U256::from(1), U256::from(7));
        let mut journal = new_journal();

        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(ADDR_B, &mut db).unwrap();
        let value = journal.sload(ADDR_A, U256::from(1), &mut db).unwrap();
        assert_eq!(value.data, U256::from(7));
        assert!(value.is_cold);

        let before_state = journal.state.clone();
        let checkpoint = journal.checkpoint();

        assert!(journal
            .transfer(&ADDR_A, &ADDR_B, U256::from(100), &mut db)
            .unwrap()
            .is_none());
        journal
            .sstore(ADDR_A, U256::from(1), U256::from(42), &mut db)
            .unwrap();
        journal.tstore(ADDR_A, U256::from(9), U256::from(3));
        journal.inc_nonce(ADDR_A).unwrap();
        journal.log(Log::default());

        journal.checkpoint_revert(checkpoint);

        assert_eq!(journal.state, before_state);
        assert!(journal.logs.is_empty());
        assert_eq!(journal.tload(ADDR_A, U256::from(9)), U256::ZERO);
        assert_eq!(journal.depth, 0);
    }

    #[test]
    fn revert_evicts_fresh_loads_but_not_preloaded_ones(){
        let mut db = funded_db();
        let mut journal = JournaledState::new(
            SpecId::CANCUN,
            HashSet::from_iter([ADDR_B]),
        );

        let checkpoint = journal.checkpoint();
        let load_a = journal.load_account(ADDR_A, &mut db).unwrap();
        assert!(load_a.is_cold);
        let load_b = journal.load_account(ADDR_B, &mut db).unwrap();
        assert!(!load_b.is_cold);
        journal.checkpoint_revert(checkpoint);

        // The cold load was evicted, the preloaded one stays cached.
        assert!(!journal.state.contains_key(&ADDR_A));
        assert!(journal.state.contains_key(&ADDR_B));
    }

    #[test]
    fn transfer_with_insufficient_funds_is_reported(){
        let mut db = funded_db();
        let mut journal = new_journal();
        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(ADDR_B, &mut db).unwrap();
        let err = journal
            .transfer(&ADDR_A, &ADDR_B, U256::from(2000), &mut db)
            .unwrap();
        assert_eq!(err, Some(TransferError::OutOfFunds));
        // Balances unchanged.
        assert_eq!(journal.account(ADDR_A).info.balance, U256::from(1000));
    }

    #[test]
    fn create_collision_on_nonce_or_code(){
        let mut db = InMemoryDb::default();
        db.insert_account_info(
            ADDR_A,
            AccountInfo {
                balance: U256::from(10),
                nonce: 1,
                ..Default::default()
            },
        );
        db.insert_account_info(ADDR_B, AccountInfo::from_balance(U256::from(10)));
        let mut journal = new_journal();
        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(ADDR_B, &mut db).unwrap();

        assert_eq!(
            journal.create_account_checkpoint(ADDR_B, ADDR_A, U256::ZERO, SpecId::CANCUN),
            Err(TransferError::CreateCollision)
        );
        assert_eq!(journal.depth, 0);
    }

    #[test]
    fn created_account_gets_nonce_one_and_endowment(){
        let mut db = funded_db();
        let created = address!("0x3000000000000000000000000000000000000003");
        let mut journal = new_journal();
        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(created, &mut db).unwrap();

        let checkpoint = journal
            .create_account_checkpoint(ADDR_A, created, U256::from(25), SpecId::CANCUN)
            .unwrap();
        {
            let account = journal.account(created);
            assert!(account.is_created());
            assert_eq!(account.info.nonce, 1);
            assert_eq!(account.info.balance, U256::from(25));
        }
        assert_eq!(journal.account(ADDR_A).info.balance, U256::from(975));

        journal.checkpoint_revert(checkpoint);
        let account = journal.account(created);
        assert!(!account.is_created());
        assert_eq!(account.info.nonce, 0);
        assert_eq!(account.info.balance, U256::ZERO);
        assert_eq!(journal.account(ADDR_A).info.balance, U256::from(1000));
    }

    #[test]
    fn tstore_of_zero_removes_the_entry(){
        let mut db = InMemoryDb::default();
        let mut journal = new_journal();
        journal.tstore(ADDR_A, U256::from(1), U256::from(5));
        assert_eq!(journal.tload(ADDR_A, U256::from(1)), U256::from(5));
        journal.tstore(ADDR_A, U256::from(1), U256::ZERO);
        assert!(journal.transient_storage.is_empty());
    }

    #[test]
    fn selfdestruct_of_same_tx_creation_is_removed_at_finalize(){
        let mut db = funded_db();
        let created = address!("0x4000000000000000000000000000000000000004");
        let mut journal = new_journal();
        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(created, &mut db).unwrap();
        let _checkpoint = journal
            .create_account_checkpoint(ADDR_A, created, U256::from(10), SpecId::CANCUN)
            .unwrap();

        let result = journal.selfdestruct(created, ADDR_A, &mut db).unwrap();
        assert!(result.data.had_value);
        assert!(!result.data.previously_destroyed);
        journal.checkpoint_commit();

        let (state, _logs) = journal.finalize();
        assert!(!state.contains_key(&created));
        assert_eq!(state.get(&ADDR_A).unwrap().info.balance, U256::from(1000));
    }

    #[test]
    fn cancun_selfdestruct_of_existing_account_only_moves_balance(){
        let mut db = funded_db();
        let mut journal = new_journal();
        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(ADDR_B, &mut db).unwrap();

        let _ = journal.selfdestruct(ADDR_A, ADDR_B, &mut db).unwrap();
        assert!(!journal.account(ADDR_A).is_selfdestructed());
        assert_eq!(journal.account(ADDR_A).info.balance, U256::ZERO);
        assert_eq!(journal.account(ADDR_B).info.balance, U256::from(1050));
    }

    #[test]
    fn pre_cancun_selfdestruct_marks_the_account(){
        let mut db = funded_db();
        let mut journal = JournaledState::new(SpecId::SHANGHAI, HashSet::default());
        journal.load_account(ADDR_A, &mut db).unwrap();
        journal.load_account(ADDR_B, &mut db).unwrap();

        let _ = journal.selfdestruct(ADDR_A, ADDR_B, &mut db).unwrap();
        assert!(journal.account(ADDR_A).is_selfdestructed());
    }

    #[test]
    fn finalize_clears_transient_storage(){
        let mut db = InMemoryDb::default();
        let mut journal = new_journal();
        journal.tstore(ADDR_A, U256::from(1), U256::from(2));
        let _ = journal.finalize();
        assert!(journal.transient_storage.is_empty());
        assert!(journal.journal.is_empty());
    }

    #[test]
    fn empty_db_load_is_not_existing(){
        let mut journal = JournaledState::new(SpecId::CANCUN, HashSet::default());
        let load = journal.load_account(ADDR_A, &mut EmptyDb).unwrap();
        assert!(load.is_cold);
        assert!(load.data.is_loaded_as_not_existing());
    }
}
