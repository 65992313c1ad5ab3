use crate::EvmStorage;
use bitflags::bitflags;
use bytecode::Bytecode;
use primitives::{hardfork::SpecId, B256, KECCAK_EMPTY, U256};

/// An account loaded into the journal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    /// Balance, nonce and code.
    pub info: AccountInfo,
    /// Storage cache, lazily populated on first `SLOAD`/`SSTORE`.
    pub storage: EvmStorage,
    /// Status flags tracked by the journal.
    pub status: AccountStatus,
}

bitflags! {
    /// Journal-tracked account state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AccountStatus: u8 {
        /// Loaded but not yet interacted with.
        const Loaded = 0b00000000;
        /// Created in this transaction; storage reads skip the backing store.
        const Created = 0b00000001;
        /// Marked for removal by `SELFDESTRUCT`.
        const SelfDestructed = 0b00000010;
        /// Touched; only touched accounts are written back (EIP-161).
        const Touched = 0b00000100;
        /// The backing store had no entry for this address.
        const LoadedAsNotExisting = 0b00001000;
        /// Not yet accessed in this transaction (EIP-2929).
        const Cold = 0b00010000;
    }
}

impl Account {
    /// An account absent from the backing store.
    pub fn new_not_existing() -> Self {
        Self {
            info: AccountInfo::default(),
            storage: EvmStorage::default(),
            status: AccountStatus::LoadedAsNotExisting,
        }
    }

    /// Returns `true` if the account was marked for self-destruction.
    pub fn is_selfdestructed(&self) -> bool {
        self.status.contains(AccountStatus::SelfDestructed)
    }

    /// Returns `true` if the account was created in this transaction.
    pub fn is_created(&self) -> bool {
        self.status.contains(AccountStatus::Created)
    }

    /// Returns `true` if the account has been touched.
    pub fn is_touched(&self) -> bool {
        self.status.contains(AccountStatus::Touched)
    }

    /// Returns `true` if the backing store had no entry for this address.
    pub fn is_loaded_as_not_existing(&self) -> bool {
        self.status.contains(AccountStatus::LoadedAsNotExisting)
    }

    /// Returns `true` if the account is empty: no code, zero nonce, zero
    /// balance.
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Empty-account check aware of the EIP-161 state-clear rules: before
    /// Spurious Dragon an account that the store never knew about is the
    /// only kind that "does not exist".
    pub fn state_clear_aware_is_empty(&self, spec_id: SpecId) -> bool {
        if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            self.is_empty()
        } else {
            self.is_loaded_as_not_existing() && !self.is_touched()
        }
    }

    /// Marks the account as touched.
    pub fn mark_touch(&mut self) {
        self.status |= AccountStatus::Touched;
    }

    /// Removes the touched mark (journal revert).
    pub fn unmark_touch(&mut self) {
        self.status -= AccountStatus::Touched;
    }

    /// Marks the account as created in this transaction.
    pub fn mark_created(&mut self) {
        self.status |= AccountStatus::Created;
    }

    /// Removes the created mark (journal revert).
    pub fn unmark_created(&mut self) {
        self.status -= AccountStatus::Created;
    }

    /// Marks the account for self-destruction.
    pub fn mark_selfdestruct(&mut self) {
        self.status |= AccountStatus::SelfDestructed;
    }

    /// Removes the self-destruction mark (journal revert).
    pub fn unmark_selfdestruct(&mut self) {
        self.status -= AccountStatus::SelfDestructed;
    }

    /// Marks the account as cold (journal revert of a warm load).
    pub fn mark_cold(&mut self) {
        self.status |= AccountStatus::Cold;
    }

    /// Marks the account as warm, returning `true` if it was cold.
    pub fn mark_warm(&mut self) -> bool {
        let was_cold = self.status.contains(AccountStatus::Cold);
        self.status -= AccountStatus::Cold;
        was_cold
    }
}

impl From<AccountInfo> for Account {
    fn from(info: AccountInfo) -> Self {
        Self {
            info,
            storage: EvmStorage::default(),
            status: AccountStatus::Loaded,
        }
    }
}

/// Balance, nonce and code of an account.
#[derive(Clone, Debug, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountInfo {
    /// Account balance in wei.
    pub balance: U256,
    /// Account nonce.
    pub nonce: u64,
    /// Keccak-256 hash of the account code.
    pub code_hash: B256,
    /// Account code; `None` means it has to be fetched by hash.
    pub code: Option<Bytecode>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code_hash: KECCAK_EMPTY,
            code: Some(Bytecode::default()),
        }
    }
}

impl PartialEq for AccountInfo {
    fn eq(&self, other: &Self) -> bool {
        self.balance == other.balance
            && self.nonce == other.nonce
            && self.code_hash == other.code_hash
    }
}

impl AccountInfo {
    /// Account with the given code; hash is computed here.
    pub fn new(balance: U256, nonce: u64, code: Bytecode) -> Self {
        let code_hash = code.hash_slow();
        Self {
            balance,
            nonce,
            code_hash,
            code: Some(code),
        }
    }

    /// Account with only a balance.
    pub fn from_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Returns `true` if balance, nonce and code are all empty (EIP-161).
    pub fn is_empty(&self) -> bool {
        let code_empty = self.code_hash == KECCAK_EMPTY || self.code_hash == B256::ZERO;
        code_empty && self.balance.is_zero() && self.nonce == 0
    }

    /// Returns `true` if the account carries code.
    pub fn has_code(&self) -> bool {
        self.code_hash != KECCAK_EMPTY && self.code_hash != B256::ZERO
    }
}

/// One storage slot of an account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageSlot {
    /// Value at the start of the transaction; never mutated within it.
    pub original_value: U256,
    /// Current value.
    pub present_value: U256,
    /// Whether the slot is yet to be accessed in this transaction.
    pub is_cold: bool,
}

impl StorageSlot {
    /// A freshly loaded, cold slot.
    pub fn new(value: U256) -> Self {
        Self {
            original_value: value,
            present_value: value,
            is_cold: true,
        }
    }

    /// Returns `true` if the slot was written this transaction.
    pub fn is_changed(&self) -> bool {
        self.original_value != self.present_value
    }

    /// Marks the slot warm, returning `true` if it was cold.
    pub fn mark_warm(&mut self) -> bool {
        core::mem::replace(&mut self.is_cold, false)
    }

    /// Marks the slot cold (journal revert).
    pub fn mark_cold(&mut self) {
        self.is_cold = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_cold_round_trip() {
        let mut slot = StorageSlot::new(U256::from(7));
        assert!(slot.mark_warm());
        assert!(!slot.mark_warm());
        slot.mark_cold();
        assert!(slot.mark_warm());
    }

    #[test]
    fn empty_account_per_eip161() {
        let mut account = Account::new_not_existing();
        assert!(account.state_clear_aware_is_empty(SpecId::SPURIOUS_DRAGON));
        assert!(account.state_clear_aware_is_empty(SpecId::HOMESTEAD));

        account.info.nonce = 1;
        assert!(!account.state_clear_aware_is_empty(SpecId::SPURIOUS_DRAGON));
    }

    #[test]
    fn status_flags_compose() {
        let mut account = Account::default();
        account.mark_touch();
        account.mark_created();
        assert!(account.is_touched());
        assert!(account.is_created());
        account.unmark_touch();
        assert!(!account.is_touched());
        assert!(account.is_created());
    }
}
