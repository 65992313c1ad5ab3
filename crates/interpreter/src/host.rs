//! The interface the interpreter uses to reach the world state.

use primitives::{Address, Bytes, Env, Log, B256, U256};

/// Everything the interpreter needs from the outside world.
///
/// A `Host` is loaned to the interpreter for the duration of one `run`; the
/// interpreter never stores it. `None` returns signal a backing-store
/// failure, which halts the frame with a fatal error.
pub trait Host {
    /// The execution environment.
    fn env(&self) -> &Env;

    /// Loads an account, returning whether it is cold and whether it is
    /// empty (for new-account call accounting).
    fn load_account(&mut self, address: Address) -> Option<StateLoad<AccountLoad>>;

    /// Hash of the block with the given number.
    fn block_hash(&mut self, number: u64) -> Option<B256>;

    /// Balance of `address`.
    fn balance(&mut self, address: Address) -> Option<StateLoad<U256>>;

    /// Code of `address`, without padding.
    fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>>;

    /// Code hash of `address`; zero for non-existent accounts.
    fn code_hash(&mut self, address: Address) -> Option<StateLoad<B256>>;

    /// Storage read at `address`/`key`.
    fn sload(&mut self, address: Address, key: U256) -> Option<StateLoad<U256>>;

    /// Storage write; returns the `(original, present, new)` triple the gas
    /// formulas need.
    fn sstore(
        &mut self,
        address: Address,
        key: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>>;

    /// Transient storage read (EIP-1153).
    fn tload(&mut self, address: Address, key: U256) -> U256;

    /// Transient storage write (EIP-1153).
    fn tstore(&mut self, address: Address, key: U256, value: U256);

    /// Emits a log.
    fn log(&mut self, log: Log);

    /// Marks `address` for destruction, sending its balance to `target`.
    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Option<StateLoad<SelfDestructResult>>;
}

/// A value loaded from the journal plus its cold/warm flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateLoad<T> {
    /// The loaded value.
    pub data: T,
    /// Whether this was the first access in the transaction.
    pub is_cold: bool,
}

impl<T> StateLoad<T> {
    /// Wraps a loaded value.
    pub fn new(data: T, is_cold: bool) -> Self {
        Self { data, is_cold }
    }

    /// Maps the loaded value, preserving the cold flag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StateLoad<U> {
        StateLoad::new(f(self.data), self.is_cold)
    }
}

/// Result of `Host::load_account`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountLoad {
    /// Whether the account is empty, per the EIP-161 aware rules.
    pub is_empty: bool,
}

/// Result of `Host::sstore`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SStoreResult {
    /// Value of the slot at the start of the transaction.
    pub original_value: U256,
    /// Value of the slot before this write.
    pub present_value: U256,
    /// The written value.
    pub new_value: U256,
}

/// Result of `Host::selfdestruct`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelfDestructResult {
    /// The destroyed account held a balance.
    pub had_value: bool,
    /// The beneficiary existed before the transfer.
    pub target_exists: bool,
    /// The account had already self-destructed in this transaction.
    pub previously_destroyed: bool,
}

/// A host connected to nothing, for instruction-level tests.
#[derive(Clone, Debug, Default)]
pub struct DummyHost {
    /// Environment returned by `env`.
    pub env: Env,
    /// Transient storage written through `tstore`.
    pub transient_storage: primitives::HashMap<(Address, U256), U256>,
    /// Logs recorded through `log`.
    pub logs: std::vec::Vec<Log>,
}

impl DummyHost {
    /// A dummy host with the given environment.
    pub fn new(env: Env) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }
}

impl Host for DummyHost {
    fn env(&self) -> &Env {
        &self.env
    }

    fn load_account(&mut self, _address: Address) -> Option<StateLoad<AccountLoad>> {
        Some(StateLoad::default())
    }

    fn block_hash(&mut self, _number: u64) -> Option<B256> {
        Some(B256::ZERO)
    }

    fn balance(&mut self, _address: Address) -> Option<StateLoad<U256>> {
        Some(StateLoad::default())
    }

    fn code(&mut self, _address: Address) -> Option<StateLoad<Bytes>> {
        Some(StateLoad::default())
    }

    fn code_hash(&mut self, _address: Address) -> Option<StateLoad<B256>> {
        Some(StateLoad::default())
    }

    fn sload(&mut self, _address: Address, _key: U256) -> Option<StateLoad<U256>> {
        Some(StateLoad::default())
    }

    fn sstore(
        &mut self,
        _address: Address,
        _key: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>> {
        Some(StateLoad::new(
            SStoreResult {
                original_value: U256::ZERO,
                present_value: U256::ZERO,
                new_value: value,
            },
            false,
        ))
    }

    fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.transient_storage
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    fn tstore(&mut self, address: Address, key: U256, value: U256) {
        self.transient_storage.insert((address, key), value);
    }

    fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn selfdestruct(
        &mut self,
        _address: Address,
        _target: Address,
    ) -> Option<StateLoad<SelfDestructResult>> {
        Some(StateLoad::default())
    }
}
