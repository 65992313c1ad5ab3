//! The execution context: environment, journal and backing store, lent to
//! the interpreter as its [`Host`].

use crate::journaled_state::JournaledState;
use interpreter::{AccountLoad, Host, SStoreResult, SelfDestructResult, StateLoad};
use primitives::{Address, Bytes, Env, Log, B256, U256};
use state::Database;

/// Everything one transaction executes against.
///
/// Owned by the [`crate::Evm`] orchestrator; the active interpreter frame
/// borrows it for the duration of one `run`. Backing-store failures are
/// parked in `error` and surface as fatal halts.
pub struct Context<DB: Database> {
    /// Block, transaction and configuration data.
    pub env: Env,
    /// The journaled world state.
    pub journaled_state: JournaledState,
    /// The read-only backing store.
    pub db: DB,
    /// Deferred backing-store error.
    pub error: Option<DB::Error>,
}

impl<DB: Database> Context<DB> {
    /// Builds a context; the journal's fork is taken from the environment.
    pub fn new(env: Env, db: DB) -> Self {
        let journaled_state =
            JournaledState::new(env.cfg.spec_id, primitives::HashSet::default());
        Self {
            env,
            journaled_state,
            db,
            error: None,
        }
    }
}

impl<DB: Database> Host for Context<DB> {
    fn env(&self) -> &Env {
        &self.env
    }

    fn load_account(&mut self, address: Address) -> Option<StateLoad<AccountLoad>> {
        let spec_id = self.journaled_state.spec_id;
        self.journaled_state
            .load_account(address, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
            .map(|load| {
                let is_cold = load.is_cold;
                StateLoad::new(
                    AccountLoad {
                        is_empty: load.data.state_clear_aware_is_empty(spec_id),
                    },
                    is_cold,
                )
            })
    }

    fn block_hash(&mut self, number: u64) -> Option<B256> {
        self.db
            .block_hash(number)
            .map_err(|e| self.error = Some(e))
            .ok()
    }

    fn balance(&mut self, address: Address) -> Option<StateLoad<U256>> {
        self.journaled_state
            .load_account(address, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
            .map(|load| load.map(|account| account.info.balance))
    }

    fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>> {
        self.journaled_state
            .load_code(address, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
            .map(|load| {
                load.map(|account| {
                    account
                        .info
                        .code
                        .as_ref()
                        .map(|code| code.original_bytes())
                        .unwrap_or_default()
                })
            })
    }

    fn code_hash(&mut self, address: Address) -> Option<StateLoad<B256>> {
        let spec_id = self.journaled_state.spec_id;
        self.journaled_state
            .load_code(address, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
            .map(|load| {
                let is_cold = load.is_cold;
                // Empty accounts hash to zero, not to the empty-code hash.
                let hash = if load.data.state_clear_aware_is_empty(spec_id) {
                    B256::ZERO
                } else {
                    load.data.info.code_hash
                };
                StateLoad::new(hash, is_cold)
            })
    }

    fn sload(&mut self, address: Address, key: U256) -> Option<StateLoad<U256>> {
        self.journaled_state
            .sload(address, key, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
    }

    fn sstore(
        &mut self,
        address: Address,
        key: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>> {
        self.journaled_state
            .sstore(address, key, value, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
    }

    fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.journaled_state.tload(address, key)
    }

    fn tstore(&mut self, address: Address, key: U256, value: U256) {
        self.journaled_state.tstore(address, key, value)
    }

    fn log(&mut self, log: Log) {
        self.journaled_state.log(log)
    }

    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Option<StateLoad<SelfDestructResult>> {
        self.journaled_state
            .selfdestruct(address, target, &mut self.db)
            .map_err(|e| self.error = Some(e))
            .ok()
    }
}
