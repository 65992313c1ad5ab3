//! The transaction orchestrator: validation, intrinsic gas, the call-frame
//! trampoline and final gas settlement.

use crate::{
    context::Context,
    frame::{
        insert_frame_outcome, Frame, FrameData, FrameInput, FrameOrOutcome, FrameOutcome,
    },
};
use bytecode::Bytecode;
use interpreter::{
    gas, instruction_table, CallInputs, CallOutcome, CallScheme, CallValue, Contract,
    CreateInputs, CreateOutcome, CreateScheme, Gas, InstructionResult, Interpreter,
    InterpreterAction, InterpreterResult, SharedMemory, SuccessOrHalt,
};
use precompile::{PrecompileSpecId, Precompiles};
use primitives::{
    hardfork::SpecId, AnalysisKind, Bytes, Env, EvmError, ExecutionResult, InvalidTransaction,
    Output, TransactTo, CALL_STACK_LIMIT, MAX_CODE_SIZE, U256,
};
use state::{Database, EvmState};
use std::{boxed::Box, vec::Vec};

/// Execution result together with the touched world state.
#[derive(Clone, Debug)]
pub struct ResultAndState {
    /// Outcome of the transaction.
    pub result: ExecutionResult,
    /// Every account the transaction loaded or changed. Destroyed accounts
    /// have already been dropped.
    pub state: EvmState,
}

/// The EVM: one environment, one journal, one backing store.
pub struct Evm<DB: Database> {
    /// The execution context, which is also the interpreter's host.
    pub ctx: Context<DB>,
}

impl<DB: Database> Evm<DB> {
    /// Builds an EVM over the given environment and backing store.
    pub fn new(env: Env, db: DB) -> Self {
        Self {
            ctx: Context::new(env, db),
        }
    }

    /// Consumes the EVM, returning its context.
    pub fn into_context(self) -> Context<DB> {
        self.ctx
    }

    /// Validates and executes the configured transaction.
    pub fn transact(&mut self) -> Result<ResultAndState, EvmError<DB::Error>> {
        self.preverify_transaction()?;
        self.transact_preverified()
    }

    /// Runs the checks that may fail a transaction before any state change.
    pub fn preverify_transaction(&mut self) -> Result<(), EvmError<DB::Error>> {
        let spec_id = self.ctx.env.cfg.spec_id;
        self.ctx.env.validate_block_env(spec_id)?;
        self.ctx.env.validate_tx(spec_id)?;

        let initial_gas = gas::initial_tx_gas(
            spec_id,
            &self.ctx.env.tx.data,
            self.ctx.env.tx.transact_to.is_create(),
            &self.ctx.env.tx.access_list,
        );
        if initial_gas > self.ctx.env.tx.gas_limit {
            return Err(InvalidTransaction::CallGasCostMoreThanGasLimit.into());
        }

        let tx_nonce = self.ctx.env.tx.nonce;
        let disable_eip3607 = self.ctx.env.cfg.disable_eip3607;
        let disable_balance_check = self.ctx.env.cfg.disable_balance_check;
        let balance_check = U256::from(self.ctx.env.tx.gas_limit)
            .saturating_mul(self.ctx.env.effective_gas_price())
            .saturating_add(self.ctx.env.tx.value)
            .saturating_add(self.ctx.env.calc_data_fee().unwrap_or_default());

        let caller_address = self.ctx.env.tx.caller;
        let caller = self
            .ctx
            .journaled_state
            .load_code(caller_address, &mut self.ctx.db)
            .map_err(EvmError::Database)?;
        let info = &caller.data.info;

        if let Some(tx) = tx_nonce {
            if tx != info.nonce {
                return Err(InvalidTransaction::NonceMismatch {
                    state: info.nonce,
                    tx,
                }
                .into());
            }
        }
        // EIP-3607: transactions from accounts with deployed code are
        // rejected.
        if !disable_eip3607 && info.has_code() {
            return Err(InvalidTransaction::RejectCallerWithCode.into());
        }
        if !disable_balance_check && balance_check > info.balance {
            return Err(InvalidTransaction::LackOfFundForMaxFee {
                fee: balance_check,
                balance: info.balance,
            }
            .into());
        }
        Ok(())
    }

    /// Executes the transaction, assuming validation has passed.
    pub fn transact_preverified(&mut self) -> Result<ResultAndState, EvmError<DB::Error>> {
        let spec_id = self.ctx.env.cfg.spec_id;
        let tx_gas_limit = self.ctx.env.tx.gas_limit;
        let is_create = self.ctx.env.tx.transact_to.is_create();
        let initial_gas = gas::initial_tx_gas(
            spec_id,
            &self.ctx.env.tx.data,
            is_create,
            &self.ctx.env.tx.access_list,
        );

        let precompiles = Precompiles::new(PrecompileSpecId::from_spec_id(spec_id));
        self.warm_addresses_and_access_list(precompiles)?;
        self.deduct_caller()?;

        let frame_gas_limit = tx_gas_limit - initial_gas;
        let caller_address = self.ctx.env.tx.caller;
        let tx_value = self.ctx.env.tx.value;
        let tx_data = self.ctx.env.tx.data.clone();

        let first_frame = match self.ctx.env.tx.transact_to {
            TransactTo::Call(address) => FrameInput::Call(Box::new(CallInputs {
                input: tx_data,
                return_memory_offset: 0..0,
                gas_limit: frame_gas_limit,
                bytecode_address: address,
                target_address: address,
                caller: caller_address,
                value: CallValue::Transfer(tx_value),
                scheme: CallScheme::Call,
                is_static: false,
            })),
            TransactTo::Create => FrameInput::Create(Box::new(CreateInputs {
                caller: caller_address,
                scheme: CreateScheme::Create,
                value: tx_value,
                init_code: tx_data,
                gas_limit: frame_gas_limit,
            })),
        };

        let outcome = self.run_exec_loop(first_frame, precompiles)?;
        let result = outcome.result().clone();

        if result.result == InstructionResult::FatalExternalError {
            if let Some(error) = self.ctx.error.take() {
                return Err(EvmError::Database(error));
            }
        }

        // Fold the frame gas into a tracker spanning the whole limit,
        // intrinsic charge included.
        let mut tx_gas = Gas::new(tx_gas_limit);
        let _ = tx_gas.record_cost(initial_gas);
        if result.is_ok() {
            let _ = tx_gas.record_cost(result.gas.spent());
            tx_gas.record_refund(result.gas.refunded());
        } else if result.is_revert() {
            let _ = tx_gas.record_cost(result.gas.spent());
        } else {
            let _ = tx_gas.record_cost(result.gas.limit());
        }

        // The refund only applies to successful executions and is capped to
        // a quotient of the gas spent.
        let gas_refunded = if result.is_ok() && !self.ctx.env.cfg.disable_gas_refund {
            tx_gas.set_final_refund(spec_id.is_enabled_in(SpecId::LONDON));
            tx_gas.refunded() as u64
        } else {
            0
        };

        self.reimburse_caller(&tx_gas, gas_refunded)?;
        self.reward_beneficiary(&tx_gas, gas_refunded)?;

        let final_gas_used = tx_gas.spent() - gas_refunded;
        let (state, logs) = self.ctx.journaled_state.finalize();

        let output = if is_create {
            Output::Create(result.output.clone(), outcome.created_address())
        } else {
            Output::Call(result.output.clone())
        };

        let execution_result = match SuccessOrHalt::from(result.result) {
            SuccessOrHalt::Success(reason) => ExecutionResult::Success {
                reason,
                gas_used: final_gas_used,
                gas_refunded,
                logs,
                output,
            },
            SuccessOrHalt::Revert => ExecutionResult::Revert {
                gas_used: final_gas_used,
                output: result.output,
            },
            SuccessOrHalt::Halt(reason) => ExecutionResult::Halt {
                reason,
                gas_used: final_gas_used,
            },
            SuccessOrHalt::FatalExternalError | SuccessOrHalt::Internal => {
                panic!("internal statuses must not escape the frame loop: {:?}", result.result)
            }
        };

        Ok(ResultAndState {
            result: execution_result,
            state,
        })
    }

    /// Pre-warms the sender, target, coinbase, precompiles and the access
    /// list (EIP-2929, EIP-3651).
    fn warm_addresses_and_access_list(
        &mut self,
        precompiles: &'static Precompiles,
    ) -> Result<(), EvmError<DB::Error>> {
        let warm = &mut self.ctx.journaled_state.warm_preloaded_addresses;
        warm.insert(self.ctx.env.tx.caller);
        if let TransactTo::Call(target) = self.ctx.env.tx.transact_to {
            warm.insert(target);
        }
        warm.extend(precompiles.addresses().copied());
        if self.ctx.env.cfg.spec_id.is_enabled_in(SpecId::SHANGHAI) {
            warm.insert(self.ctx.env.block.coinbase);
        }

        let access_list = core::mem::take(&mut self.ctx.env.tx.access_list);
        for (address, keys) in &access_list {
            self.ctx
                .journaled_state
                .warm_preloaded_addresses
                .insert(*address);
            self.ctx
                .journaled_state
                .initial_account_load(*address, keys.iter().copied(), &mut self.ctx.db)
                .map_err(EvmError::Database)?;
        }
        self.ctx.env.tx.access_list = access_list;
        Ok(())
    }

    /// Charges the sender the full gas budget up front and bumps the nonce
    /// of call transactions. Create transactions bump theirs when the create
    /// frame is prepared.
    fn deduct_caller(&mut self) -> Result<(), EvmError<DB::Error>> {
        let gas_cost = U256::from(self.ctx.env.tx.gas_limit)
            .saturating_mul(self.ctx.env.effective_gas_price())
            .saturating_add(self.ctx.env.calc_data_fee().unwrap_or_default());
        let is_call = matches!(self.ctx.env.tx.transact_to, TransactTo::Call(_));
        let caller_address = self.ctx.env.tx.caller;

        let caller = self
            .ctx
            .journaled_state
            .load_account(caller_address, &mut self.ctx.db)
            .map_err(EvmError::Database)?
            .data;
        // Saturating so `disable_balance_check` cannot underflow.
        caller.info.balance = caller.info.balance.saturating_sub(gas_cost);
        if is_call {
            caller.info.nonce = caller.info.nonce.saturating_add(1);
        }
        caller.mark_touch();
        Ok(())
    }

    /// Returns the unspent gas and the refund to the sender.
    fn reimburse_caller(
        &mut self,
        tx_gas: &Gas,
        gas_refunded: u64,
    ) -> Result<(), EvmError<DB::Error>> {
        let effective_gas_price = self.ctx.env.effective_gas_price();
        let caller_address = self.ctx.env.tx.caller;
        let reimbursement =
            effective_gas_price.saturating_mul(U256::from(tx_gas.remaining() + gas_refunded));

        let caller = self
            .ctx
            .journaled_state
            .load_account(caller_address, &mut self.ctx.db)
            .map_err(EvmError::Database)?
            .data;
        caller.info.balance = caller.info.balance.saturating_add(reimbursement);
        Ok(())
    }

    /// Pays the coinbase its fee: the full effective price before London,
    /// the priority portion after (EIP-1559 burns the basefee).
    fn reward_beneficiary(
        &mut self,
        tx_gas: &Gas,
        gas_refunded: u64,
    ) -> Result<(), EvmError<DB::Error>> {
        let coinbase = self.ctx.env.block.coinbase;
        let effective_gas_price = self.ctx.env.effective_gas_price();
        let coinbase_gas_price = if self.ctx.env.cfg.spec_id.is_enabled_in(SpecId::LONDON) {
            effective_gas_price.saturating_sub(self.ctx.env.block.basefee)
        } else {
            effective_gas_price
        };
        let reward =
            coinbase_gas_price.saturating_mul(U256::from(tx_gas.spent() - gas_refunded));

        let account = self
            .ctx
            .journaled_state
            .load_account(coinbase, &mut self.ctx.db)
            .map_err(EvmError::Database)?
            .data;
        account.mark_touch();
        account.info.balance = account.info.balance.saturating_add(reward);
        Ok(())
    }

    /// The trampoline of spec-defined suspension points: runs the top frame
    /// until it yields, then either pushes a child frame or settles the
    /// finished one into its parent.
    fn run_exec_loop(
        &mut self,
        first: FrameInput,
        precompiles: &'static Precompiles,
    ) -> Result<FrameOutcome, EvmError<DB::Error>> {
        let table = instruction_table::<Context<DB>>();
        let mut root_memory = SharedMemory::new();

        let first = match first {
            FrameInput::Call(inputs) => {
                self.make_call_frame(&inputs, precompiles, &mut root_memory)?
            }
            FrameInput::Create(inputs) => self.make_create_frame(&inputs, &mut root_memory)?,
        };
        let mut frames: Vec<Frame> = match first {
            FrameOrOutcome::Frame(frame) => vec![frame],
            FrameOrOutcome::Outcome(outcome) => return Ok(outcome),
        };

        loop {
            let frame = frames.last_mut().unwrap();
            let action = frame.interpreter.run(&table, &mut self.ctx);

            match action {
                InterpreterAction::Call { inputs } => {
                    let created = {
                        let parent = frames.last_mut().unwrap();
                        self.make_call_frame(&inputs, precompiles, &mut parent.interpreter.memory)?
                    };
                    match created {
                        FrameOrOutcome::Frame(frame) => frames.push(frame),
                        FrameOrOutcome::Outcome(outcome) => {
                            insert_frame_outcome(
                                &mut frames.last_mut().unwrap().interpreter,
                                outcome,
                            );
                        }
                    }
                }
                InterpreterAction::Create { inputs } => {
                    let created = {
                        let parent = frames.last_mut().unwrap();
                        self.make_create_frame(&inputs, &mut parent.interpreter.memory)?
                    };
                    match created {
                        FrameOrOutcome::Frame(frame) => frames.push(frame),
                        FrameOrOutcome::Outcome(outcome) => {
                            insert_frame_outcome(
                                &mut frames.last_mut().unwrap().interpreter,
                                outcome,
                            );
                        }
                    }
                }
                InterpreterAction::Return { result } => {
                    let mut frame = frames.pop().unwrap();
                    let outcome = match frame.data.clone() {
                        FrameData::Call {
                            return_memory_range,
                        } => FrameOutcome::Call(self.return_call(
                            frame.checkpoint,
                            result,
                            return_memory_range,
                        )),
                        FrameData::Create { created_address } => FrameOutcome::Create(
                            self.return_create(frame.checkpoint, result, created_address),
                        ),
                    };

                    // Hand the shared buffer back, dropping the child's view.
                    let mut memory = core::mem::take(&mut frame.interpreter.memory);
                    memory.free_context();
                    let Some(parent) = frames.last_mut() else {
                        return Ok(outcome);
                    };
                    parent.interpreter.memory = memory;
                    insert_frame_outcome(&mut parent.interpreter, outcome);
                }
                InterpreterAction::None => {
                    unreachable!("interpreter run always produces an action")
                }
            }
        }
    }

    /// Prepares a call frame: depth limit, code load, checkpoint, value
    /// transfer, precompile short-circuit.
    fn make_call_frame(
        &mut self,
        inputs: &CallInputs,
        precompiles: &'static Precompiles,
        memory: &mut SharedMemory,
    ) -> Result<FrameOrOutcome, EvmError<DB::Error>> {
        let gas = Gas::new(inputs.gas_limit);
        let return_memory_range = inputs.return_memory_offset.clone();
        let outcome = |result: InterpreterResult| {
            FrameOrOutcome::Outcome(FrameOutcome::Call(CallOutcome::new(
                result,
                return_memory_range.clone(),
            )))
        };

        // A frame above the depth limit is synthesized as a failed child.
        if self.ctx.journaled_state.depth() as u64 > CALL_STACK_LIMIT {
            return Ok(outcome(InterpreterResult::new(
                InstructionResult::CallTooDeep,
                Bytes::new(),
                gas,
            )));
        }

        let (bytecode, code_hash) = {
            let account = self
                .ctx
                .journaled_state
                .load_code(inputs.bytecode_address, &mut self.ctx.db)
                .map_err(EvmError::Database)?;
            (
                account.data.info.code.clone().unwrap_or_default(),
                account.data.info.code_hash,
            )
        };

        let checkpoint = self.ctx.journaled_state.checkpoint();

        match inputs.value {
            CallValue::Transfer(value) if !value.is_zero() => {
                if let Some(error) = self
                    .ctx
                    .journaled_state
                    .transfer(&inputs.caller, &inputs.target_address, value, &mut self.ctx.db)
                    .map_err(EvmError::Database)?
                {
                    self.ctx.journaled_state.checkpoint_revert(checkpoint);
                    return Ok(outcome(InterpreterResult::new(
                        error.into(),
                        Bytes::new(),
                        gas,
                    )));
                }
            }
            _ => {
                // EIP-161: even a zero-value call touches the target.
                self.ctx
                    .journaled_state
                    .load_account(inputs.target_address, &mut self.ctx.db)
                    .map_err(EvmError::Database)?;
                self.ctx.journaled_state.touch(&inputs.target_address);
            }
        }

        // Precompiles run synchronously; they never get a frame.
        if let Some(precompile) = precompiles.get(&inputs.bytecode_address) {
            let result = match (precompile)(&inputs.input, inputs.gas_limit) {
                Ok(output) => {
                    let mut gas = gas;
                    // Precompiles meter against the limit themselves.
                    let _ = gas.record_cost(output.gas_used);
                    InterpreterResult::new(InstructionResult::Return, output.bytes, gas)
                }
                Err(error) => InterpreterResult::new(
                    if error.is_oog() {
                        InstructionResult::PrecompileOOG
                    } else {
                        InstructionResult::PrecompileError
                    },
                    Bytes::new(),
                    Gas::new_spent(inputs.gas_limit),
                ),
            };
            if result.is_ok() {
                self.ctx.journaled_state.checkpoint_commit();
            } else {
                self.ctx.journaled_state.checkpoint_revert(checkpoint);
            }
            return Ok(outcome(result));
        }

        // Calling an account without code succeeds immediately.
        if bytecode.is_empty() {
            self.ctx.journaled_state.checkpoint_commit();
            return Ok(outcome(InterpreterResult::new(
                InstructionResult::Stop,
                Bytes::new(),
                gas,
            )));
        }

        let bytecode = self.prepare_bytecode(bytecode);
        let contract =
            Contract::new_with_context(inputs.input.clone(), bytecode, Some(code_hash), inputs);
        let mut child_memory = core::mem::take(memory);
        child_memory.new_context();
        let interpreter = Interpreter::new(
            contract,
            inputs.gas_limit,
            child_memory,
            self.ctx.env.cfg.spec_id,
            inputs.is_static,
        );

        Ok(FrameOrOutcome::Frame(Frame {
            interpreter,
            data: FrameData::Call {
                return_memory_range,
            },
            checkpoint,
        }))
    }

    /// Prepares a create frame: depth limit, nonce bump, address derivation,
    /// collision check and endowment transfer.
    fn make_create_frame(
        &mut self,
        inputs: &CreateInputs,
        memory: &mut SharedMemory,
    ) -> Result<FrameOrOutcome, EvmError<DB::Error>> {
        let spec_id = self.ctx.env.cfg.spec_id;
        let gas = Gas::new(inputs.gas_limit);
        let outcome = |result: InstructionResult, gas: Gas| {
            FrameOrOutcome::Outcome(FrameOutcome::Create(CreateOutcome::new(
                InterpreterResult::new(result, Bytes::new(), gas),
                None,
            )))
        };

        if self.ctx.journaled_state.depth() as u64 > CALL_STACK_LIMIT {
            return Ok(outcome(InstructionResult::CallTooDeep, gas));
        }

        self.ctx
            .journaled_state
            .load_account(inputs.caller, &mut self.ctx.db)
            .map_err(EvmError::Database)?;

        // The creator's nonce increments regardless of the creation outcome.
        let Some(new_nonce) = self.ctx.journaled_state.inc_nonce(inputs.caller) else {
            return Ok(outcome(InstructionResult::Return, gas));
        };
        let created_address = inputs.created_address(new_nonce - 1);

        // Warm the target before the checkpoint (EIP-2929).
        self.ctx
            .journaled_state
            .load_account(created_address, &mut self.ctx.db)
            .map_err(EvmError::Database)?;

        let checkpoint = match self.ctx.journaled_state.create_account_checkpoint(
            inputs.caller,
            created_address,
            inputs.value,
            spec_id,
        ) {
            Ok(checkpoint) => checkpoint,
            Err(error) => return Ok(outcome(error.into(), gas)),
        };

        let bytecode = self.prepare_bytecode(Bytecode::new_raw(inputs.init_code.clone()));
        let contract = Contract::new(
            Bytes::new(),
            bytecode,
            None,
            created_address,
            None,
            inputs.caller,
            inputs.value,
        );
        let mut child_memory = core::mem::take(memory);
        child_memory.new_context();
        let interpreter = Interpreter::new(
            contract,
            inputs.gas_limit,
            child_memory,
            spec_id,
            false,
        );

        Ok(FrameOrOutcome::Frame(Frame {
            interpreter,
            data: FrameData::Create { created_address },
            checkpoint,
        }))
    }

    /// Settles a finished call frame against the journal.
    fn return_call(
        &mut self,
        checkpoint: crate::journaled_state::JournalCheckpoint,
        result: InterpreterResult,
        return_memory_range: core::ops::Range<usize>,
    ) -> CallOutcome {
        if result.is_ok() {
            self.ctx.journaled_state.checkpoint_commit();
        } else {
            self.ctx.journaled_state.checkpoint_revert(checkpoint);
        }
        CallOutcome::new(result, return_memory_range)
    }

    /// Settles a finished create frame: deployed-code checks, the code
    /// deposit charge and the final `set_code`.
    fn return_create(
        &mut self,
        checkpoint: crate::journaled_state::JournalCheckpoint,
        mut result: InterpreterResult,
        created_address: primitives::Address,
    ) -> CreateOutcome {
        if !result.is_ok() {
            self.ctx.journaled_state.checkpoint_revert(checkpoint);
            return CreateOutcome::new(result, Some(created_address));
        }

        let spec_id = self.ctx.env.cfg.spec_id;

        // EIP-3541: deployed code may not start with 0xEF.
        if spec_id.is_enabled_in(SpecId::LONDON) && result.output.first() == Some(&0xEF) {
            self.ctx.journaled_state.checkpoint_revert(checkpoint);
            result.result = InstructionResult::CreateContractStartingWithEF;
            return CreateOutcome::new(result, Some(created_address));
        }

        // EIP-170: deployed code size limit.
        let max_code_size = self
            .ctx
            .env
            .cfg
            .limit_contract_code_size
            .unwrap_or(MAX_CODE_SIZE);
        if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) && result.output.len() > max_code_size {
            self.ctx.journaled_state.checkpoint_revert(checkpoint);
            result.result = InstructionResult::CreateContractSizeLimit;
            return CreateOutcome::new(result, Some(created_address));
        }

        // Code deposit: 200 gas per byte. Running short is a hard failure
        // from Homestead (EIP-2); Frontier deploys an empty contract.
        let gas_for_code = result.output.len() as u64 * gas::CODEDEPOSIT;
        if !result.gas.record_cost(gas_for_code) {
            if spec_id.is_enabled_in(SpecId::HOMESTEAD) {
                self.ctx.journaled_state.checkpoint_revert(checkpoint);
                result.result = InstructionResult::OutOfGas;
                return CreateOutcome::new(result, Some(created_address));
            }
            result.output = Bytes::new();
        }

        self.ctx.journaled_state.checkpoint_commit();
        let bytecode = self.prepare_bytecode(Bytecode::new_raw(result.output.clone()));
        self.ctx.journaled_state.set_code(created_address, bytecode);

        result.result = InstructionResult::Return;
        CreateOutcome::new(result, Some(created_address))
    }

    /// Applies the configured bytecode preparation.
    fn prepare_bytecode(&self, bytecode: Bytecode) -> Bytecode {
        match self.ctx.env.cfg.perf_analyse_created_bytecodes {
            AnalysisKind::Raw => bytecode,
            AnalysisKind::Analyse => bytecode.into_analyzed(),
        }
    }
}
