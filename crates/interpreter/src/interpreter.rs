//! The per-frame interpreter: program counter loop and suspension points.

mod contract;
mod shared_memory;
mod stack;

pub use contract::Contract;
pub use shared_memory::{num_words, SharedMemory};
pub use stack::{Stack, STACK_LIMIT};

use crate::{
    gas::{Gas, MemoryExtensionResult},
    table::InstructionTable,
    Host, InstructionResult, InterpreterAction,
};
use primitives::{hardfork::SpecId, Bytes};

/// Interpreter state of one call frame.
///
/// The interpreter is a synchronous coroutine: `run` executes instructions
/// until the frame terminates or a call/create opcode populates
/// `next_action`, at which point control returns to the orchestrator. The
/// orchestrator resumes a suspended frame by injecting the child's outcome
/// and setting `status` back to [`InstructionResult::Continue`].
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interpreter {
    /// The execution target.
    pub contract: Contract,
    /// Program counter, an index into the bytecode.
    pub pc: usize,
    /// Gas state of the frame.
    pub gas: Gas,
    /// The word stack.
    pub stack: Stack,
    /// This frame's view of the shared memory buffer.
    pub memory: SharedMemory,
    /// Return data of the most recent completed sub-call.
    pub return_data: Bytes,
    /// Status of the frame; `Continue` while running.
    pub status: InstructionResult,
    /// Action for the orchestrator, populated at suspension points.
    pub next_action: InterpreterAction,
    /// Active hardfork.
    pub spec_id: SpecId,
    /// Whether the frame executes in a static context.
    pub is_static: bool,
}

impl Interpreter {
    /// Builds the interpreter for one frame. `memory` is this transaction's
    /// shared buffer with a context already opened for the frame.
    pub fn new(
        contract: Contract,
        gas_limit: u64,
        memory: SharedMemory,
        spec_id: SpecId,
        is_static: bool,
    ) -> Self {
        Self {
            contract,
            pc: 0,
            gas: Gas::new(gas_limit),
            stack: Stack::new(),
            memory,
            return_data: Bytes::new(),
            status: InstructionResult::Continue,
            next_action: InterpreterAction::None,
            spec_id,
            is_static,
        }
    }

    /// Executes one instruction.
    ///
    /// The program counter is advanced past the opcode before the handler
    /// runs; `PUSH` handlers consume their immediate on top of that and
    /// jumps assign the counter absolutely.
    #[inline]
    pub fn step<H: Host + ?Sized>(&mut self, table: &InstructionTable<H>, host: &mut H) {
        let opcode = self.contract.bytecode.opcode(self.pc);
        let instruction = &table[opcode as usize];
        let info = &instruction.info;

        // Table prechecks: fork gating and stack bounds, so handlers can
        // assume their operands are present.
        if !self.spec_id.is_enabled_in(info.enabled_in) {
            self.status = InstructionResult::NotActivated;
            return;
        }
        let len = self.stack.len();
        if len < info.inputs as usize {
            self.status = InstructionResult::StackUnderflow;
            return;
        }
        if len - info.inputs as usize + info.outputs as usize > STACK_LIMIT {
            self.status = InstructionResult::StackOverflow;
            return;
        }

        self.pc += 1;
        (instruction.exec)(self, host);
    }

    /// Runs the frame until it terminates or suspends, returning the action
    /// for the orchestrator.
    pub fn run<H: Host + ?Sized>(
        &mut self,
        table: &InstructionTable<H>,
        host: &mut H,
    ) -> InterpreterAction {
        while self.status == InstructionResult::Continue {
            self.step(table, host);
        }
        match core::mem::take(&mut self.next_action) {
            InterpreterAction::None => {
                // Plain halt without an explicit action (faults, STOP paths
                // that did not set one).
                InterpreterAction::new_halt(self.status, self.gas)
            }
            action => action,
        }
    }

    /// Grows memory to cover `offset + len`, charging the expansion delta.
    /// Sets the failing status and returns `false` on overflow or
    /// out-of-gas.
    #[inline]
    #[must_use]
    pub fn resize_memory(&mut self, offset: usize, len: usize) -> bool {
        let Some(new_size) = offset.checked_add(len) else {
            self.status = InstructionResult::InvalidOperandOOG;
            return false;
        };
        if new_size > self.memory.len() {
            let new_words = num_words(new_size);
            match self.gas.record_memory_expansion(new_words) {
                MemoryExtensionResult::Extended => self.memory.resize(new_words * 32),
                MemoryExtensionResult::Same => {}
                MemoryExtensionResult::OutOfGas => {
                    self.status = InstructionResult::MemoryOOG;
                    return false;
                }
            }
        }
        true
    }
}

/// The terminal condition of a frame: status, output and remaining gas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpreterResult {
    /// Terminal status.
    pub result: InstructionResult,
    /// Output bytes; revert data for reverts, deployed code for creations.
    pub output: Bytes,
    /// Gas state at termination.
    pub gas: Gas,
}

impl InterpreterResult {
    /// Bundles a terminal condition.
    pub fn new(result: InstructionResult, output: Bytes, gas: Gas) -> Self {
        Self {
            result,
            output,
            gas,
        }
    }

    /// Returns `true` for successful terminals.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns `true` for revert-class terminals.
    #[inline]
    pub const fn is_revert(&self) -> bool {
        self.result.is_revert()
    }

    /// Returns `true` for engine-level faults.
    #[inline]
    pub const fn is_error(&self) -> bool {
        self.result.is_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{instruction_table, DummyHost};
    use bytecode::{opcode, Bytecode};
    use primitives::U256;

    fn interpreter_for(code: Vec<u8>, spec_id: SpecId) -> Interpreter {
        let bytecode = Bytecode::new_raw(code.into()).into_analyzed();
        let contract = Contract {
            bytecode,
            ..Default::default()
        };
        let mut memory = SharedMemory::new();
        memory.new_context();
        Interpreter::new(contract, 1_000_000, memory, spec_id, false)
    }

    fn run(interpreter: &mut Interpreter) -> InterpreterAction {
        let table = instruction_table::<DummyHost>();
        let mut host = DummyHost::default();
        interpreter.run(&table, &mut host)
    }

    #[test]
    fn add_with_wraparound() {
        let mut code = vec![opcode::PUSH32];
        code.extend_from_slice(&[0xFF; 32]);
        code.extend_from_slice(&[opcode::PUSH1, 0x01, opcode::ADD, opcode::STOP]);
        let mut interpreter = interpreter_for(code, SpecId::CANCUN);
        let action = run(&mut interpreter);
        assert!(matches!(
            action,
            InterpreterAction::Return { result } if result.result == InstructionResult::Stop
        ));
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);
    }

    #[test]
    fn disabled_opcode_faults() {
        // PUSH0 does not exist before Shanghai.
        let mut interpreter = interpreter_for(vec![opcode::PUSH0], SpecId::MERGE);
        let action = run(&mut interpreter);
        assert!(matches!(
            action,
            InterpreterAction::Return { result } if result.result == InstructionResult::NotActivated
        ));

        let mut interpreter = interpreter_for(vec![opcode::PUSH0], SpecId::SHANGHAI);
        let action = run(&mut interpreter);
        assert!(matches!(
            action,
            InterpreterAction::Return { result } if result.result == InstructionResult::Stop
        ));
    }

    #[test]
    fn stack_underflow_is_caught_before_the_handler() {
        let mut interpreter = interpreter_for(vec![opcode::ADD], SpecId::CANCUN);
        let action = run(&mut interpreter);
        assert!(matches!(
            action,
            InterpreterAction::Return { result }
                if result.result == InstructionResult::StackUnderflow
        ));
    }

    #[test]
    fn gas_accounting_of_a_simple_program() {
        // PUSH1 PUSH1 ADD -> 3 + 3 + 3, plus the implicit STOP.
        let mut interpreter = interpreter_for(
            vec![opcode::PUSH1, 0x01, opcode::PUSH1, 0x02, opcode::ADD],
            SpecId::CANCUN,
        );
        let _ = run(&mut interpreter);
        assert_eq!(interpreter.gas.spent(), 9);
    }
}
