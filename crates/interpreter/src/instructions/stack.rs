use crate::{gas, interpreter::Interpreter, Host};
use primitives::U256;

pub fn pop<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    popn!([_value], interpreter);
}

/// EIP-3855 `PUSH0`.
pub fn push0<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::ZERO);
}

/// `PUSH1`..`PUSH32`: read `N` immediate bytes big-endian and advance the
/// program counter past them. Immediates running past the end of the code
/// read as zero.
pub fn push<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    let pc = interpreter.pc;
    let code = interpreter.contract.bytecode.bytes();
    let start = pc.min(code.len());
    let end = (pc + N).min(code.len());

    let mut buf = [0u8; 32];
    buf[32 - N..32 - N + (end - start)].copy_from_slice(&code[start..end]);
    push!(interpreter, U256::from_be_bytes(buf));
    interpreter.pc = pc + N;
}

pub fn dup<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    if let Err(result) = interpreter.stack.dup(N) {
        interpreter.status = result;
    }
}

pub fn swap<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    if let Err(result) = interpreter.stack.swap(N) {
        interpreter.status = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        instruction_table, interpreter::SharedMemory, Contract, DummyHost, InstructionResult,
    };
    use bytecode::{opcode, Bytecode};
    use primitives::hardfork::SpecId;

    fn run_code(code: Vec<u8>) -> Interpreter {
        let contract = Contract {
            bytecode: Bytecode::new_raw(code.into()).into_analyzed(),
            ..Default::default()
        };
        let mut memory = SharedMemory::new();
        memory.new_context();
        let mut interpreter =
            Interpreter::new(contract, 1_000_000, memory, SpecId::CANCUN, false);
        let table = instruction_table::<DummyHost>();
        let mut host = DummyHost::default();
        let _ = interpreter.run(&table, &mut host);
        interpreter
    }

    #[test]
    fn push_then_pop_is_a_noop() {
        let interpreter = run_code(vec![opcode::PUSH1, 42, opcode::POP, opcode::STOP]);
        assert_eq!(interpreter.status, InstructionResult::Stop);
        assert!(interpreter.stack.is_empty());
    }

    #[test]
    fn push_immediates_are_big_endian() {
        let interpreter = run_code(vec![opcode::PUSH2, 0x01, 0x02, opcode::STOP]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(0x0102));
    }

    #[test]
    fn truncated_push_reads_zeros() {
        // PUSH2 with a single immediate byte left in the code.
        let interpreter = run_code(vec![opcode::PUSH2, 0x01]);
        assert_eq!(interpreter.status, InstructionResult::Stop);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(0x0100));
    }

    #[test]
    fn dup1_swap1_keeps_the_top() {
        let interpreter = run_code(vec![
            opcode::PUSH1,
            7,
            opcode::DUP1,
            opcode::SWAP1,
            opcode::STOP,
        ]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(7));
        assert_eq!(interpreter.stack.peek(1).unwrap(), U256::from(7));
    }
}
