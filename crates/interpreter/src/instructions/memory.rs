use crate::{gas, interpreter::Interpreter, Host};
use core::cmp::max;
use primitives::U256;

pub fn mload<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn!([offset], interpreter);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 32);
    push!(interpreter, interpreter.memory.get_u256(offset));
}

pub fn mstore<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn!([offset, value], interpreter);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 32);
    interpreter.memory.set_u256(offset, value);
}

pub fn mstore8<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn!([offset, value], interpreter);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 1);
    interpreter.memory.set_byte(offset, value.byte(0));
}

pub fn msize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.memory.len()));
}

/// EIP-5656 `MCOPY`.
pub fn mcopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([dst, src, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    if len == 0 {
        return;
    }
    let dst = as_usize_or_fail!(interpreter, dst);
    let src = as_usize_or_fail!(interpreter, src);
    resize_memory!(interpreter, max(dst, src), len);
    interpreter.memory.copy(dst, src, len);
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
    fn mstore_mload_round_trip() {
        let interpreter = run_code(vec![
            opcode::PUSH1,
            0x42,
            opcode::PUSH1,
            0,
            opcode::MSTORE,
            opcode::PUSH1,
            0,
            opcode::MLOAD,
            opcode::STOP,
        ]);
        assert_eq!(interpreter.status, InstructionResult::Stop);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(0x42));
    }

    #[test]
    fn msize_reports_word_aligned_length() {
        let interpreter = run_code(vec![
            opcode::PUSH1,
            1,
            opcode::PUSH1,
            33,
            opcode::MSTORE8,
            opcode::MSIZE,
            opcode::STOP,
        ]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(64));
    }

    #[test]
    fn mcopy_moves_overlapping_ranges() {
        let interpreter = run_code(vec![
            opcode::PUSH1,
            0x42,
            opcode::PUSH1,
            0,
            opcode::MSTORE8,
            // copy [0..1] to [1..2]
            opcode::PUSH1,
            1,
            opcode::PUSH1,
            0,
            opcode::PUSH1,
            1,
            opcode::MCOPY,
            opcode::PUSH1,
            0,
            opcode::MLOAD,
            opcode::STOP,
        ]);
        let word = interpreter.stack.peek(0).unwrap();
        assert_eq!(word.to_be_bytes::<32>()[0], 0x42);
        assert_eq!(word.to_be_bytes::<32>()[1], 0x42);
    }
}
