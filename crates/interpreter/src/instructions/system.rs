use crate::{gas, interpreter::Interpreter, Host, InstructionResult};
use primitives::{B256, KECCAK_EMPTY, U256};

pub fn keccak256<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::keccak256_cost(len as u64));
    let hash = if len == 0 {
        KECCAK_EMPTY
    } else {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        primitives::keccak256(interpreter.memory.slice(offset, len))
    };
    push!(interpreter, hash.into());
}

pub fn address<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(
        interpreter,
        interpreter.contract.target_address.into_word().into()
    );
}

pub fn caller<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, interpreter.contract.caller.into_word().into());
}

pub fn callvalue<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, interpreter.contract.call_value);
}

/// Reads a 32-byte window of calldata, zero-padded past the end.
pub fn calldataload<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], offset_ptr, interpreter);
    let mut word = B256::ZERO;
    let offset = as_usize_saturated!(*offset_ptr);
    let input = &interpreter.contract.input;
    if offset < input.len() {
        let count = 32.min(input.len() - offset);
        word[..count].copy_from_slice(&input[offset..offset + count]);
    }
    *offset_ptr = word.into();
}

pub fn calldatasize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.contract.input.len()));
}

pub fn calldatacopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([memory_offset, data_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let data_offset = as_usize_saturated!(data_offset);
    resize_memory!(interpreter, memory_offset, len);
    let input = interpreter.contract.input.clone();
    interpreter
        .memory
        .set_data(memory_offset, data_offset, len, &input);
}

pub fn codesize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.contract.bytecode.len()));
}

pub fn codecopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([memory_offset, code_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let code_offset = as_usize_saturated!(code_offset);
    resize_memory!(interpreter, memory_offset, len);
    let code = interpreter.contract.bytecode.original_bytes();
    interpreter
        .memory
        .set_data(memory_offset, code_offset, len, &code);
}

/// EIP-211 `RETURNDATASIZE`.
pub fn returndatasize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.return_data.len()));
}

/// EIP-211 `RETURNDATACOPY`. Unlike the other copies, a window that is not
/// fully contained in the return buffer faults.
pub fn returndatacopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([memory_offset, data_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));

    let data_offset = as_usize_saturated!(data_offset);
    let data_end = data_offset.saturating_add(len);
    if data_end > interpreter.return_data.len() {
        interpreter.status = InstructionResult::OutOfOffset;
        return;
    }
    if len == 0 {
        return;
    }

    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    resize_memory!(interpreter, memory_offset, len);
    let data = interpreter.return_data.clone();
    interpreter
        .memory
        .set_data(memory_offset, data_offset, len, &data);
}

pub fn gas<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.gas.remaining()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{instruction_table, interpreter::SharedMemory, Contract, DummyHost};
    use bytecode::{opcode, Bytecode};
    use primitives::{b256, hardfork::SpecId, Bytes};

    fn run_code(code: Vec<u8>, input: Bytes) -> Interpreter {
        let contract = Contract {
            input,
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
    fn calldataload_zero_pads_the_tail() {
        let code = vec![opcode::PUSH1, 0, opcode::CALLDATALOAD, opcode::STOP];
        let interpreter = run_code(code, Bytes::from(vec![0x01]));
        // A single byte of calldata lands in the high-order position.
        assert_eq!(
            interpreter.stack.peek(0).unwrap(),
            U256::from(1) << 248
        );
    }

    #[test]
    fn calldataload_past_the_end_is_zero() {
        let code = vec![opcode::PUSH1, 64, opcode::CALLDATALOAD, opcode::STOP];
        let interpreter = run_code(code, Bytes::from(vec![0xFF; 4]));
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);
    }

    #[test]
    fn returndatacopy_window_must_fit() {
        // Return buffer is empty, so any non-empty window faults.
        let code = vec![
            opcode::PUSH1,
            1,
            opcode::PUSH1,
            0,
            opcode::PUSH1,
            0,
            opcode::RETURNDATACOPY,
        ];
        let interpreter = run_code(code, Bytes::new());
        assert_eq!(interpreter.status, InstructionResult::OutOfOffset);
    }

    #[test]
    fn keccak_of_a_known_preimage() {
        // Write 0xFFFFFFFF at offsets 0..4, then KECCAK256(0, 4).
        let mut code = Vec::new();
        for offset in 0u8..4 {
            code.extend_from_slice(&[opcode::PUSH1, 0xFF, opcode::PUSH1, offset, opcode::MSTORE8]);
        }
        code.extend_from_slice(&[
            opcode::PUSH1,
            4,
            opcode::PUSH1,
            0,
            opcode::KECCAK256,
            opcode::STOP,
        ]);
        let interpreter = run_code(code, Bytes::new());
        assert_eq!(
            B256::from(interpreter.stack.peek(0).unwrap()),
            b256!("29045a592007d0c246ef02c2223570da9522d0cf0f73282c79a1bc8f0bb2c238")
        );
    }
}
