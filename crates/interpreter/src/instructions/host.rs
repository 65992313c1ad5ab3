//! Opcodes that read or mutate the world state through the host.

use crate::{gas, interpreter::Interpreter, Host, InstructionResult};
use core::cmp::min;
use primitives::{hardfork::SpecId, Bytes, Log, B256, BLOCK_HASH_HISTORY, U256};
use std::vec::Vec;

pub fn balance<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    let Some(balance) = host.balance(address) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::balance_cost(interpreter.spec_id, balance.is_cold)
    );
    push!(interpreter, balance.data);
}

/// EIP-1884 `SELFBALANCE`.
pub fn selfbalance<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::LOW);
    let Some(balance) = host.balance(interpreter.contract.target_address) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    push!(interpreter, balance.data);
}

pub fn extcodesize<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    let Some(code) = host.code(address) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::extcodesize_cost(interpreter.spec_id, code.is_cold)
    );
    push!(interpreter, U256::from(code.data.len()));
}

/// EIP-1052 `EXTCODEHASH`.
pub fn extcodehash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    let Some(code_hash) = host.code_hash(address) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::extcodehash_cost(interpreter.spec_id, code_hash.is_cold)
    );
    push!(interpreter, code_hash.data.into());
}

pub fn extcodecopy<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    popn!([memory_offset, code_offset, len], interpreter);
    let Some(code) = host.code(address) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };

    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(
        interpreter,
        gas::extcodecopy_cost(interpreter.spec_id, len as u64, code.is_cold)
    );
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let code_offset = min(as_usize_saturated!(code_offset), code.data.len());
    resize_memory!(interpreter, memory_offset, len);
    interpreter
        .memory
        .set_data(memory_offset, code_offset, len, &code.data);
}

/// Hash of one of the 256 most recent blocks; zero outside the window.
pub fn blockhash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BLOCKHASH);
    popn_top!([], number, interpreter);

    let requested = as_u64_saturated!(*number);
    let current = as_u64_saturated!(host.env().block.number);
    let Some(diff) = current.checked_sub(requested) else {
        *number = U256::ZERO;
        return;
    };
    if diff == 0 || diff > BLOCK_HASH_HISTORY {
        *number = U256::ZERO;
        return;
    }
    let Some(hash) = host.block_hash(requested) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    *number = U256::from_be_bytes(hash.0);
}

pub fn sload<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn_top!([], key, interpreter);
    let Some(value) = host.sload(interpreter.contract.target_address, *key) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::sload_cost(interpreter.spec_id, value.is_cold)
    );
    *key = value.data;
}

pub fn sstore<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);
    popn!([key, value], interpreter);
    let Some(result) = host.sstore(interpreter.contract.target_address, key, value) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    let remaining = interpreter.gas.remaining();
    gas_or_fail!(
        interpreter,
        gas::sstore_cost(interpreter.spec_id, &result.data, remaining, result.is_cold)
    );
    refund!(
        interpreter,
        gas::sstore_refund(interpreter.spec_id, &result.data)
    );
}

/// EIP-1153 `TLOAD`.
pub fn tload<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::WARM_STORAGE_READ_COST);
    popn_top!([], key, interpreter);
    *key = host.tload(interpreter.contract.target_address, *key);
}

/// EIP-1153 `TSTORE`.
pub fn tstore<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);
    gas!(interpreter, gas::WARM_STORAGE_READ_COST);
    popn!([key, value], interpreter);
    host.tstore(interpreter.contract.target_address, key, value);
}

pub fn log<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);
    popn!([offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::log_cost(N as u8, len as u64));
    let data = if len == 0 {
        Bytes::new()
    } else {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        Bytes::copy_from_slice(interpreter.memory.slice(offset, len))
    };

    let Some(topic_words) = interpreter.stack.popn::<N>() else {
        interpreter.status = InstructionResult::StackUnderflow;
        return;
    };
    let topics: Vec<B256> = topic_words.into_iter().map(B256::from).collect();

    host.log(Log {
        address: interpreter.contract.target_address,
        topics,
        data,
    });
}

pub fn selfdestruct<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);
    pop_address!(interpreter, target);

    let Some(res) = host.selfdestruct(interpreter.contract.target_address, target) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };

    // EIP-3529 removed the refund.
    if !interpreter.spec_id.is_enabled_in(SpecId::LONDON) && !res.data.previously_destroyed {
        refund!(interpreter, gas::SELFDESTRUCT);
    }
    gas!(interpreter, gas::selfdestruct_cost(interpreter.spec_id, &res));

    interpreter.status = InstructionResult::SelfDestruct;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{instruction_table, interpreter::SharedMemory, Contract, DummyHost};
    use bytecode::{opcode, Bytecode};
    use primitives::{address, Env, U256};

    fn run_code(code: Vec<u8>, host: &mut DummyHost, is_static: bool) -> Interpreter {
        let contract = Contract {
            target_address: address!("0x00000000000000000000000000000000000000c7"),
            bytecode: Bytecode::new_raw(code.into()).into_analyzed(),
            ..Default::default()
        };
        let mut memory = SharedMemory::new();
        memory.new_context();
        let mut interpreter = Interpreter::new(
            contract,
            1_000_000,
            memory,
            primitives::hardfork::SpecId::CANCUN,
            is_static,
        );
        let table = instruction_table::<DummyHost>();
        let _ = interpreter.run(&table, host);
        interpreter
    }

    #[test]
    fn log_records_topics_and_data() {
        // MSTORE8 0xAB at 0, LOG2 over one byte with two topics.
        let code = vec![
            opcode::PUSH1,
            0xAB,
            opcode::PUSH1,
            0,
            opcode::MSTORE8,
            opcode::PUSH1,
            2, // topic2
            opcode::PUSH1,
            1, // topic1
            opcode::PUSH1,
            1, // len
            opcode::PUSH1,
            0, // offset
            opcode::LOG2,
            opcode::STOP,
        ];
        let mut host = DummyHost::default();
        let interpreter = run_code(code, &mut host, false);
        assert_eq!(interpreter.status, InstructionResult::Stop);

        let log = &host.logs[0];
        assert_eq!(log.address, interpreter.contract.target_address);
        assert_eq!(log.topics.len(), 2);
        assert_eq!(log.topics[0], B256::from(U256::from(1)));
        assert_eq!(log.topics[1], B256::from(U256::from(2)));
        assert_eq!(log.data.as_ref(), &[0xAB]);
    }

    #[test]
    fn log_is_forbidden_in_static_context() {
        let code = vec![opcode::PUSH1, 0, opcode::PUSH1, 0, opcode::LOG0];
        let mut host = DummyHost::default();
        let interpreter = run_code(code, &mut host, true);
        assert_eq!(
            interpreter.status,
            InstructionResult::StateChangeDuringStaticCall
        );
        assert!(host.logs.is_empty());
    }

    #[test]
    fn sstore_is_forbidden_in_static_context() {
        let code = vec![opcode::PUSH1, 1, opcode::PUSH1, 0, opcode::SSTORE];
        let mut host = DummyHost::default();
        let interpreter = run_code(code, &mut host, true);
        assert_eq!(
            interpreter.status,
            InstructionResult::StateChangeDuringStaticCall
        );
    }

    #[test]
    fn blockhash_outside_the_window_is_zero() {
        // Current block number is 10; request number 10 (diff 0).
        let code = vec![opcode::PUSH1, 10, opcode::BLOCKHASH, opcode::STOP];
        let mut env = Env::default();
        env.block.number = U256::from(10);
        let mut host = DummyHost::new(env);
        let interpreter = run_code(code, &mut host, false);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);

        // A future block is also zero.
        let code = vec![opcode::PUSH1, 200, opcode::BLOCKHASH, opcode::STOP];
        let mut env = Env::default();
        env.block.number = U256::from(10);
        let mut host = DummyHost::new(env);
        let interpreter = run_code(code, &mut host, false);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);
    }

    #[test]
    fn tload_reads_what_tstore_wrote() {
        let code = vec![
            opcode::PUSH1,
            7,
            opcode::PUSH1,
            1,
            opcode::TSTORE,
            opcode::PUSH1,
            1,
            opcode::TLOAD,
            opcode::STOP,
        ];
        let mut host = DummyHost::default();
        let interpreter = run_code(code, &mut host, false);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(7));
        // Flat 100 gas per transient access plus the four pushes.
        assert_eq!(interpreter.gas.spent(), 4 * 3 + 2 * 100);
    }

    #[test]
    fn selfdestruct_terminates_the_frame() {
        let code = vec![opcode::PUSH1, 0xEE, opcode::SELFDESTRUCT];
        let mut host = DummyHost::default();
        let interpreter = run_code(code, &mut host, false);
        assert_eq!(interpreter.status, InstructionResult::SelfDestruct);
    }
}
