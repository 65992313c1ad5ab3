//! The call- and contract-creating opcodes. These never execute the child
//! themselves: they meter gas, gather inputs and suspend the frame with a
//! [`InterpreterAction`] for the orchestrator.

use crate::{
    gas,
    interpreter::Interpreter,
    AccountLoad, CallInputs, CallScheme, CallValue, CreateInputs, CreateScheme, Host,
    InstructionResult, InterpreterAction, StateLoad,
};
use core::{cmp::min, ops::Range};
use primitives::{hardfork::SpecId, Bytes, MAX_INITCODE_SIZE, U256};
use std::boxed::Box;

/// Pops the four memory operands shared by all call opcodes, expands memory
/// for both ranges and copies the input out of it.
#[inline]
fn get_memory_input_and_out_ranges(
    interpreter: &mut Interpreter,
) -> Option<(Bytes, Range<usize>)> {
    popn!([in_offset, in_len, out_offset, out_len], interpreter, None);

    let in_range = resize_memory_range(interpreter, in_offset, in_len)?;
    let mut input = Bytes::new();
    if !in_range.is_empty() {
        input = Bytes::copy_from_slice(interpreter.memory.slice(in_range.start, in_range.len()));
    }

    let ret_range = resize_memory_range(interpreter, out_offset, out_len)?;
    Some((input, ret_range))
}

/// Expands memory for one `(offset, len)` operand pair. Zero-length ranges
/// leave memory untouched.
#[inline]
fn resize_memory_range(
    interpreter: &mut Interpreter,
    offset: U256,
    len: U256,
) -> Option<Range<usize>> {
    let len = as_usize_or_fail_ret!(interpreter, len, None);
    if len == 0 {
        return Some(usize::MAX..usize::MAX);
    }
    let offset = as_usize_or_fail_ret!(interpreter, offset, None);
    resize_memory!(interpreter, offset, len, None);
    Some(offset..offset + len)
}

/// Charges the base call cost and computes the gas forwarded to the child:
/// `min(requested, available - available/64)` from Tangerine (EIP-150).
#[inline]
fn calc_call_gas(
    interpreter: &mut Interpreter,
    account_load: StateLoad<AccountLoad>,
    has_transfer: bool,
    local_gas_limit: u64,
) -> Option<u64> {
    let call_cost = gas::call_cost(
        interpreter.spec_id,
        has_transfer,
        account_load.is_cold,
        account_load.data.is_empty,
    );
    gas!(interpreter, call_cost, None);

    let gas_limit = if interpreter.spec_id.is_enabled_in(SpecId::TANGERINE) {
        min(
            interpreter.gas.remaining_63_of_64_parts(),
            local_gas_limit,
        )
    } else {
        local_gas_limit
    };

    Some(gas_limit)
}

pub fn call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    popn!([value], interpreter);
    let has_transfer = !value.is_zero();
    if interpreter.is_static && has_transfer {
        interpreter.status = InstructionResult::CallNotAllowedInsideStatic;
        return;
    }

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(account_load) = host.load_account(to) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    let Some(mut gas_limit) = calc_call_gas(interpreter, account_load, has_transfer, local_gas_limit)
    else {
        return;
    };
    gas!(interpreter, gas_limit);

    // The stipend rides on top of the forwarded gas, free to the caller.
    if has_transfer {
        gas_limit = gas_limit.saturating_add(gas::CALL_STIPEND);
    }

    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            return_memory_offset,
            gas_limit,
            bytecode_address: to,
            target_address: to,
            caller: interpreter.contract.target_address,
            value: CallValue::Transfer(value),
            scheme: CallScheme::Call,
            is_static: interpreter.is_static,
        }),
    };
    interpreter.status = InstructionResult::CallOrCreate;
}

pub fn call_code<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    popn!([value], interpreter);
    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(mut account_load) = host.load_account(to) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    // CALLCODE acts on its own account, so no new-account surcharge.
    account_load.data.is_empty = false;
    let has_transfer = !value.is_zero();
    let Some(mut gas_limit) = calc_call_gas(interpreter, account_load, has_transfer, local_gas_limit)
    else {
        return;
    };
    gas!(interpreter, gas_limit);

    if has_transfer {
        gas_limit = gas_limit.saturating_add(gas::CALL_STIPEND);
    }

    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            return_memory_offset,
            gas_limit,
            bytecode_address: to,
            target_address: interpreter.contract.target_address,
            caller: interpreter.contract.target_address,
            value: CallValue::Transfer(value),
            scheme: CallScheme::CallCode,
            is_static: interpreter.is_static,
        }),
    };
    interpreter.status = InstructionResult::CallOrCreate;
}

pub fn delegate_call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(mut account_load) = host.load_account(to) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    account_load.data.is_empty = false;
    let Some(gas_limit) = calc_call_gas(interpreter, account_load, false, local_gas_limit) else {
        return;
    };
    gas!(interpreter, gas_limit);

    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            return_memory_offset,
            gas_limit,
            bytecode_address: to,
            target_address: interpreter.contract.target_address,
            // Caller and value pass through unchanged.
            caller: interpreter.contract.caller,
            value: CallValue::Limbo(interpreter.contract.call_value),
            scheme: CallScheme::DelegateCall,
            is_static: interpreter.is_static,
        }),
    };
    interpreter.status = InstructionResult::CallOrCreate;
}

pub fn static_call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(mut account_load) = host.load_account(to) else {
        interpreter.status = InstructionResult::FatalExternalError;
        return;
    };
    account_load.data.is_empty = false;
    let Some(gas_limit) = calc_call_gas(interpreter, account_load, false, local_gas_limit) else {
        return;
    };
    gas!(interpreter, gas_limit);

    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            return_memory_offset,
            gas_limit,
            bytecode_address: to,
            target_address: to,
            caller: interpreter.contract.target_address,
            value: CallValue::Transfer(U256::ZERO),
            scheme: CallScheme::StaticCall,
            is_static: true,
        }),
    };
    interpreter.status = InstructionResult::CallOrCreate;
}

pub fn create<const IS_CREATE2: bool, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) {
    require_non_staticcall!(interpreter);

    popn!([value, code_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);

    let mut init_code = Bytes::new();
    if len != 0 {
        // EIP-3860: initcode is bounded and metered per word.
        if interpreter.spec_id.is_enabled_in(SpecId::SHANGHAI) {
            let max_initcode_size = host
                .env()
                .cfg
                .limit_contract_code_size
                .map(|limit| limit.saturating_mul(2))
                .unwrap_or(MAX_INITCODE_SIZE);
            if len > max_initcode_size {
                interpreter.status = InstructionResult::CreateInitCodeSizeLimit;
                return;
            }
            gas!(interpreter, gas::initcode_cost(len as u64));
        }

        let code_offset = as_usize_or_fail!(interpreter, code_offset);
        resize_memory!(interpreter, code_offset, len);
        init_code = Bytes::copy_from_slice(interpreter.memory.slice(code_offset, len));
    }

    let scheme = if IS_CREATE2 {
        popn!([salt], interpreter);
        // CREATE2 pays for hashing the init code on top of the create base.
        gas_or_fail!(interpreter, gas::create2_cost(len as u64));
        CreateScheme::Create2 { salt }
    } else {
        gas!(interpreter, gas::CREATE);
        CreateScheme::Create
    };

    let mut gas_limit = interpreter.gas.remaining();
    // EIP-150: the caller keeps 1/64.
    if interpreter.spec_id.is_enabled_in(SpecId::TANGERINE) {
        gas_limit -= gas_limit / 64;
    }
    gas!(interpreter, gas_limit);

    interpreter.next_action = InterpreterAction::Create {
        inputs: Box::new(CreateInputs {
            caller: interpreter.contract.target_address,
            scheme,
            value,
            init_code,
            gas_limit,
        }),
    };
    interpreter.status = InstructionResult::CallOrCreate;
}
