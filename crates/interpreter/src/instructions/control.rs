use crate::{gas, interpreter::Interpreter, Host, InstructionResult, InterpreterAction};
use primitives::{Bytes, U256};

pub fn jump<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::MID);
    popn!([target], interpreter);
    jump_inner(interpreter, target);
}

pub fn jumpi<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::HIGH);
    popn!([target, cond], interpreter);
    if !cond.is_zero() {
        jump_inner(interpreter, target);
    }
}

/// Validates the target against the jump-dest set of the currently
/// executing bytecode, then jumps absolutely.
#[inline]
fn jump_inner(interpreter: &mut Interpreter, target: U256) {
    let target = as_usize_or_fail!(interpreter, target, InstructionResult::InvalidJump);
    if !interpreter.contract.is_valid_jump(target) {
        interpreter.status = InstructionResult::InvalidJump;
        return;
    }
    interpreter.pc = target;
}

pub fn jumpdest<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::JUMPDEST);
}

pub fn pc<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    // The counter was already advanced past this opcode.
    push!(interpreter, U256::from(interpreter.pc - 1));
}

#[inline]
fn return_inner(interpreter: &mut Interpreter, status: InstructionResult) {
    popn!([offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    // Offset is ignored for zero-length output.
    let mut output = Bytes::new();
    if len != 0 {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        output = Bytes::copy_from_slice(interpreter.memory.slice(offset, len));
    }
    interpreter.status = status;
    interpreter.next_action = InterpreterAction::new_return(status, output, interpreter.gas);
}

pub fn ret<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    return_inner(interpreter, InstructionResult::Return);
}

/// EIP-140 `REVERT`.
pub fn revert<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    return_inner(interpreter, InstructionResult::Revert);
}

pub fn stop<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    interpreter.status = InstructionResult::Stop;
}

pub fn invalid<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    interpreter.gas.spend_all();
    interpreter.status = InstructionResult::InvalidFEOpcode;
}

pub fn unknown<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    interpreter.status = InstructionResult::OpcodeNotFound;
}
