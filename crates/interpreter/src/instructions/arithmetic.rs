use super::i256::{i256_div, i256_mod};
use crate::{gas, interpreter::Interpreter, Host};
use primitives::U256;

pub fn add<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1.wrapping_add(*op2);
}

pub fn mul<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1.wrapping_mul(*op2);
}

pub fn sub<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1.wrapping_sub(*op2);
}

pub fn div<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    if !op2.is_zero() {
        *op2 = op1 / *op2;
    }
}

pub fn sdiv<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    *op2 = i256_div(op1, *op2);
}

pub fn rem<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    if !op2.is_zero() {
        *op2 = op1 % *op2;
    }
}

pub fn smod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    *op2 = i256_mod(op1, *op2);
}

/// `(a + b) % n` with a 512-bit intermediate; zero when `n` is zero.
pub fn addmod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::MID);
    popn_top!([op1, op2], op3, interpreter);
    *op3 = op1.add_mod(op2, *op3);
}

/// `(a * b) % n` with a 512-bit intermediate; zero when `n` is zero.
pub fn mulmod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::MID);
    popn_top!([op1, op2], op3, interpreter);
    *op3 = op1.mul_mod(op2, *op3);
}

pub fn exp<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    let spec_id = interpreter.spec_id;
    popn_top!([op1], op2, interpreter);
    gas_or_fail!(interpreter, gas::exp_cost(spec_id, *op2));
    *op2 = op1.pow(*op2);
}

/// `SIGNEXTEND(b, x)`: extend the sign of the byte at position `b` of `x`
/// through the high bytes. A `b` of 31 or more leaves `x` unchanged.
pub fn signextend<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([ext], x, interpreter);
    if ext < U256::from(31) {
        let ext = ext.as_limbs()[0];
        let bit_index = (8 * ext + 7) as usize;
        let bit = x.bit(bit_index);
        let mask = (U256::from(1) << bit_index) - U256::from(1);
        *x = if bit { *x | !mask } else { *x & mask };
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
    fn sub_underflow_wraps() {
        let interpreter = run_code(vec![opcode::PUSH1, 2, opcode::PUSH1, 1, opcode::SUB]);
        assert_eq!(interpreter.status, InstructionResult::Stop);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::MAX);
    }

    #[test]
    fn div_and_mod_by_zero_yield_zero() {
        let interpreter = run_code(vec![opcode::PUSH1, 0, opcode::PUSH1, 9, opcode::DIV]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);
        let interpreter = run_code(vec![opcode::PUSH1, 0, opcode::PUSH1, 9, opcode::MOD]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);
    }

    #[test]
    fn addmod_zero_modulus() {
        let interpreter = run_code(vec![
            opcode::PUSH1,
            0,
            opcode::PUSH1,
            7,
            opcode::PUSH1,
            5,
            opcode::ADDMOD,
        ]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::ZERO);
    }

    #[test]
    fn signextend_of_a_negative_byte() {
        // Extend 0xFF at byte 0: the whole word becomes -1.
        let interpreter = run_code(vec![
            opcode::PUSH1,
            0xFF,
            opcode::PUSH1,
            0,
            opcode::SIGNEXTEND,
        ]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::MAX);

        // A positive byte stays untouched.
        let interpreter = run_code(vec![
            opcode::PUSH1,
            0x7F,
            opcode::PUSH1,
            0,
            opcode::SIGNEXTEND,
        ]);
        assert_eq!(interpreter.stack.peek(0).unwrap(), U256::from(0x7F));
    }
}
