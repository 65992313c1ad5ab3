use super::i256::i256_cmp;
use crate::{gas, interpreter::Interpreter, Host};
use core::cmp::Ordering;
use primitives::U256;

pub fn lt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = U256::from(op1 < *op2);
}

pub fn gt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = U256::from(op1 > *op2);
}

pub fn slt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = U256::from(i256_cmp(&op1, op2) == Ordering::Less);
}

pub fn sgt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = U256::from(i256_cmp(&op1, op2) == Ordering::Greater);
}

pub fn eq<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = U256::from(op1 == *op2);
}

pub fn iszero<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], op1, interpreter);
    *op1 = U256::from(op1.is_zero());
}

pub fn bitand<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1 & *op2;
}

pub fn bitor<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1 | *op2;
}

pub fn bitxor<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1 ^ *op2;
}

pub fn not<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], op1, interpreter);
    *op1 = !*op1;
}

/// `BYTE(i, x)`: the `i`th byte of `x`, counting from the big end; zero when
/// `i` is 32 or more.
pub fn byte<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    let index = as_usize_saturated!(op1);
    *op2 = if index < 32 {
        // `byte` indexes little-endian, the opcode counts big-endian.
        U256::from(op2.byte(31 - index))
    } else {
        U256::ZERO
    };
}

/// EIP-145 `SHL`; shifts of 256 or more produce zero.
pub fn shl<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    let shift = as_usize_saturated!(op1);
    *op2 = if shift < 256 {
        *op2 << shift
    } else {
        U256::ZERO
    };
}

/// EIP-145 `SHR`; shifts of 256 or more produce zero.
pub fn shr<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    let shift = as_usize_saturated!(op1);
    *op2 = if shift < 256 {
        *op2 >> shift
    } else {
        U256::ZERO
    };
}

/// EIP-145 `SAR`; saturates to all-zeros or all-ones by sign.
pub fn sar<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    let shift = as_usize_saturated!(op1);
    *op2 = if shift < 256 {
        op2.arithmetic_shr(shift)
    } else if op2.bit(255) {
        U256::MAX
    } else {
        U256::ZERO
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{instruction_table, interpreter::SharedMemory, Contract, DummyHost};
    use bytecode::{opcode, Bytecode};
    use primitives::{hardfork::SpecId, uint};

    fn run_unop(op: u8, value: U256) -> U256 {
        run_binop_raw(vec![op], &[value])
    }

    fn run_binop(op: u8, top: U256, below: U256) -> U256 {
        run_binop_raw(vec![op], &[below, top])
    }

    fn run_binop_raw(code: Vec<u8>, stack: &[U256]) -> U256 {
        let contract = Contract {
            bytecode: Bytecode::new_raw(code.into()).into_analyzed(),
            ..Default::default()
        };
        let mut memory = SharedMemory::new();
        memory.new_context();
        let mut interpreter =
            Interpreter::new(contract, 1_000_000, memory, SpecId::CANCUN, false);
        for value in stack {
            assert!(interpreter.stack.push(*value));
        }
        let table = instruction_table::<DummyHost>();
        let mut host = DummyHost::default();
        let _ = interpreter.run(&table, &mut host);
        interpreter.stack.peek(0).unwrap()
    }

    #[test]
    fn shifts_of_256_and_more_are_zero() {
        uint! {
            assert_eq!(run_binop(opcode::SHL, 1_U256, 1_U256), 2_U256);
            assert_eq!(run_binop(opcode::SHL, 255_U256, 1_U256), 1_U256 << 255);
            assert_eq!(run_binop(opcode::SHL, 256_U256, 1_U256), 0_U256);
            assert_eq!(run_binop(opcode::SHR, 256_U256, U256::MAX), 0_U256);
            assert_eq!(run_binop(opcode::SHR, 1_U256, 4_U256), 2_U256);
        }
    }

    #[test]
    fn sar_replicates_the_sign() {
        let negative = U256::MAX - U256::from(0xFF);
        assert_eq!(run_binop(opcode::SAR, U256::from(4), negative), U256::MAX - U256::from(0xF));
        assert_eq!(run_binop(opcode::SAR, U256::from(300), negative), U256::MAX);
        assert_eq!(run_binop(opcode::SAR, U256::from(300), U256::from(7)), U256::ZERO);
    }

    #[test]
    fn byte_indexes_big_endian() {
        let value = U256::from(0x0102u64);
        assert_eq!(run_binop(opcode::BYTE, U256::from(31), value), U256::from(2));
        assert_eq!(run_binop(opcode::BYTE, U256::from(30), value), U256::from(1));
        assert_eq!(run_binop(opcode::BYTE, U256::from(32), value), U256::ZERO);
    }

    #[test]
    fn not_not_is_identity() {
        let value = U256::from(0xDEADBEEFu64);
        assert_eq!(run_unop(opcode::NOT, !value), value);
    }

    #[test]
    fn signed_comparisons() {
        let minus_one = U256::MAX;
        assert_eq!(run_binop(opcode::SLT, minus_one, U256::from(1)), U256::from(1));
        assert_eq!(run_binop(opcode::SGT, U256::from(1), minus_one), U256::from(1));
        assert_eq!(run_binop(opcode::LT, minus_one, U256::from(1)), U256::ZERO);
    }
}
