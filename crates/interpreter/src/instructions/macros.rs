//! Utility macros for the opcode handlers.
//!
//! Handlers fail by setting the interpreter status and returning; these
//! macros wrap that pattern.

/// Fails the instruction when the frame is static.
#[macro_export]
macro_rules! require_non_staticcall {
    ($interpreter:expr) => {
        if $interpreter.is_static {
            $interpreter.status = $crate::InstructionResult::StateChangeDuringStaticCall;
            return;
        }
    };
}

/// Charges a gas cost, failing the instruction on exhaustion.
#[macro_export]
macro_rules! gas {
    ($interpreter:expr, $gas:expr) => {
        $crate::gas!($interpreter, $gas, ())
    };
    ($interpreter:expr, $gas:expr, $ret:expr) => {
        if !$interpreter.gas.record_cost($gas) {
            $interpreter.gas.spend_all();
            $interpreter.status = $crate::InstructionResult::OutOfGas;
            return $ret;
        }
    };
}

/// Charges an `Option<u64>` gas cost; `None` counts as exhaustion.
#[macro_export]
macro_rules! gas_or_fail {
    ($interpreter:expr, $gas:expr) => {
        $crate::gas_or_fail!($interpreter, $gas, ())
    };
    ($interpreter:expr, $gas:expr, $ret:expr) => {
        match $gas {
            Some(cost) => $crate::gas!($interpreter, cost, $ret),
            None => {
                $interpreter.gas.spend_all();
                $interpreter.status = $crate::InstructionResult::OutOfGas;
                return $ret;
            }
        }
    };
}

/// Records a refund delta.
#[macro_export]
macro_rules! refund {
    ($interpreter:expr, $refund:expr) => {
        $interpreter.gas.record_refund($refund)
    };
}

/// Pops n values off the stack, failing the instruction on underflow.
/// The first binding is the old top of the stack.
#[macro_export]
macro_rules! popn {
    ([ $($x:ident),* ], $interpreter:expr $(,$ret:expr)?) => {
        let Some([$($x),*]) = $interpreter.stack.popn() else {
            $interpreter.status = $crate::InstructionResult::StackUnderflow;
            return $($ret)?;
        };
    };
}

/// Pops n values and binds a mutable reference to the new top.
#[macro_export]
macro_rules! popn_top {
    ([ $($x:ident),* ], $top:ident, $interpreter:expr $(,$ret:expr)?) => {
        let Some(([$($x),*], $top)) = $interpreter.stack.popn_top() else {
            $interpreter.status = $crate::InstructionResult::StackUnderflow;
            return $($ret)?;
        };
    };
}

/// Pushes a value, failing the instruction on overflow.
#[macro_export]
macro_rules! push {
    ($interpreter:expr, $value:expr $(,$ret:expr)?) => {
        if !$interpreter.stack.push($value) {
            $interpreter.status = $crate::InstructionResult::StackOverflow;
            return $($ret)?;
        }
    };
}

/// Pops an address off the stack: the low 160 bits of the word.
#[macro_export]
macro_rules! pop_address {
    ($interpreter:expr, $address:ident $(,$ret:expr)?) => {
        popn!([word], $interpreter $(,$ret)?);
        let $address = primitives::Address::from_word(primitives::B256::from(word));
    };
}

/// Converts a word to `u64`, saturating.
#[macro_export]
macro_rules! as_u64_saturated {
    ($word:expr) => {{
        let limbs = $word.as_limbs();
        if (limbs[1] == 0) & (limbs[2] == 0) & (limbs[3] == 0) {
            limbs[0]
        } else {
            u64::MAX
        }
    }};
}

/// Converts a word to `usize`, saturating.
#[macro_export]
macro_rules! as_usize_saturated {
    ($word:expr) => {
        usize::try_from($crate::as_u64_saturated!($word)).unwrap_or(usize::MAX)
    };
}

/// Converts a word to `usize`, failing the instruction when it does not fit.
#[macro_export]
macro_rules! as_usize_or_fail {
    ($interpreter:expr, $word:expr) => {
        $crate::as_usize_or_fail_ret!($interpreter, $word, $crate::InstructionResult::InvalidOperandOOG, ())
    };
    ($interpreter:expr, $word:expr, $reason:expr) => {
        $crate::as_usize_or_fail_ret!($interpreter, $word, $reason, ())
    };
}

/// Converts a word to `usize`, failing the instruction with `$reason` and
/// returning `$ret` when it does not fit.
#[macro_export]
macro_rules! as_usize_or_fail_ret {
    ($interpreter:expr, $word:expr, $ret:expr) => {
        $crate::as_usize_or_fail_ret!($interpreter, $word, $crate::InstructionResult::InvalidOperandOOG, $ret)
    };
    ($interpreter:expr, $word:expr, $reason:expr, $ret:expr) => {{
        let limbs = $word.as_limbs();
        if (limbs[0] > usize::MAX as u64) | (limbs[1] != 0) | (limbs[2] != 0) | (limbs[3] != 0) {
            $interpreter.status = $reason;
            return $ret;
        }
        limbs[0] as usize
    }};
}

/// Expands memory to cover the given range, failing the instruction when the
/// expansion gas cannot be paid.
#[macro_export]
macro_rules! resize_memory {
    ($interpreter:expr, $offset:expr, $len:expr) => {
        $crate::resize_memory!($interpreter, $offset, $len, ())
    };
    ($interpreter:expr, $offset:expr, $len:expr, $ret:expr) => {
        if !$interpreter.resize_memory($offset, $len) {
            return $ret;
        }
    };
}
