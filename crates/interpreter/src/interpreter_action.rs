//! The suspension actions the interpreter hands to the orchestrator, and the
//! outcomes the orchestrator injects back.

use crate::{Gas, InstructionResult, InterpreterResult};
use core::ops::Range;
use primitives::{keccak256, Address, Bytes, B256, U256};
use std::boxed::Box;

/// What the orchestrator should do next for this frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpreterAction {
    /// Still running; no action requested.
    #[default]
    None,
    /// A `CALL`-family opcode suspended the frame.
    Call {
        /// Inputs for the child call frame.
        inputs: Box<CallInputs>,
    },
    /// `CREATE` or `CREATE2` suspended the frame.
    Create {
        /// Inputs for the child create frame.
        inputs: Box<CreateInputs>,
    },
    /// The frame terminated.
    Return {
        /// Terminal status, output and gas of the frame.
        result: InterpreterResult,
    },
}

impl InterpreterAction {
    /// A terminal action with output data.
    pub fn new_return(result: InstructionResult, output: Bytes, gas: Gas) -> Self {
        Self::Return {
            result: InterpreterResult::new(result, output, gas),
        }
    }

    /// A terminal action without output.
    pub fn new_halt(result: InstructionResult, gas: Gas) -> Self {
        Self::new_return(result, Bytes::new(), gas)
    }
}

/// Inputs of a `CALL`-family child frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallInputs {
    /// Calldata, copied out of the caller's memory.
    pub input: Bytes,
    /// Caller memory range the output is written back to.
    pub return_memory_offset: Range<usize>,
    /// Gas forwarded to the child, stipend included.
    pub gas_limit: u64,
    /// Account the executed bytecode is loaded from.
    pub bytecode_address: Address,
    /// Account whose storage the child operates on.
    pub target_address: Address,
    /// Caller as seen by the child.
    pub caller: Address,
    /// Value semantics of the call.
    pub value: CallValue,
    /// Which call opcode produced this frame.
    pub scheme: CallScheme,
    /// Whether the child executes in a static context.
    pub is_static: bool,
}

impl CallInputs {
    /// Returns `true` if the call moves a non-zero balance.
    pub fn transfers_value(&self) -> bool {
        matches!(self.value, CallValue::Transfer(value) if !value.is_zero())
    }
}

/// The `CALL`-family opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallScheme {
    /// `CALL`.
    Call,
    /// `CALLCODE`: foreign code, own storage, value transferred to self.
    CallCode,
    /// `DELEGATECALL`: foreign code, own storage, caller and value inherited.
    DelegateCall,
    /// `STATICCALL`: no state changes allowed downstream.
    StaticCall,
}

/// Value carried by a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallValue {
    /// The value is transferred from caller to target.
    Transfer(U256),
    /// The value is only apparent: `CALLVALUE` reports it, but no balance
    /// moves (`DELEGATECALL` inheriting the parent's value).
    Limbo(U256),
}

impl CallValue {
    /// The carried amount, transferred or not.
    pub fn get(&self) -> U256 {
        match *self {
            Self::Transfer(value) | Self::Limbo(value) => value,
        }
    }

    /// The transferred amount; zero for apparent value.
    pub fn transfer(&self) -> U256 {
        match *self {
            Self::Transfer(value) => value,
            Self::Limbo(_) => U256::ZERO,
        }
    }
}

/// Inputs of a `CREATE`/`CREATE2` child frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateInputs {
    /// Creator of the contract.
    pub caller: Address,
    /// Address derivation scheme.
    pub scheme: CreateScheme,
    /// Endowment of the new contract.
    pub value: U256,
    /// Init code, copied out of the caller's memory.
    pub init_code: Bytes,
    /// Gas forwarded to the child.
    pub gas_limit: u64,
}

impl CreateInputs {
    /// Derives the created address: `keccak(rlp([caller, nonce]))[12..]` for
    /// `CREATE`, `keccak(0xff ++ caller ++ salt ++ keccak(init_code))[12..]`
    /// for `CREATE2`.
    pub fn created_address(&self, nonce: u64) -> Address {
        match self.scheme {
            CreateScheme::Create => self.caller.create(nonce),
            CreateScheme::Create2 { salt } => self
                .caller
                .create2(B256::from(salt), keccak256(&self.init_code)),
        }
    }
}

/// Address derivation scheme of a creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreateScheme {
    /// `CREATE`: address from creator and nonce.
    Create,
    /// `CREATE2`: address from creator, salt and init-code hash.
    Create2 {
        /// The salt.
        salt: U256,
    },
}

/// Result of a finished call frame, as injected into the parent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallOutcome {
    /// Terminal status, output and gas of the child.
    pub result: InterpreterResult,
    /// Parent memory range the output is copied into.
    pub memory_offset: Range<usize>,
}

impl CallOutcome {
    /// Wraps a child result.
    pub fn new(result: InterpreterResult, memory_offset: Range<usize>) -> Self {
        Self {
            result,
            memory_offset,
        }
    }

    /// Terminal status of the child.
    pub fn instruction_result(&self) -> InstructionResult {
        self.result.result
    }

    /// Output bytes of the child.
    pub fn output(&self) -> &Bytes {
        &self.result.output
    }
}

/// Result of a finished create frame, as injected into the parent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateOutcome {
    /// Terminal status, output and gas of the child.
    pub result: InterpreterResult,
    /// Address of the created contract, when one was derived.
    pub address: Option<Address>,
}

impl CreateOutcome {
    /// Wraps a child result.
    pub fn new(result: InterpreterResult, address: Option<Address>) -> Self {
        Self { result, address }
    }

    /// Terminal status of the child.
    pub fn instruction_result(&self) -> InstructionResult {
        self.result.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::address;

    #[test]
    fn create2_address_is_deterministic() {
        let inputs = CreateInputs {
            caller: address!("0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b"),
            scheme: CreateScheme::Create2 {
                salt: U256::from(12345),
            },
            value: U256::ZERO,
            init_code: Bytes::from(vec![0x60, 0x00, 0x60, 0x00, 0xf3]),
            gas_limit: 100_000,
        };

        let address = inputs.created_address(0);
        // Hand-derived: keccak(0xff ++ caller ++ salt ++ keccak(init_code))[12..].
        let mut preimage = Vec::with_capacity(85);
        preimage.push(0xff);
        preimage.extend_from_slice(inputs.caller.as_slice());
        preimage.extend_from_slice(&B256::from(U256::from(12345))[..]);
        preimage.extend_from_slice(keccak256(&inputs.init_code).as_slice());
        let expected = Address::from_slice(&keccak256(&preimage)[12..]);
        assert_eq!(address, expected);

        // Nonce does not participate in CREATE2.
        assert_eq!(inputs.created_address(7), address);
    }

    #[test]
    fn limbo_value_is_apparent_only() {
        let value = CallValue::Limbo(U256::from(55));
        assert_eq!(value.get(), U256::from(55));
        assert_eq!(value.transfer(), U256::ZERO);
        let value = CallValue::Transfer(U256::from(55));
        assert_eq!(value.transfer(), U256::from(55));
    }
}
