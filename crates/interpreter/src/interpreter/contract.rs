use crate::CallInputs;
use bytecode::Bytecode;
use primitives::{Address, Bytes, B256, U256};

/// The execution target of one frame.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contract {
    /// Calldata of the frame.
    pub input: Bytes,
    /// Bytecode being executed, analyzed or raw per configuration.
    pub bytecode: Bytecode,
    /// Hash of the bytecode; `None` for init code.
    pub hash: Option<B256>,
    /// Account whose storage the frame operates on.
    pub target_address: Address,
    /// Account the bytecode was loaded from; differs from `target_address`
    /// under `DELEGATECALL` and `CALLCODE`. `None` for init code.
    pub bytecode_address: Option<Address>,
    /// Caller of the frame.
    pub caller: Address,
    /// Apparent value of the frame.
    pub call_value: U256,
}

impl Contract {
    /// Builds a frame target. `bytecode` is used as provided; analyze it
    /// first when the configuration asks for it.
    pub fn new(
        input: Bytes,
        bytecode: Bytecode,
        hash: Option<B256>,
        target_address: Address,
        bytecode_address: Option<Address>,
        caller: Address,
        call_value: U256,
    ) -> Self {
        Self {
            input,
            bytecode,
            hash,
            target_address,
            bytecode_address,
            caller,
            call_value,
        }
    }

    /// Builds a frame target from call inputs.
    pub fn new_with_context(
        input: Bytes,
        bytecode: Bytecode,
        hash: Option<B256>,
        inputs: &CallInputs,
    ) -> Self {
        Self::new(
            input,
            bytecode,
            hash,
            inputs.target_address,
            Some(inputs.bytecode_address),
            inputs.caller,
            inputs.value.get(),
        )
    }

    /// Returns `true` if `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid_jump(&self, pc: usize) -> bool {
        self.bytecode.is_valid_jump(pc)
    }
}
