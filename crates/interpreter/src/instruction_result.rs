use primitives::result::{HaltReason, OutOfGasError, SuccessReason};

/// Status of a frame after each instruction.
///
/// `Continue` is the running state; everything else is terminal for the
/// frame, and transitions out of `Continue` are one-way.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstructionResult {
    /// Execution continues.
    #[default]
    Continue = 0,
    /// `STOP` opcode.
    Stop,
    /// `RETURN` opcode.
    Return,
    /// `SELFDESTRUCT` opcode.
    SelfDestruct,
    /// The frame suspended on a call or create opcode.
    CallOrCreate,

    // Revert codes
    /// `REVERT` opcode.
    Revert = 0x10,
    /// Call depth exceeded 1024.
    CallTooDeep,
    /// Transfer exceeded the available balance.
    OutOfFunds,

    // Error codes
    /// Gas exhausted.
    OutOfGas = 0x50,
    /// Gas exhausted during memory expansion.
    MemoryOOG,
    /// An operand was too large to meter.
    InvalidOperandOOG,
    /// Gas exhausted inside a precompile.
    PrecompileOOG,
    /// Unassigned opcode byte.
    OpcodeNotFound,
    /// Value-bearing `CALL` inside a static context.
    CallNotAllowedInsideStatic,
    /// State mutation inside a static context.
    StateChangeDuringStaticCall,
    /// The designated invalid opcode (`0xFE`).
    InvalidFEOpcode,
    /// Jump to a target outside the jump-dest set.
    InvalidJump,
    /// Opcode not enabled at the active hardfork.
    NotActivated,
    /// Stack popped below empty.
    StackUnderflow,
    /// Stack pushed above the limit.
    StackOverflow,
    /// Offset outside the return-data buffer.
    OutOfOffset,
    /// `CREATE` target already has code or a nonce.
    CreateCollision,
    /// Balance addition overflowed.
    OverflowPayment,
    /// Precompile execution failed.
    PrecompileError,
    /// Nonce reached its maximum.
    NonceOverflow,
    /// Created contract exceeds the code size limit.
    CreateContractSizeLimit,
    /// Created contract starts with `0xEF` (EIP-3541).
    CreateContractStartingWithEF,
    /// Initcode exceeds the EIP-3860 limit.
    CreateInitCodeSizeLimit,
    /// The backing store failed.
    FatalExternalError,
}

/// Matches every successful terminal status.
#[macro_export]
macro_rules! return_ok {
    () => {
        $crate::InstructionResult::Stop
            | $crate::InstructionResult::Return
            | $crate::InstructionResult::SelfDestruct
    };
}

/// Matches every revert-class terminal status.
#[macro_export]
macro_rules! return_revert {
    () => {
        $crate::InstructionResult::Revert
            | $crate::InstructionResult::CallTooDeep
            | $crate::InstructionResult::OutOfFunds
    };
}

impl InstructionResult {
    /// Returns `true` for successful terminals.
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, return_ok!())
    }

    /// Returns `true` for revert-class terminals.
    #[inline]
    pub const fn is_revert(self) -> bool {
        matches!(self, return_revert!())
    }

    /// Returns `true` for engine-level faults.
    #[inline]
    pub const fn is_error(self) -> bool {
        self as u8 >= Self::OutOfGas as u8
    }
}

/// Classification of a root-frame result for the transaction outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuccessOrHalt {
    /// The transaction succeeded.
    Success(SuccessReason),
    /// The transaction reverted.
    Revert,
    /// The transaction halted with a fault.
    Halt(HaltReason),
    /// The backing store failed; not a transaction outcome.
    FatalExternalError,
    /// Internal statuses that never escape the frame loop.
    Internal,
}

impl From<InstructionResult> for SuccessOrHalt {
    fn from(result: InstructionResult) -> Self {
        match result {
            InstructionResult::Continue | InstructionResult::CallOrCreate => Self::Internal,
            InstructionResult::Stop => Self::Success(SuccessReason::Stop),
            InstructionResult::Return => Self::Success(SuccessReason::Return),
            InstructionResult::SelfDestruct => Self::Success(SuccessReason::SelfDestruct),
            InstructionResult::Revert => Self::Revert,
            InstructionResult::CallTooDeep => Self::Halt(HaltReason::CallTooDeep),
            InstructionResult::OutOfFunds => Self::Halt(HaltReason::OutOfFunds),
            InstructionResult::OutOfGas => {
                Self::Halt(HaltReason::OutOfGas(OutOfGasError::Basic))
            }
            InstructionResult::MemoryOOG => {
                Self::Halt(HaltReason::OutOfGas(OutOfGasError::Memory))
            }
            InstructionResult::InvalidOperandOOG => {
                Self::Halt(HaltReason::OutOfGas(OutOfGasError::InvalidOperand))
            }
            InstructionResult::PrecompileOOG => {
                Self::Halt(HaltReason::OutOfGas(OutOfGasError::Precompile))
            }
            // A fork-disabled opcode is reported the same as an unknown one.
            InstructionResult::OpcodeNotFound | InstructionResult::NotActivated => {
                Self::Halt(HaltReason::OpcodeNotFound)
            }
            InstructionResult::CallNotAllowedInsideStatic => {
                Self::Halt(HaltReason::CallNotAllowedInsideStatic)
            }
            InstructionResult::StateChangeDuringStaticCall => {
                Self::Halt(HaltReason::StateChangeDuringStaticCall)
            }
            InstructionResult::InvalidFEOpcode => Self::Halt(HaltReason::InvalidFEOpcode),
            InstructionResult::InvalidJump => Self::Halt(HaltReason::InvalidJump),
            InstructionResult::StackUnderflow => Self::Halt(HaltReason::StackUnderflow),
            InstructionResult::StackOverflow => Self::Halt(HaltReason::StackOverflow),
            InstructionResult::OutOfOffset => Self::Halt(HaltReason::OutOfOffset),
            InstructionResult::CreateCollision => Self::Halt(HaltReason::CreateCollision),
            InstructionResult::OverflowPayment => Self::Halt(HaltReason::OverflowPayment),
            InstructionResult::PrecompileError => Self::Halt(HaltReason::PrecompileError),
            InstructionResult::NonceOverflow => Self::Halt(HaltReason::NonceOverflow),
            InstructionResult::CreateContractSizeLimit => {
                Self::Halt(HaltReason::CreateContractSizeLimit)
            }
            InstructionResult::CreateContractStartingWithEF => {
                Self::Halt(HaltReason::CreateContractStartingWithEF)
            }
            InstructionResult::CreateInitCodeSizeLimit => {
                Self::Halt(HaltReason::CreateInitCodeSizeLimit)
            }
            InstructionResult::FatalExternalError => Self::FatalExternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_disjoint() {
        let ok = [
            InstructionResult::Stop,
            InstructionResult::Return,
            InstructionResult::SelfDestruct,
        ];
        for result in ok {
            assert!(result.is_ok());
            assert!(!result.is_revert());
            assert!(!result.is_error());
        }

        let revert = [
            InstructionResult::Revert,
            InstructionResult::CallTooDeep,
            InstructionResult::OutOfFunds,
        ];
        for result in revert {
            assert!(!result.is_ok());
            assert!(result.is_revert());
            assert!(!result.is_error());
        }

        let error = [
            InstructionResult::OutOfGas,
            InstructionResult::InvalidJump,
            InstructionResult::StackUnderflow,
            InstructionResult::FatalExternalError,
        ];
        for result in error {
            assert!(!result.is_ok());
            assert!(!result.is_revert());
            assert!(result.is_error());
        }
    }

    #[test]
    fn not_activated_reports_as_unknown_opcode() {
        assert_eq!(
            SuccessOrHalt::from(InstructionResult::NotActivated),
            SuccessOrHalt::Halt(HaltReason::OpcodeNotFound)
        );
    }
}
