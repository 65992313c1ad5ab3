//! Transaction execution results and the errors that precede execution.

use crate::Log;
use alloy_primitives::{Address, Bytes, U256};
use core::fmt;
use std::vec::Vec;

/// Outcome of a fully executed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionResult {
    /// Execution terminated normally.
    Success {
        /// Why the execution terminated.
        reason: SuccessReason,
        /// Gas consumed, net of the refund.
        gas_used: u64,
        /// Gas refunded at the end of the transaction.
        gas_refunded: u64,
        /// Logs emitted during execution.
        logs: Vec<Log>,
        /// Output of the execution.
        output: Output,
    },
    /// Execution reverted via the `REVERT` opcode; gas was consumed up to the
    /// revert, state changes were rolled back.
    Revert {
        /// Gas consumed.
        gas_used: u64,
        /// Revert payload, returned verbatim.
        output: Bytes,
    },
    /// Execution halted with an engine-level fault, consuming all gas.
    Halt {
        /// The fault.
        reason: HaltReason,
        /// Gas consumed (the full limit).
        gas_used: u64,
    },
}

impl ExecutionResult {
    /// Returns `true` on success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns `true` on revert.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert { .. })
    }

    /// Returns `true` on halt.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt { .. })
    }

    /// Output data, if any. Empty on halts.
    pub fn output(&self) -> Option<&Bytes> {
        match self {
            Self::Success { output, .. } => Some(output.data()),
            Self::Revert { output, .. } => Some(output),
            Self::Halt { .. } => None,
        }
    }

    /// Consumes the result into its output data.
    pub fn into_output(self) -> Option<Bytes> {
        match self {
            Self::Success { output, .. } => Some(output.into_data()),
            Self::Revert { output, .. } => Some(output),
            Self::Halt { .. } => None,
        }
    }

    /// Logs emitted during execution; empty unless successful.
    pub fn logs(&self) -> &[Log] {
        match self {
            Self::Success { logs, .. } => logs,
            _ => &[],
        }
    }

    /// Gas used by the transaction.
    pub fn gas_used(&self) -> u64 {
        match self {
            Self::Success { gas_used, .. }
            | Self::Revert { gas_used, .. }
            | Self::Halt { gas_used, .. } => *gas_used,
        }
    }
}

/// Output of a successful execution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Output {
    /// Return data of a call.
    Call(Bytes),
    /// Deployed code and address of a creation.
    Create(Bytes, Option<Address>),
}

impl Output {
    /// Returns the output data.
    pub fn data(&self) -> &Bytes {
        match self {
            Self::Call(data) | Self::Create(data, _) => data,
        }
    }

    /// Consumes the output into its data.
    pub fn into_data(self) -> Bytes {
        match self {
            Self::Call(data) | Self::Create(data, _) => data,
        }
    }

    /// Address of the created contract, if this was a creation.
    pub fn address(&self) -> Option<&Address> {
        match self {
            Self::Call(_) => None,
            Self::Create(_, address) => address.as_ref(),
        }
    }
}

/// The opcode a successful execution terminated on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SuccessReason {
    /// `STOP` opcode.
    Stop,
    /// `RETURN` opcode.
    Return,
    /// `SELFDESTRUCT` opcode.
    SelfDestruct,
}

/// Engine-level faults surfaced to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HaltReason {
    /// Ran out of gas.
    OutOfGas(OutOfGasError),
    /// Unknown or fork-disabled opcode.
    OpcodeNotFound,
    /// The designated invalid opcode (`0xFE`).
    InvalidFEOpcode,
    /// Jump to a position that is not a `JUMPDEST`.
    InvalidJump,
    /// Value-bearing `CALL` inside a static context.
    CallNotAllowedInsideStatic,
    /// State mutation inside a static context.
    StateChangeDuringStaticCall,
    /// Stack popped below empty.
    StackUnderflow,
    /// Stack pushed above 1024.
    StackOverflow,
    /// Offset outside the return-data buffer.
    OutOfOffset,
    /// `CREATE` target already has code or a nonce.
    CreateCollision,
    /// Precompile failed.
    PrecompileError,
    /// Nonce reached its maximum.
    NonceOverflow,
    /// Created contract exceeds the code size limit.
    CreateContractSizeLimit,
    /// Created contract starts with `0xEF`.
    CreateContractStartingWithEF,
    /// Initcode exceeds the EIP-3860 limit.
    CreateInitCodeSizeLimit,
    /// Balance transfer overflowed.
    OverflowPayment,
    /// Transfer exceeded the sender's balance.
    OutOfFunds,
    /// Call depth exceeded 1024.
    CallTooDeep,
}

/// Distinguishes the places gas can run out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutOfGasError {
    /// Plain gas exhaustion while charging an opcode.
    Basic,
    /// Gas exhaustion during memory expansion.
    Memory,
    /// An operand was too large to meter.
    InvalidOperand,
    /// Gas exhaustion inside a precompile.
    Precompile,
}

/// Errors of the block header that make execution impossible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidHeader {
    /// `prevrandao` is required from the merge onward.
    PrevrandaoNotSet,
    /// Excess blob gas is required from Cancun onward.
    ExcessBlobGasNotSet,
}

impl fmt::Display for InvalidHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrevrandaoNotSet => write!(f, "`prevrandao` not set"),
            Self::ExcessBlobGasNotSet => write!(f, "`excess_blob_gas` not set"),
        }
    }
}

impl core::error::Error for InvalidHeader {}

/// Transaction-level validation failures. The state is untouched when any of
/// these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidTransaction {
    /// Max fee is below the block basefee.
    GasPriceLessThanBasefee,
    /// Transaction gas limit exceeds the block gas limit.
    CallerGasLimitMoreThanBlock,
    /// Intrinsic gas exceeds the transaction gas limit.
    CallGasCostMoreThanGasLimit,
    /// Sender account has deployed code (EIP-3607).
    RejectCallerWithCode,
    /// Sender cannot cover `gas_limit * gas_price + value`.
    LackOfFundForMaxFee {
        /// Required balance.
        fee: U256,
        /// Actual balance.
        balance: U256,
    },
    /// Transaction nonce does not match the sender's.
    NonceMismatch {
        /// Nonce expected by the state.
        state: u64,
        /// Nonce carried by the transaction.
        tx: u64,
    },
    /// Sender nonce is at its maximum.
    NonceOverflow,
    /// Priority fee exceeds the max fee.
    PriorityFeeGreaterThanMaxFee,
    /// Chain id mismatch.
    InvalidChainId,
    /// Create transactions cannot carry blobs.
    BlobCreateTransaction,
    /// Block blob gas price exceeds the transaction maximum.
    BlobGasPriceGreaterThanMax,
}

impl fmt::Display for InvalidTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GasPriceLessThanBasefee => write!(f, "gas price is less than basefee"),
            Self::CallerGasLimitMoreThanBlock => {
                write!(f, "caller gas limit exceeds the block gas limit")
            }
            Self::CallGasCostMoreThanGasLimit => {
                write!(f, "intrinsic gas exceeds the gas limit")
            }
            Self::RejectCallerWithCode => {
                write!(f, "reject transactions from senders with deployed code")
            }
            Self::LackOfFundForMaxFee { fee, balance } => {
                write!(f, "lack of funds ({balance}) for max fee ({fee})")
            }
            Self::NonceMismatch { state, tx } => {
                write!(f, "nonce mismatch: state {state}, tx {tx}")
            }
            Self::NonceOverflow => write!(f, "nonce overflow"),
            Self::PriorityFeeGreaterThanMaxFee => {
                write!(f, "priority fee is greater than max fee")
            }
            Self::InvalidChainId => write!(f, "invalid chain id"),
            Self::BlobCreateTransaction => write!(f, "blob create transaction"),
            Self::BlobGasPriceGreaterThanMax => {
                write!(f, "blob gas price is greater than the max fee per blob gas")
            }
        }
    }
}

impl core::error::Error for InvalidTransaction {}

/// The error type of `transact`: anything that stops a transaction before or
/// outside bytecode execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvmError<DbError> {
    /// Transaction validation failed.
    Transaction(InvalidTransaction),
    /// Block header validation failed.
    Header(InvalidHeader),
    /// The backing store failed.
    Database(DbError),
}

impl<DbError> From<InvalidTransaction> for EvmError<DbError> {
    fn from(value: InvalidTransaction) -> Self {
        Self::Transaction(value)
    }
}

impl<DbError> From<InvalidHeader> for EvmError<DbError> {
    fn from(value: InvalidHeader) -> Self {
        Self::Header(value)
    }
}

impl<DbError: fmt::Display> fmt::Display for EvmError<DbError> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(e) => write!(f, "transaction validation error: {e}"),
            Self::Header(e) => write!(f, "header validation error: {e}"),
            Self::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl<DbError: fmt::Debug + fmt::Display> core::error::Error for EvmError<DbError> {}
