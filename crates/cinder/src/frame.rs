//! Call-frame bookkeeping for the trampoline: per-frame data and the
//! injection of child outcomes into a suspended parent.

use crate::journaled_state::JournalCheckpoint;
use core::cmp::min;
use core::ops::Range;
use interpreter::{
    CallInputs, CallOutcome, CreateInputs, CreateOutcome, InstructionResult, Interpreter,
    InterpreterResult,
};
use primitives::{Address, Bytes, U256};
use std::boxed::Box;

/// Inputs of the transaction's root frame.
#[derive(Clone, Debug)]
pub(crate) enum FrameInput {
    /// A root call.
    Call(Box<CallInputs>),
    /// A root creation.
    Create(Box<CreateInputs>),
}

/// One frame of the call stack.
#[derive(Debug)]
pub(crate) struct Frame {
    /// Interpreter state of the frame.
    pub interpreter: Interpreter,
    /// Call- or create-specific data.
    pub data: FrameData,
    /// Journal restore point opened for this frame.
    pub checkpoint: JournalCheckpoint,
}

/// What kind of frame this is.
#[derive(Clone, Debug)]
pub(crate) enum FrameData {
    /// A call frame remembers where the caller wants the output.
    Call {
        /// Caller memory range the output is copied into.
        return_memory_range: Range<usize>,
    },
    /// A create frame remembers the derived address.
    Create {
        /// Address of the contract being created.
        created_address: Address,
    },
}

/// Result of a fully settled frame.
#[derive(Clone, Debug)]
pub(crate) enum FrameOutcome {
    /// A settled call.
    Call(CallOutcome),
    /// A settled creation.
    Create(CreateOutcome),
}

impl FrameOutcome {
    pub(crate) fn result(&self) -> &InterpreterResult {
        match self {
            Self::Call(outcome) => &outcome.result,
            Self::Create(outcome) => &outcome.result,
        }
    }

    pub(crate) fn created_address(&self) -> Option<Address> {
        match self {
            Self::Call(_) => None,
            Self::Create(outcome) => outcome.address,
        }
    }
}

/// Either a frame to push or an outcome that settled without one
/// (precompile, depth limit, transfer failure, collision, empty code).
pub(crate) enum FrameOrOutcome {
    Frame(Frame),
    Outcome(FrameOutcome),
}

/// Resumes a parent with whichever outcome settled.
pub(crate) fn insert_frame_outcome(interpreter: &mut Interpreter, outcome: FrameOutcome) {
    match outcome {
        FrameOutcome::Call(outcome) => insert_call_outcome(interpreter, outcome),
        FrameOutcome::Create(outcome) => insert_create_outcome(interpreter, outcome),
    }
}

/// Resumes a parent suspended on a call: writes the child's output into the
/// requested memory window, settles gas and pushes the success flag.
pub(crate) fn insert_call_outcome(interpreter: &mut Interpreter, outcome: CallOutcome) {
    let result = outcome.instruction_result();
    interpreter.return_data = outcome.result.output.clone();

    // Copy at most `retSize` bytes into the caller's window; the window was
    // expanded when the call was dispatched.
    let range = &outcome.memory_offset;
    let target_len = min(range.len(), outcome.result.output.len());
    if target_len != 0 {
        interpreter
            .memory
            .set(range.start, &outcome.result.output[..target_len]);
    }

    interpreter.status = InstructionResult::Continue;
    let out_gas = &outcome.result.gas;
    if result.is_ok() {
        interpreter.gas.erase_cost(out_gas.remaining());
        interpreter.gas.record_refund(out_gas.refunded());
        push_flag(interpreter, true);
    } else if result.is_revert() {
        interpreter.gas.erase_cost(out_gas.remaining());
        push_flag(interpreter, false);
    } else {
        // A halted child returns nothing.
        push_flag(interpreter, false);
    }
}

/// Resumes a parent suspended on a create: pushes the created address or
/// zero and settles gas. Only revert data reaches the return buffer
/// (EIP-211).
pub(crate) fn insert_create_outcome(interpreter: &mut Interpreter, outcome: CreateOutcome) {
    let result = outcome.instruction_result();
    interpreter.return_data = if result == InstructionResult::Revert {
        outcome.result.output.clone()
    } else {
        Bytes::new()
    };

    interpreter.status = InstructionResult::Continue;
    let out_gas = &outcome.result.gas;
    if result.is_ok() {
        interpreter.gas.erase_cost(out_gas.remaining());
        interpreter.gas.record_refund(out_gas.refunded());
        let address = outcome.address.unwrap_or_default();
        if !interpreter.stack.push(address.into_word().into()) {
            interpreter.status = InstructionResult::StackOverflow;
        }
    } else {
        if result.is_revert() {
            interpreter.gas.erase_cost(out_gas.remaining());
        }
        push_flag(interpreter, false);
    }
}

fn push_flag(interpreter: &mut Interpreter, success: bool) {
    if !interpreter.stack.push(U256::from(success)) {
        interpreter.status = InstructionResult::StackOverflow;
    }
}
