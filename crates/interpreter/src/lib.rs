//! # cinder-interpreter
//!
//! The bytecode interpreter: word stack, shared memory, gas tracking, the
//! 256-entry dispatch table and every opcode handler. The interpreter is a
//! synchronous coroutine; call/create opcodes suspend it with a
//! [`InterpreterAction`] that the orchestrator consumes.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
pub mod instructions;

pub mod gas;
mod host;
mod instruction_result;
pub mod interpreter;
mod interpreter_action;
mod table;

pub use gas::Gas;
pub use host::{AccountLoad, DummyHost, Host, SStoreResult, SelfDestructResult, StateLoad};
pub use instruction_result::{InstructionResult, SuccessOrHalt};
pub use interpreter::{
    Contract, Interpreter, InterpreterResult, SharedMemory, Stack, STACK_LIMIT,
};
pub use interpreter_action::{
    CallInputs, CallOutcome, CallScheme, CallValue, CreateInputs, CreateOutcome, CreateScheme,
    InterpreterAction,
};
pub use table::{instruction_table, Instruction, InstructionTable};
