//! The identity precompile.

use crate::{
    calc_linear_cost_u32, u64_to_address, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use primitives::Bytes;

/// Identity precompile at address 4.
pub const FUN: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(4), identity_run);

/// Base cost of the operation.
pub const IDENTITY_BASE: u64 = 15;
/// Cost per word.
pub const IDENTITY_PER_WORD: u64 = 3;

/// Copies the input to the output.
pub fn identity_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let gas_used = calc_linear_cost_u32(input.len(), IDENTITY_BASE, IDENTITY_PER_WORD);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    Ok(PrecompileOutput::new(
        gas_used,
        Bytes::copy_from_slice(input),
    ))
}
