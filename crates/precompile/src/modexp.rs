//! Big-integer modular exponentiation (EIP-198, repriced by EIP-2565).

use crate::{
    u64_to_address,
    utilities::{left_pad_vec, right_pad, right_pad_vec},
    PrecompileError, PrecompileOutput, PrecompileResult, PrecompileWithAddress,
};
use primitives::{Bytes, U256};

/// Modexp precompile at address 5 with EIP-198 pricing.
pub const BYZANTIUM: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(5), byzantium_run);

/// Modexp precompile at address 5 with EIP-2565 pricing.
pub const BERLIN: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(5), berlin_run);

/// Runs modexp with Byzantium pricing.
pub fn byzantium_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_inner(input, gas_limit, 0, byzantium_gas_calc)
}

/// Runs modexp with Berlin pricing.
pub fn berlin_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_inner(input, gas_limit, 200, berlin_gas_calc)
}

fn run_inner(
    input: &[u8],
    gas_limit: u64,
    min_gas: u64,
    calc_gas: fn(u64, u64, u64, &U256) -> u64,
) -> PrecompileResult {
    // The header is three 32-byte big-endian lengths.
    let header = right_pad::<96>(input);
    let base_len = read_len(&header[0..32])?;
    let exp_len = read_len(&header[32..64])?;
    let mod_len = read_len(&header[64..96])?;

    if base_len == 0 && mod_len == 0 {
        if min_gas > gas_limit {
            return Err(PrecompileError::OutOfGas);
        }
        return Ok(PrecompileOutput::new(min_gas, Bytes::new()));
    }

    // Guard the combined length before any buffer arithmetic.
    let total_len = base_len
        .checked_add(exp_len)
        .and_then(|len| len.checked_add(mod_len))
        .ok_or(PrecompileError::ModexpLengthOverflow)?;

    let payload = input.get(96..).unwrap_or(&[]);

    // The gas formulas only look at the first 32 exponent bytes.
    let exp_highp_len = exp_len.min(32);
    let exp_highp_start = payload.len().min(base_len);
    let exp_highp_slice = payload
        .get(exp_highp_start..(base_len.saturating_add(exp_highp_len)).min(payload.len()))
        .unwrap_or(&[]);
    let mut exp_highp_padded = [0u8; 32];
    exp_highp_padded[32 - exp_highp_len..32 - exp_highp_len + exp_highp_slice.len()]
        .copy_from_slice(exp_highp_slice);
    let exp_highp = U256::from_be_bytes(exp_highp_padded);

    let gas_used = calc_gas(base_len as u64, exp_len as u64, mod_len as u64, &exp_highp)
        .max(min_gas);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let payload = right_pad_vec(payload, total_len);
    let base = &payload[..base_len];
    let exponent = &payload[base_len..base_len + exp_len];
    let modulus = &payload[base_len + exp_len..base_len + exp_len + mod_len];

    let output = aurora_engine_modexp::modexp(base, exponent, modulus);
    Ok(PrecompileOutput::new(
        gas_used,
        left_pad_vec(&output, mod_len).into(),
    ))
}

fn read_len(bytes: &[u8]) -> Result<usize, PrecompileError> {
    let value = U256::from_be_slice(bytes);
    usize::try_from(value).map_err(|_| PrecompileError::ModexpLengthOverflow)
}

/// Number of squarings the exponent implies, as defined by EIP-198.
fn iteration_count(exp_len: u64, exp_highp: &U256) -> u64 {
    if exp_len <= 32 && exp_highp.is_zero() {
        0
    } else if exp_len <= 32 {
        exp_highp.bit_len() as u64 - 1
    } else {
        8u64.saturating_mul(exp_len - 32) + exp_highp.bit_len().saturating_sub(1) as u64
    }
    .max(1)
}

fn byzantium_gas_calc(base_len: u64, exp_len: u64, mod_len: u64, exp_highp: &U256) -> u64 {
    fn mult_complexity(x: u128) -> u128 {
        if x <= 64 {
            x * x
        } else if x <= 1024 {
            x * x / 4 + 96 * x - 3072
        } else {
            x * x / 16 + 480 * x - 199_680
        }
    }

    let mult = mult_complexity(core::cmp::max(base_len, mod_len) as u128);
    let iterations = iteration_count(exp_len, exp_highp) as u128;
    u64::try_from(mult.saturating_mul(iterations) / 20).unwrap_or(u64::MAX)
}

fn berlin_gas_calc(base_len: u64, exp_len: u64, mod_len: u64, exp_highp: &U256) -> u64 {
    let words = (core::cmp::max(base_len, mod_len) as u128).div_ceil(8);
    let mult = words.saturating_mul(words);
    let iterations = iteration_count(exp_len, exp_highp) as u128;
    let gas = mult.saturating_mul(iterations) / 3;
    u64::try_from(gas).unwrap_or(u64::MAX).max(200)
}
