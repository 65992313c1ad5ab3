//! SHA-256 and RIPEMD-160 precompiles.

use crate::{
    calc_linear_cost_u32, u64_to_address, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use ripemd::Digest as _;
use primitives::Bytes;

/// SHA-256 precompile at address 2.
pub const SHA256: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(2), sha256_run);

/// RIPEMD-160 precompile at address 3.
pub const RIPEMD160: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(3), ripemd160_run);

/// SHA-256 of the input; 60 gas base plus 12 per word.
pub fn sha256_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let gas_used = calc_linear_cost_u32(input.len(), 60, 12);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let output = sha2::Sha256::digest(input);
    Ok(PrecompileOutput::new(gas_used, output.to_vec().into()))
}

/// RIPEMD-160 of the input, left-padded to 32 bytes; 600 gas base plus 120
/// per word.
pub fn ripemd160_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let gas_used = calc_linear_cost_u32(input.len(), 600, 120);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let mut output = [0u8; 32];
    let hash = ripemd::Ripemd160::digest(input);
    output[12..].copy_from_slice(&hash);
    Ok(PrecompileOutput::new(gas_used, Bytes::copy_from_slice(&output)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hex;

    #[test]
    fn sha256_of_empty_input() {
        let out = sha256_run(&[], 100).unwrap();
        assert_eq!(out.gas_used, 60);
        assert_eq!(
            out.bytes.as_ref(),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn ripemd160_output_is_left_padded() {
        let out = ripemd160_run(b"abc", 1000).unwrap();
        assert_eq!(out.gas_used, 720);
        assert_eq!(&out.bytes[..12], &[0u8; 12]);
        assert_eq!(
            &out.bytes[12..],
            hex!("8eb208f7e05d987a9b044a8e98c6b087f15a0bfc")
        );
    }

    #[test]
    fn out_of_gas() {
        assert_eq!(sha256_run(&[], 59), Err(PrecompileError::OutOfGas));
    }
}
