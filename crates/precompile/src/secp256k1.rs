//! The `ecrecover` precompile, backed by the pure-Rust `k256` crate.
//!
//! Input: `[32-byte message hash][32-byte v][64-byte r || s]`.
//! Output: the recovered address, left-padded to 32 bytes; empty on any
//! recovery failure.

use crate::{
    u64_to_address, utilities::right_pad, PrecompileError, PrecompileOutput, PrecompileResult,
    PrecompileWithAddress,
};
use k256::ecdsa::{Error, RecoveryId, Signature, VerifyingKey};
use primitives::{keccak256, Bytes, B256};

/// `ecrecover` precompile at address 1.
pub const ECRECOVER: PrecompileWithAddress =
    PrecompileWithAddress(u64_to_address(1), ec_recover_run);

/// Flat `ecrecover` cost.
pub const ECRECOVER_BASE: u64 = 3_000;

/// Runs `ecrecover`.
pub fn ec_recover_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if ECRECOVER_BASE > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let input = right_pad::<128>(input);

    // `v` must be a 32-byte big-endian integer equal to 27 or 28.
    if !(input[32..63].iter().all(|&b| b == 0) && matches!(input[63], 27 | 28)) {
        return Ok(PrecompileOutput::new(ECRECOVER_BASE, Bytes::new()));
    }

    let msg = B256::from_slice(&input[0..32]);
    let recid = input[63] - 27;
    let sig: [u8; 64] = input[64..128].try_into().unwrap();

    let output = match ecrecover(&sig, recid, &msg) {
        Ok(address) => Bytes::copy_from_slice(address.as_slice()),
        Err(_) => Bytes::new(),
    };
    Ok(PrecompileOutput::new(ECRECOVER_BASE, output))
}

/// Recovers the signer and returns the keccak of the public key with the
/// first 12 bytes zeroed, which is the address padded to a word.
pub fn ecrecover(sig: &[u8; 64], mut recid: u8, msg: &B256) -> Result<B256, Error> {
    let mut sig = Signature::from_slice(sig.as_slice())?;

    // A high-s signature flips the recovery id when normalized.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recid ^= 1;
    }
    let recid = RecoveryId::from_byte(recid).expect("recovery id is checked to be 0 or 1");

    let recovered_key = VerifyingKey::recover_from_prehash(&msg[..], &sig, recid)?;
    let mut hash = keccak256(
        &recovered_key
            .to_encoded_point(/* compress = */ false)
            .as_bytes()[1..],
    );
    hash[..12].fill(0);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hex;

    #[test]
    fn recovers_a_known_signer() {
        // Vector borrowed from the go-ethereum ecrecover tests.
        let input = hex::decode(
            "38d18acb67d25c8bb9942764b62f18e17054f66a817bd4295423adf9ed98873e\
             000000000000000000000000000000000000000000000000000000000000001b\
             38d18acb67d25c8bb9942764b62f18e17054f66a817bd4295423adf9ed98873e\
             789d1dd423d25f0772d2748d60f7e4b81bb14d086eba8e8e8efb6dcff8a4ae02",
        )
        .unwrap();
        let expected =
            hex::decode("000000000000000000000000ceaccac640adf55b2028469bd36ba501f28b699d")
                .unwrap();

        let out = ec_recover_run(&input, 5000).unwrap();
        assert_eq!(out.gas_used, 3000);
        assert_eq!(out.bytes.as_ref(), expected.as_slice());
    }

    #[test]
    fn invalid_v_returns_empty() {
        let mut input = [0u8; 128];
        input[63] = 29;
        let out = ec_recover_run(&input, 5000).unwrap();
        assert!(out.bytes.is_empty());
    }
}
