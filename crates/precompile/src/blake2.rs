//! The BLAKE2 `F` compression precompile (EIP-152).

use crate::{
    u64_to_address, PrecompileError, PrecompileOutput, PrecompileResult, PrecompileWithAddress,
};

/// Gas per round.
const F_ROUND: u64 = 1;
/// Fixed input length: rounds, state, message, offsets and the final flag.
const INPUT_LENGTH: usize = 213;

/// Blake2 precompile at address 9.
pub const FUN: PrecompileWithAddress = PrecompileWithAddress(u64_to_address(9), run);

/// Input format per EIP-152:
/// `[4 bytes rounds][64 bytes h][128 bytes m][8 bytes t_0][8 bytes t_1][1 byte f]`.
pub fn run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if input.len() != INPUT_LENGTH {
        return Err(PrecompileError::Blake2WrongLength);
    }

    let rounds = u32::from_be_bytes(input[..4].try_into().unwrap()) as usize;
    let gas_used = rounds as u64 * F_ROUND;
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let f = match input[212] {
        1 => true,
        0 => false,
        _ => return Err(PrecompileError::Blake2WrongFinalIndicatorFlag),
    };

    let mut h = [0u64; 8];
    for (i, state) in h.iter_mut().enumerate() {
        *state = u64::from_le_bytes(input[4 + i * 8..12 + i * 8].try_into().unwrap());
    }
    let mut m = [0u64; 16];
    for (i, word) in m.iter_mut().enumerate() {
        *word = u64::from_le_bytes(input[68 + i * 8..76 + i * 8].try_into().unwrap());
    }
    let t = [
        u64::from_le_bytes(input[196..204].try_into().unwrap()),
        u64::from_le_bytes(input[204..212].try_into().unwrap()),
    ];

    algo::compress(rounds, &mut h, &m, t, f);

    let mut out = [0u8; 64];
    for (bytes, state) in out.chunks_exact_mut(8).zip(h.iter()) {
        bytes.copy_from_slice(&state.to_le_bytes());
    }

    Ok(PrecompileOutput::new(gas_used, out.to_vec().into()))
}

/// The BLAKE2b compression function per RFC 7693.
pub mod algo {
    /// Message schedule permutations.
    pub const SIGMA: [[usize; 16]; 10] = [
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
        [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
        [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
        [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
        [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
        [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
        [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
        [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
        [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
        [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    ];

    /// BLAKE2b initialization vector.
    pub const IV: [u64; 8] = [
        0x6a09e667f3bcc908,
        0xbb67ae8584caa73b,
        0x3c6ef372fe94f82b,
        0xa54ff53a5f1d36f1,
        0x510e527fade682d1,
        0x9b05688c2b3e6c1f,
        0x1f83d9abfb41bd6b,
        0x5be0cd19137e2179,
    ];

    /// The `G` mixing function.
    #[inline(always)]
    #[allow(clippy::many_single_char_names)]
    fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
        v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
        v[d] = (v[d] ^ v[a]).rotate_right(32);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] = (v[b] ^ v[c]).rotate_right(24);

        v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
        v[d] = (v[d] ^ v[a]).rotate_right(16);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] = (v[b] ^ v[c]).rotate_right(63);
    }

    #[inline(always)]
    fn round(v: &mut [u64; 16], m: &[u64; 16], r: usize) {
        let s = &SIGMA[r % 10];
        g(v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(v, 3, 7, 11, 15, m[s[6]], m[s[7]]);

        g(v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    /// Compression function `F`.
    pub fn compress(rounds: usize, h: &mut [u64; 8], m: &[u64; 16], t: [u64; 2], f: bool) {
        let mut v = [0u64; 16];
        v[..8].copy_from_slice(h);
        v[8..].copy_from_slice(&IV);

        v[12] ^= t[0];
        v[13] ^= t[1];
        if f {
            v[14] = !v[14];
        }

        for r in 0..rounds {
            round(&mut v, m, r);
        }

        for (i, state) in h.iter_mut().enumerate() {
            *state ^= v[i] ^ v[i + 8];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hex;

    #[test]
    fn eip_152_test_vector_5() {
        let input = hex::decode(
            "0000000c48c9bdf267e6096a3ba7ca8485ae67bb2bf894fe72f36e3cf1361d5f3af54fa5\
             d182e6ad7f520e511f6c3e2b8c68059b6bbd41fbabd9831f79217e1319cde05b\
             6162630000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000\
             0300000000000000000000000000000001",
        )
        .unwrap();
        let expected = hex::decode(
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
             7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923",
        )
        .unwrap();

        let out = run(&input, 12).unwrap();
        assert_eq!(out.gas_used, 12);
        assert_eq!(out.bytes.as_ref(), expected.as_slice());
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(run(&[0; 212], 100), Err(PrecompileError::Blake2WrongLength));
    }

    #[test]
    fn final_flag_must_be_boolean() {
        let mut input = [0u8; 213];
        input[212] = 2;
        assert_eq!(
            run(&input, 100),
            Err(PrecompileError::Blake2WrongFinalIndicatorFlag)
        );
    }
}
