//! Byte-shaping helpers shared by the precompiles.

use primitives::Bytes;
use std::borrow::Cow;
use std::vec::Vec;

/// Right-pads the input with zeros to exactly `LEN` bytes.
pub fn right_pad<const LEN: usize>(data: &[u8]) -> [u8; LEN] {
    let mut padded = [0; LEN];
    let end = LEN.min(data.len());
    padded[..end].copy_from_slice(&data[..end]);
    padded
}

/// Right-pads the input with zeros to at least `len` bytes, borrowing when
/// it is already long enough.
pub fn right_pad_vec(data: &[u8], len: usize) -> Cow<'_, [u8]> {
    if data.len() >= len {
        Cow::Borrowed(data)
    } else {
        let mut padded = vec![0; len];
        padded[..data.len()].copy_from_slice(data);
        Cow::Owned(padded)
    }
}

/// Left-pads the input with zeros to exactly `len` bytes; longer input is
/// truncated from the front.
pub fn left_pad_vec(data: &[u8], len: usize) -> Vec<u8> {
    if data.len() >= len {
        data[data.len() - len..].to_vec()
    } else {
        let mut padded = vec![0; len];
        padded[len - data.len()..].copy_from_slice(data);
        padded
    }
}

/// A 32-byte big-endian boolean.
pub fn bool_to_bytes32(value: bool) -> Bytes {
    let mut out = [0u8; 32];
    out[31] = value as u8;
    Bytes::copy_from_slice(&out)
}
