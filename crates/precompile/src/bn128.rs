//! BN128 curve precompiles (EIP-196, EIP-197), backed by `substrate-bn`.

use crate::{
    u64_to_address,
    utilities::{bool_to_bytes32, right_pad},
    PrecompileError, PrecompileOutput, PrecompileResult, PrecompileWithAddress,
};
use bn::{AffineG1, AffineG2, Fq, Fq2, Fr, Group, Gt, G1, G2};
use std::vec::Vec;

/// Bn128 point addition.
pub mod add {
    use super::*;

    /// Address of the add precompile.
    pub const ADDRESS: primitives::Address = u64_to_address(6);

    /// Add cost under EIP-1108.
    pub const ISTANBUL_ADD_GAS_COST: u64 = 150;
    /// Add precompile with Istanbul pricing.
    pub const ISTANBUL: PrecompileWithAddress =
        PrecompileWithAddress(ADDRESS, |input, gas_limit| {
            run_add(input, ISTANBUL_ADD_GAS_COST, gas_limit)
        });

    /// Add cost at Byzantium.
    pub const BYZANTIUM_ADD_GAS_COST: u64 = 500;
    /// Add precompile with Byzantium pricing.
    pub const BYZANTIUM: PrecompileWithAddress =
        PrecompileWithAddress(ADDRESS, |input, gas_limit| {
            run_add(input, BYZANTIUM_ADD_GAS_COST, gas_limit)
        });
}

/// Bn128 scalar multiplication.
pub mod mul {
    use super::*;

    /// Address of the mul precompile.
    pub const ADDRESS: primitives::Address = u64_to_address(7);

    /// Mul cost under EIP-1108.
    pub const ISTANBUL_MUL_GAS_COST: u64 = 6_000;
    /// Mul precompile with Istanbul pricing.
    pub const ISTANBUL: PrecompileWithAddress =
        PrecompileWithAddress(ADDRESS, |input, gas_limit| {
            run_mul(input, ISTANBUL_MUL_GAS_COST, gas_limit)
        });

    /// Mul cost at Byzantium.
    pub const BYZANTIUM_MUL_GAS_COST: u64 = 40_000;
    /// Mul precompile with Byzantium pricing.
    pub const BYZANTIUM: PrecompileWithAddress =
        PrecompileWithAddress(ADDRESS, |input, gas_limit| {
            run_mul(input, BYZANTIUM_MUL_GAS_COST, gas_limit)
        });
}

/// Bn128 pairing check.
pub mod pair {
    use super::*;

    /// Address of the pairing precompile.
    pub const ADDRESS: primitives::Address = u64_to_address(8);

    /// Per-point pairing cost under EIP-1108.
    pub const ISTANBUL_PAIR_PER_POINT: u64 = 34_000;
    /// Base pairing cost under EIP-1108.
    pub const ISTANBUL_PAIR_BASE: u64 = 45_000;
    /// Pairing precompile with Istanbul pricing.
    pub const ISTANBUL: PrecompileWithAddress =
        PrecompileWithAddress(ADDRESS, |input, gas_limit| {
            run_pair(
                input,
                ISTANBUL_PAIR_PER_POINT,
                ISTANBUL_PAIR_BASE,
                gas_limit,
            )
        });

    /// Per-point pairing cost at Byzantium.
    pub const BYZANTIUM_PAIR_PER_POINT: u64 = 80_000;
    /// Base pairing cost at Byzantium.
    pub const BYZANTIUM_PAIR_BASE: u64 = 100_000;
    /// Pairing precompile with Byzantium pricing.
    pub const BYZANTIUM: PrecompileWithAddress =
        PrecompileWithAddress(ADDRESS, |input, gas_limit| {
            run_pair(
                input,
                BYZANTIUM_PAIR_PER_POINT,
                BYZANTIUM_PAIR_BASE,
                gas_limit,
            )
        });
}

/// Bytes per base-field element.
const FQ_LEN: usize = 32;
/// Bytes per scalar-field element.
const SCALAR_LEN: usize = 32;
/// Bytes per G1 element (two field elements).
const G1_LEN: usize = 2 * FQ_LEN;
/// Bytes per G2 element (two quadratic-extension elements).
const G2_LEN: usize = 4 * FQ_LEN;
/// Input length of `ADD`: two G1 points.
pub const ADD_INPUT_LEN: usize = 2 * G1_LEN;
/// Input length of `MUL`: one G1 point and one scalar.
pub const MUL_INPUT_LEN: usize = G1_LEN + SCALAR_LEN;
/// Length of one pairing element: a G1 and a G2 point.
pub const PAIR_ELEMENT_LEN: usize = G1_LEN + G2_LEN;

#[inline]
fn read_fq(input: &[u8]) -> Result<Fq, PrecompileError> {
    Fq::from_slice(&input[..FQ_LEN]).map_err(|_| PrecompileError::Bn128FieldPointNotAMember)
}

/// Reads a quadratic-extension element; the imaginary part is encoded first.
#[inline]
fn read_fq2(input: &[u8]) -> Result<Fq2, PrecompileError> {
    let imaginary = read_fq(&input[..FQ_LEN])?;
    let real = read_fq(&input[FQ_LEN..2 * FQ_LEN])?;
    Ok(Fq2::new(real, imaginary))
}

/// `(0, 0)` encodes the point at infinity, which `AffineG1` cannot hold.
#[inline]
fn new_g1_point(px: Fq, py: Fq) -> Result<G1, PrecompileError> {
    if px == Fq::zero() && py == Fq::zero() {
        Ok(G1::zero())
    } else {
        AffineG1::new(px, py)
            .map(Into::into)
            .map_err(|_| PrecompileError::Bn128AffineGFailedToCreate)
    }
}

#[inline]
fn new_g2_point(x: Fq2, y: Fq2) -> Result<G2, PrecompileError> {
    if x.is_zero() && y.is_zero() {
        Ok(G2::zero())
    } else {
        AffineG2::new(x, y)
            .map(Into::into)
            .map_err(|_| PrecompileError::Bn128AffineGFailedToCreate)
    }
}

#[inline]
fn read_g1_point(input: &[u8]) -> Result<G1, PrecompileError> {
    let px = read_fq(&input[0..FQ_LEN])?;
    let py = read_fq(&input[FQ_LEN..2 * FQ_LEN])?;
    new_g1_point(px, py)
}

#[inline]
fn read_g2_point(input: &[u8]) -> Result<G2, PrecompileError> {
    let ba = read_fq2(&input[0..2 * FQ_LEN])?;
    let bb = read_fq2(&input[2 * FQ_LEN..4 * FQ_LEN])?;
    new_g2_point(ba, bb)
}

#[inline]
fn read_scalar(input: &[u8]) -> Result<Fr, PrecompileError> {
    Fr::from_slice(&input[..SCALAR_LEN]).map_err(|_| PrecompileError::Bn128FieldPointNotAMember)
}

/// Serializes a G1 point; the point at infinity encodes as all zeros.
#[inline]
fn encode_g1_point(point: G1) -> [u8; G1_LEN] {
    let mut output = [0u8; G1_LEN];
    if let Some(affine) = AffineG1::from_jacobian(point) {
        let _ = affine.x().to_big_endian(&mut output[..FQ_LEN]);
        let _ = affine.y().to_big_endian(&mut output[FQ_LEN..]);
    }
    output
}

/// Runs the add precompile.
pub fn run_add(input: &[u8], gas_cost: u64, gas_limit: u64) -> PrecompileResult {
    if gas_cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let input = right_pad::<ADD_INPUT_LEN>(input);
    let p1 = read_g1_point(&input[..G1_LEN])?;
    let p2 = read_g1_point(&input[G1_LEN..])?;
    let output = encode_g1_point(p1 + p2);
    Ok(PrecompileOutput::new(gas_cost, output.to_vec().into()))
}

/// Runs the mul precompile.
pub fn run_mul(input: &[u8], gas_cost: u64, gas_limit: u64) -> PrecompileResult {
    if gas_cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let input = right_pad::<MUL_INPUT_LEN>(input);
    let point = read_g1_point(&input[..G1_LEN])?;
    let scalar = read_scalar(&input[G1_LEN..G1_LEN + SCALAR_LEN])?;
    let output = encode_g1_point(point * scalar);
    Ok(PrecompileOutput::new(gas_cost, output.to_vec().into()))
}

/// Runs the pairing precompile.
pub fn run_pair(
    input: &[u8],
    pair_per_point_cost: u64,
    pair_base_cost: u64,
    gas_limit: u64,
) -> PrecompileResult {
    let gas_used =
        (input.len() / PAIR_ELEMENT_LEN) as u64 * pair_per_point_cost + pair_base_cost;
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    if input.len() % PAIR_ELEMENT_LEN != 0 {
        return Err(PrecompileError::Bn128PairLength);
    }

    let elements = input.len() / PAIR_ELEMENT_LEN;
    let mut points = Vec::with_capacity(elements);
    for idx in 0..elements {
        let start = idx * PAIR_ELEMENT_LEN;
        let g1_bytes = &input[start..start + G1_LEN];
        let g2_bytes = &input[start + G1_LEN..start + PAIR_ELEMENT_LEN];

        // Infinity on either side makes the pair a no-op, but both sides are
        // still validated.
        let g1_is_zero = g1_bytes.iter().all(|b| *b == 0);
        let g2_is_zero = g2_bytes.iter().all(|b| *b == 0);
        let a = read_g1_point(g1_bytes)?;
        let b = read_g2_point(g2_bytes)?;
        if !g1_is_zero && !g2_is_zero {
            points.push((a, b));
        }
    }

    let success = points
        .iter()
        .fold(Gt::one(), |acc, (a, b)| acc * bn::pairing(*a, *b))
        == Gt::one();

    Ok(PrecompileOutput::new(gas_used, bool_to_bytes32(success)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hex;

    #[test]
    fn add_known_points() {
        let input = hex::decode(
            "18b18acfb4c2c30276db5411368e7185b311dd124691610c5d3b74034e093dc9\
             063c909c4720840cb5134cb9f59fa749755796819658d32efc0d288198f37266\
             07c2b7f58a84bd6145f00c9c2bc0bb1a187f20ff2c92963a88019e7c6a014eed\
             06614e20c147e940f2d70da3f74c9a17df361706a4485c742bd6788478fa17d7",
        )
        .unwrap();
        let expected = hex::decode(
            "2243525c5efd4b9c3d3c45ac0ca3fe4dd85e830a4ce6b65fa1eeaee202839703\
             301d1d33be6da8e509df21cc35964723180eed7532537db9ae5e7d48f195c915",
        )
        .unwrap();

        let out = run_add(&input, add::BYZANTIUM_ADD_GAS_COST, 500).unwrap();
        assert_eq!(out.bytes.as_ref(), expected.as_slice());
    }

    #[test]
    fn add_of_infinity_is_identity() {
        // Empty input right-pads to two points at infinity.
        let out = run_add(&[], add::ISTANBUL_ADD_GAS_COST, 150).unwrap();
        assert_eq!(out.bytes.as_ref(), &[0u8; 64]);
    }

    #[test]
    fn empty_pairing_input_is_true() {
        let out = run_pair(
            &[],
            pair::ISTANBUL_PAIR_PER_POINT,
            pair::ISTANBUL_PAIR_BASE,
            50_000,
        )
        .unwrap();
        assert_eq!(out.bytes[31], 1);
    }

    #[test]
    fn invalid_point_is_rejected() {
        let input = [0xFFu8; 64];
        assert_eq!(
            run_add(&input, add::ISTANBUL_ADD_GAS_COST, 150),
            Err(PrecompileError::Bn128FieldPointNotAMember)
        );
    }
}
