//! # cinder-precompile
//!
//! The precompiled contracts at addresses `0x01..=0x09`: per-fork dispatch
//! sets and gas metering. The cryptography itself is imported.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod blake2;
mod bn128;
mod hash;
mod identity;
mod modexp;
mod secp256k1;
pub mod utilities;

use core::fmt;
use primitives::{hardfork::SpecId, Address, Bytes, HashMap};
use std::sync::OnceLock;

/// A precompile implementation: `(input, gas_limit) -> result`.
pub type PrecompileFn = fn(&[u8], u64) -> PrecompileResult;

/// Result of running a precompile.
pub type PrecompileResult = Result<PrecompileOutput, PrecompileError>;

/// Output and metered gas of a successful precompile run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Gas consumed.
    pub gas_used: u64,
    /// Output bytes.
    pub bytes: Bytes,
}

impl PrecompileOutput {
    /// Bundles a precompile result.
    pub fn new(gas_used: u64, bytes: Bytes) -> Self {
        Self { gas_used, bytes }
    }
}

/// A precompile bound to its address.
#[derive(Clone, Copy, Debug)]
pub struct PrecompileWithAddress(pub Address, pub PrecompileFn);

/// Precompile failure modes. All of them consume the forwarded gas.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrecompileError {
    /// The metered cost exceeds the forwarded gas.
    OutOfGas,
    /// Blake2 input is not 213 bytes.
    Blake2WrongLength,
    /// Blake2 final-block flag is neither 0 nor 1.
    Blake2WrongFinalIndicatorFlag,
    /// Modexp header length does not fit a machine word.
    ModexpLengthOverflow,
    /// Modexp gas computation overflowed.
    ModexpGasOverflow,
    /// Input is not a member of the BN128 base field.
    Bn128FieldPointNotAMember,
    /// Input is not a point on the BN128 curve.
    Bn128AffineGFailedToCreate,
    /// Pairing input is not a multiple of the element size.
    Bn128PairLength,
}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OutOfGas => "out of gas",
            Self::Blake2WrongLength => "wrong blake2 input length",
            Self::Blake2WrongFinalIndicatorFlag => "wrong blake2 final indicator flag",
            Self::ModexpLengthOverflow => "modexp length overflow",
            Self::ModexpGasOverflow => "modexp gas overflow",
            Self::Bn128FieldPointNotAMember => "field point not a member of bn128 curve",
            Self::Bn128AffineGFailedToCreate => "failed to create bn128 affine point",
            Self::Bn128PairLength => "bn128 invalid pair length",
        };
        f.write_str(s)
    }
}

impl core::error::Error for PrecompileError {}

impl PrecompileError {
    /// Returns `true` for the out-of-gas failure.
    pub fn is_oog(&self) -> bool {
        matches!(self, Self::OutOfGas)
    }
}

/// The precompile set of one hardfork.
#[derive(Clone, Debug, Default)]
pub struct Precompiles {
    inner: HashMap<Address, PrecompileFn>,
}

impl Precompiles {
    /// The set active in the given hardfork.
    pub fn new(spec_id: PrecompileSpecId) -> &'static Self {
        match spec_id {
            PrecompileSpecId::HOMESTEAD => Self::homestead(),
            PrecompileSpecId::BYZANTIUM => Self::byzantium(),
            PrecompileSpecId::ISTANBUL => Self::istanbul(),
            PrecompileSpecId::BERLIN => Self::berlin(),
        }
    }

    /// The Frontier/Homestead set: ecrecover, SHA-256, RIPEMD-160, identity.
    pub fn homestead() -> &'static Self {
        static INSTANCE: OnceLock<Precompiles> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::default();
            precompiles.extend([
                secp256k1::ECRECOVER,
                hash::SHA256,
                hash::RIPEMD160,
                identity::FUN,
            ]);
            precompiles
        })
    }

    /// Byzantium added modexp (EIP-198) and the BN128 trio (EIP-196/197).
    pub fn byzantium() -> &'static Self {
        static INSTANCE: OnceLock<Precompiles> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::homestead().clone();
            precompiles.extend([
                modexp::BYZANTIUM,
                bn128::add::BYZANTIUM,
                bn128::mul::BYZANTIUM,
                bn128::pair::BYZANTIUM,
            ]);
            precompiles
        })
    }

    /// Istanbul added blake2 F (EIP-152) and repriced BN128 (EIP-1108).
    pub fn istanbul() -> &'static Self {
        static INSTANCE: OnceLock<Precompiles> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::byzantium().clone();
            precompiles.extend([
                blake2::FUN,
                bn128::add::ISTANBUL,
                bn128::mul::ISTANBUL,
                bn128::pair::ISTANBUL,
            ]);
            precompiles
        })
    }

    /// Berlin repriced modexp (EIP-2565).
    pub fn berlin() -> &'static Self {
        static INSTANCE: OnceLock<Precompiles> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut precompiles = Self::istanbul().clone();
            precompiles.extend([modexp::BERLIN]);
            precompiles
        })
    }

    /// Adds or replaces precompiles.
    pub fn extend(&mut self, other: impl IntoIterator<Item = PrecompileWithAddress>) {
        self.inner
            .extend(other.into_iter().map(|p| (p.0, p.1)));
    }

    /// Addresses of the set.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.inner.keys()
    }

    /// Returns `true` if `address` is a precompile in this set.
    pub fn contains(&self, address: &Address) -> bool {
        self.inner.contains_key(address)
    }

    /// The precompile at `address`.
    pub fn get(&self, address: &Address) -> Option<&PrecompileFn> {
        self.inner.get(address)
    }

    /// Number of precompiles in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Hardforks at which the precompile set changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PrecompileSpecId {
    /// The original four precompiles.
    HOMESTEAD,
    /// Plus modexp and BN128.
    BYZANTIUM,
    /// Plus blake2, with the EIP-1108 BN128 repricing.
    ISTANBUL,
    /// With the EIP-2565 modexp repricing.
    BERLIN,
}

impl PrecompileSpecId {
    /// Maps an execution hardfork onto its precompile set.
    pub const fn from_spec_id(spec_id: SpecId) -> Self {
        use SpecId::*;
        match spec_id {
            FRONTIER | HOMESTEAD | TANGERINE | SPURIOUS_DRAGON => Self::HOMESTEAD,
            BYZANTIUM | CONSTANTINOPLE | PETERSBURG => Self::BYZANTIUM,
            ISTANBUL => Self::ISTANBUL,
            _ => Self::BERLIN,
        }
    }
}

/// Cost of an operation with a base fee plus a per-word fee.
pub fn calc_linear_cost_u32(len: usize, base: u64, word: u64) -> u64 {
    (len as u64).div_ceil(32) * word + base
}

/// The address `0x00..xx` of a low-numbered precompile.
pub const fn u64_to_address(x: u64) -> Address {
    let x = x.to_be_bytes();
    Address::new([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_grow_monotonically() {
        assert_eq!(Precompiles::homestead().len(), 4);
        assert_eq!(Precompiles::byzantium().len(), 8);
        assert_eq!(Precompiles::istanbul().len(), 9);
        assert_eq!(Precompiles::berlin().len(), 9);
        assert!(Precompiles::istanbul().contains(&u64_to_address(9)));
        assert!(!Precompiles::byzantium().contains(&u64_to_address(9)));
    }

    #[test]
    fn spec_mapping() {
        assert_eq!(
            PrecompileSpecId::from_spec_id(SpecId::FRONTIER),
            PrecompileSpecId::HOMESTEAD
        );
        assert_eq!(
            PrecompileSpecId::from_spec_id(SpecId::PETERSBURG),
            PrecompileSpecId::BYZANTIUM
        );
        assert_eq!(
            PrecompileSpecId::from_spec_id(SpecId::CANCUN),
            PrecompileSpecId::BERLIN
        );
    }
}
