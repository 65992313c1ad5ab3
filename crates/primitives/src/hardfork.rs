//! Hardfork identifiers and activation ordering.
#![allow(non_camel_case_types)]

pub use SpecId::*;

/// Specification IDs in activation order.
///
/// Opcode availability, gas formulas and validation rules are gated on these.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecId {
    /// Frontier hard fork
    FRONTIER = 0,
    /// Homestead hard fork
    HOMESTEAD,
    /// Tangerine Whistle hard fork (EIP-150)
    TANGERINE,
    /// Spurious Dragon hard fork (EIP-161)
    SPURIOUS_DRAGON,
    /// Byzantium hard fork
    BYZANTIUM,
    /// Constantinople hard fork
    CONSTANTINOPLE,
    /// Petersburg hard fork
    PETERSBURG,
    /// Istanbul hard fork
    ISTANBUL,
    /// Berlin hard fork (EIP-2929)
    BERLIN,
    /// London hard fork (EIP-1559, EIP-3529)
    LONDON,
    /// Paris/Merge hard fork (prevrandao)
    MERGE,
    /// Shanghai hard fork (PUSH0, warm coinbase)
    SHANGHAI,
    /// Cancun hard fork (transient storage, blobs, EIP-6780)
    CANCUN,
    /// Prague hard fork
    PRAGUE,
    /// The latest specification.
    #[default]
    LATEST = u8::MAX,
}

impl SpecId {
    /// Returns `true` if `self` is at or after `other` in activation order.
    #[inline]
    pub const fn is_enabled_in(self, other: Self) -> bool {
        self as u8 >= other as u8
    }
}

impl From<&str> for SpecId {
    fn from(name: &str) -> Self {
        match name {
            "Frontier" => Self::FRONTIER,
            "Homestead" => Self::HOMESTEAD,
            "Tangerine" => Self::TANGERINE,
            "Spurious" => Self::SPURIOUS_DRAGON,
            "Byzantium" => Self::BYZANTIUM,
            "Constantinople" => Self::CONSTANTINOPLE,
            "Petersburg" => Self::PETERSBURG,
            "Istanbul" => Self::ISTANBUL,
            "Berlin" => Self::BERLIN,
            "London" => Self::LONDON,
            "Merge" => Self::MERGE,
            "Shanghai" => Self::SHANGHAI,
            "Cancun" => Self::CANCUN,
            "Prague" => Self::PRAGUE,
            _ => Self::LATEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_activation_order() {
        assert!(CANCUN.is_enabled_in(FRONTIER));
        assert!(CANCUN.is_enabled_in(CANCUN));
        assert!(!BERLIN.is_enabled_in(LONDON));
        assert!(LATEST.is_enabled_in(PRAGUE));
    }
}
