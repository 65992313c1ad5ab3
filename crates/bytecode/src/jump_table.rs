use bitvec::vec::BitVec;
use core::fmt;
use primitives::hex;
use std::sync::Arc;

/// A table of valid `JUMP`/`JUMPI` destinations.
///
/// Immutable, one bit per byte of bytecode. A set bit marks a `JUMPDEST`
/// opcode that is not part of a `PUSH` immediate.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpTable(Arc<BitVec<u8>>);

impl fmt::Debug for JumpTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JumpTable")
            .field("map", &hex::encode(self.0.as_raw_slice()))
            .finish()
    }
}

impl JumpTable {
    /// Wraps an analysis result.
    pub fn new(jumps: BitVec<u8>) -> Self {
        Self(Arc::new(jumps))
    }

    /// Number of bits (bytecode length) covered by the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table covers no bytecode.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid(&self, pc: usize) -> bool {
        self.0.get(pc).map(|bit| *bit).unwrap_or(false)
    }
}
