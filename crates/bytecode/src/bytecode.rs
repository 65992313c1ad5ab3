use crate::{opcode, JumpTable};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use primitives::{keccak256, Bytes, B256, KECCAK_EMPTY};
use std::vec::Vec;

/// Bytecode of a contract, optionally analyzed.
///
/// Analysis pads the code with `STOP` so the dispatch loop can advance the
/// program counter without bounds checks, and precomputes the jump-dest set.
/// Raw bytecode executes too, but with an empty jump-dest set every jump
/// faults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bytecode {
    bytecode: Bytes,
    original_len: usize,
    jump_table: Option<JumpTable>,
}

impl Bytecode {
    /// Wraps raw, unanalyzed bytecode.
    pub fn new_raw(bytecode: Bytes) -> Self {
        Self {
            original_len: bytecode.len(),
            bytecode,
            jump_table: None,
        }
    }

    /// Analyzes the bytecode, computing the jump-dest set and padding the
    /// code so it always terminates in `STOP`.
    ///
    /// Idempotent: analyzed bytecode is returned unchanged.
    pub fn into_analyzed(self) -> Self {
        if self.jump_table.is_some() {
            return self;
        }
        let original_len = self.original_len;
        let (jump_table, padded) = analyze(self.bytecode);
        Self {
            bytecode: padded,
            original_len,
            jump_table: Some(jump_table),
        }
    }

    /// Returns `true` if the jump-dest set has been computed.
    pub fn is_analyzed(&self) -> bool {
        self.jump_table.is_some()
    }

    /// The executable byte sequence, including any `STOP` padding.
    pub fn bytes(&self) -> &[u8] {
        &self.bytecode
    }

    /// The bytecode as deployed, without padding.
    pub fn original_bytes(&self) -> Bytes {
        self.bytecode.slice(..self.original_len)
    }

    /// Length of the bytecode as deployed.
    pub fn len(&self) -> usize {
        self.original_len
    }

    /// Returns `true` if the deployed bytecode is empty.
    pub fn is_empty(&self) -> bool {
        self.original_len == 0
    }

    /// The opcode at `pc`. Positions past the end read as `STOP`.
    #[inline]
    pub fn opcode(&self, pc: usize) -> u8 {
        self.bytecode.get(pc).copied().unwrap_or(opcode::STOP)
    }

    /// Returns `true` if `pc` is a valid jump destination.
    ///
    /// Raw bytecode has no jump-dest set, so every target is invalid.
    #[inline]
    pub fn is_valid_jump(&self, pc: usize) -> bool {
        self.jump_table
            .as_ref()
            .map(|table| table.is_valid(pc))
            .unwrap_or(false)
    }

    /// Keccak-256 hash of the deployed bytecode.
    pub fn hash_slow(&self) -> B256 {
        if self.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(self.original_bytes())
        }
    }
}

/// Scans the bytecode for jump destinations, skipping `PUSH` immediates, and
/// pads the tail so the last executed byte is always `STOP`.
fn analyze(bytecode: Bytes) -> (JumpTable, Bytes) {
    if bytecode.is_empty() {
        return (
            JumpTable::new(BitVec::new()),
            Bytes::from_static(&[opcode::STOP]),
        );
    }

    let mut jumps: BitVec<u8> = bitvec![u8, Lsb0; 0; bytecode.len()];
    let mut i = 0;
    let mut last_opcode = 0;
    while i < bytecode.len() {
        let op = bytecode[i];
        last_opcode = op;
        if op == opcode::JUMPDEST {
            jumps.set(i, true);
            i += 1;
        } else {
            let push_len = op.wrapping_sub(opcode::PUSH1);
            if push_len < 32 {
                i += push_len as usize + 2;
            } else {
                i += 1;
            }
        }
    }

    // `i` overshoots when the final PUSH immediate is truncated; the padding
    // covers the missing immediate bytes plus a trailing STOP.
    let padding = i - bytecode.len() + (last_opcode != opcode::STOP) as usize;
    let bytecode = if padding > 0 {
        let mut padded = Vec::with_capacity(bytecode.len() + padding);
        padded.extend_from_slice(&bytecode);
        padded.resize(padded.len() + padding, 0);
        Bytes::from(padded)
    } else {
        bytecode
    };

    (JumpTable::new(jumps), bytecode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{ADD, JUMPDEST, PUSH1, PUSH2, PUSH16, STOP};

    #[test]
    fn no_padding_when_code_ends_with_stop() {
        let code = Bytes::from(vec![PUSH1, 0x01, PUSH1, 0x02, ADD, STOP]);
        let analyzed = Bytecode::new_raw(code.clone()).into_analyzed();
        assert_eq!(analyzed.bytes().len(), code.len());
        assert_eq!(analyzed.original_bytes(), code);
    }

    #[test]
    fn stop_is_appended() {
        let code = Bytes::from(vec![PUSH1, 0x01, PUSH1, 0x02, ADD]);
        let analyzed = Bytecode::new_raw(code.clone()).into_analyzed();
        assert_eq!(analyzed.bytes().len(), code.len() + 1);
        assert_eq!(analyzed.len(), code.len());
    }

    #[test]
    fn truncated_push_immediate_is_padded() {
        let code = Bytes::from(vec![PUSH1, 0x01, PUSH16]);
        let analyzed = Bytecode::new_raw(code).into_analyzed();
        // 16 missing immediate bytes plus the trailing STOP.
        assert_eq!(analyzed.bytes().len(), 3 + 17);
    }

    #[test]
    fn jumpdest_inside_push_immediate_is_not_valid() {
        let code = Bytes::from(vec![PUSH2, JUMPDEST, 0x02, JUMPDEST, STOP]);
        let analyzed = Bytecode::new_raw(code).into_analyzed();
        assert!(!analyzed.is_valid_jump(1));
        assert!(analyzed.is_valid_jump(3));
    }

    #[test]
    fn raw_bytecode_has_no_jump_dests() {
        let code = Bytes::from(vec![JUMPDEST, STOP]);
        let raw = Bytecode::new_raw(code);
        assert!(!raw.is_valid_jump(0));
        assert_eq!(raw.opcode(0), JUMPDEST);
        assert_eq!(raw.opcode(17), STOP);
    }

    #[test]
    fn empty_code_hashes_to_keccak_empty() {
        assert_eq!(Bytecode::default().hash_slow(), KECCAK_EMPTY);
        let analyzed = Bytecode::new_raw(Bytes::new()).into_analyzed();
        assert_eq!(analyzed.hash_slow(), KECCAK_EMPTY);
        assert_eq!(analyzed.opcode(0), STOP);
    }
}
