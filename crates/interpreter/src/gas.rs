//! Gas accounting.

pub mod calc;
mod constants;

pub use calc::*;
pub use constants::*;

/// Gas state of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gas {
    /// The gas limit; constant throughout execution.
    limit: u64,
    /// Remaining gas.
    remaining: u64,
    /// Accumulated refund; settled once, at the end of the transaction.
    refunded: i64,
    /// Memoized memory expansion state.
    pub memory: MemoryGas,
}

impl Gas {
    /// Fresh gas state with the given limit.
    #[inline]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// Gas state with the limit fully consumed.
    #[inline]
    pub const fn new_spent(limit: u64) -> Self {
        Self {
            limit,
            remaining: 0,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// The gas limit.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Remaining gas.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Gas spent so far.
    #[inline]
    pub const fn spent(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Accumulated refund.
    #[inline]
    pub const fn refunded(&self) -> i64 {
        self.refunded
    }

    /// Remaining gas after withholding the 1/64 the caller keeps (EIP-150).
    #[inline]
    pub const fn remaining_63_of_64_parts(&self) -> u64 {
        self.remaining - self.remaining / 64
    }

    /// Charges `cost`, returning `false` when it exceeds the remaining gas.
    #[inline]
    #[must_use = "returns false on out-of-gas, which must fail the instruction"]
    pub fn record_cost(&mut self, cost: u64) -> bool {
        if let Some(remaining) = self.remaining.checked_sub(cost) {
            self.remaining = remaining;
            return true;
        }
        false
    }

    /// Returns previously charged gas, used when a child frame exits with
    /// gas left over.
    #[inline]
    pub fn erase_cost(&mut self, returned: u64) {
        self.remaining += returned;
    }

    /// Consumes all remaining gas.
    #[inline]
    pub fn spend_all(&mut self) {
        self.remaining = 0;
    }

    /// Accumulates a refund delta; may be negative mid-transaction.
    #[inline]
    pub fn record_refund(&mut self, refund: i64) {
        self.refunded += refund;
    }

    /// Caps the refund for final settlement: spent/5 from London (EIP-3529),
    /// spent/2 before.
    #[inline]
    pub fn set_final_refund(&mut self, is_london: bool) {
        let max_refund_quotient = if is_london { 5 } else { 2 };
        self.refunded = (self.refunded as u64).min(self.spent() / max_refund_quotient) as i64;
    }

    /// Charges a memory expansion to `new_words` 32-byte words.
    #[inline]
    #[must_use = "out-of-gas must fail the instruction"]
    pub fn record_memory_expansion(&mut self, new_words: usize) -> MemoryExtensionResult {
        let Some(additional_cost) = self.memory.record_new_words(new_words) else {
            return MemoryExtensionResult::Same;
        };
        if !self.record_cost(additional_cost) {
            return MemoryExtensionResult::OutOfGas;
        }
        MemoryExtensionResult::Extended
    }
}

/// Outcome of a memory expansion charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryExtensionResult {
    /// Memory grew and the delta was charged.
    Extended,
    /// Memory size stayed the same.
    Same,
    /// Not enough gas to extend.
    OutOfGas,
}

/// Memoized memory length and expansion cost, so only the delta of the
/// quadratic formula is charged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryGas {
    /// Current memory length in words.
    pub words: usize,
    /// Expansion cost already charged for that length.
    pub expansion_cost: u64,
}

impl MemoryGas {
    /// Empty memory.
    pub const fn new() -> Self {
        Self {
            words: 0,
            expansion_cost: 0,
        }
    }

    /// Records the new length, returning the cost delta if memory grew.
    #[inline]
    pub fn record_new_words(&mut self, new_words: usize) -> Option<u64> {
        if new_words <= self.words {
            return None;
        }
        self.words = new_words;
        let mut cost = calc::memory_gas(new_words);
        core::mem::swap(&mut self.expansion_cost, &mut cost);
        // The new cost is always larger since the word count grew.
        Some(self.expansion_cost - cost)
    }
}
