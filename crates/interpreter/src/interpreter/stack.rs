use crate::InstructionResult;
use core::fmt;
use primitives::U256;
use std::vec::Vec;

/// Stack depth limit.
pub const STACK_LIMIT: usize = 1024;

/// The word stack: up to [`STACK_LIMIT`] 256-bit words.
///
/// Backed by a `Vec` with the full capacity reserved up front, so pushes
/// never reallocate.
#[derive(Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Stack {
    data: Vec<U256>,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("]")
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Stack {
    fn clone(&self) -> Self {
        // Preserve the reserved-capacity invariant.
        let mut stack = Self::new();
        stack.data.extend_from_slice(&self.data);
        stack
    }
}

impl Stack {
    /// An empty stack with [`STACK_LIMIT`] capacity reserved.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(STACK_LIMIT),
        }
    }

    /// Current depth in words.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stack contents, bottom first.
    #[inline]
    pub fn data(&self) -> &[U256] {
        &self.data
    }

    /// Removes all values.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Pops the top of the stack.
    #[inline]
    pub fn pop(&mut self) -> Result<U256, InstructionResult> {
        self.data.pop().ok_or(InstructionResult::StackUnderflow)
    }

    /// Pops `N` values; the first array element is the old top of the stack.
    #[inline]
    pub fn popn<const N: usize>(&mut self) -> Option<[U256; N]> {
        if self.data.len() < N {
            return None;
        }
        // Length checked above.
        Some(core::array::from_fn(|_| self.data.pop().unwrap()))
    }

    /// Pops `N` values and returns a mutable reference to the new top.
    #[inline]
    pub fn popn_top<const N: usize>(&mut self) -> Option<([U256; N], &mut U256)> {
        if self.data.len() < N + 1 {
            return None;
        }
        // Length checked above.
        let popped = core::array::from_fn(|_| self.data.pop().unwrap());
        let top = self.data.last_mut().unwrap();
        Some((popped, top))
    }

    /// Pushes a value, returning `false` when the stack is full.
    #[inline]
    #[must_use]
    pub fn push(&mut self, value: U256) -> bool {
        if self.data.len() == STACK_LIMIT {
            return false;
        }
        self.data.push(value);
        true
    }

    /// Reads the value `n` positions below the top without removing it.
    #[inline]
    pub fn peek(&self, n: usize) -> Result<U256, InstructionResult> {
        if self.data.len() > n {
            Ok(self.data[self.data.len() - n - 1])
        } else {
            Err(InstructionResult::StackUnderflow)
        }
    }

    /// Duplicates the `n`th value from the top (`n >= 1`).
    #[inline]
    pub fn dup(&mut self, n: usize) -> Result<(), InstructionResult> {
        let len = self.data.len();
        if len < n {
            Err(InstructionResult::StackUnderflow)
        } else if len + 1 > STACK_LIMIT {
            Err(InstructionResult::StackOverflow)
        } else {
            let value = self.data[len - n];
            self.data.push(value);
            Ok(())
        }
    }

    /// Swaps the top with the `n`th value below it (`n >= 1`).
    #[inline]
    pub fn swap(&mut self, n: usize) -> Result<(), InstructionResult> {
        let len = self.data.len();
        if len <= n {
            return Err(InstructionResult::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - n);
        Ok(())
    }

    /// Pushes a byte slice, splitting it into 32-byte big-endian words and
    /// zero-padding the last one.
    #[inline]
    pub fn push_slice(&mut self, slice: &[u8]) -> Result<(), InstructionResult> {
        if slice.is_empty() {
            return Ok(());
        }
        let n_words = slice.len().div_ceil(32);
        if self.data.len() + n_words > STACK_LIMIT {
            return Err(InstructionResult::StackOverflow);
        }
        for chunk in slice.chunks(32) {
            self.data.push(U256::from_be_slice(chunk));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Stack {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<U256>::deserialize(deserializer)?;
        if data.len() > STACK_LIMIT {
            return Err(serde::de::Error::custom(std::format!(
                "stack size exceeds limit: {} > {}",
                data.len(),
                STACK_LIMIT
            )));
        }
        let mut stack = Self::new();
        stack.data.extend_from_slice(&data);
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popn_returns_top_first() {
        let mut stack = Stack::new();
        assert!(stack.push(U256::from(1)));
        assert!(stack.push(U256::from(2)));
        assert!(stack.push(U256::from(3)));
        let [a, b] = stack.popn().unwrap();
        assert_eq!(a, U256::from(3));
        assert_eq!(b, U256::from(2));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn popn_top_leaves_top_borrowed() {
        let mut stack = Stack::new();
        for i in 0..3u64 {
            assert!(stack.push(U256::from(i)));
        }
        let ([top], below) = stack.popn_top().unwrap();
        assert_eq!(top, U256::from(2));
        assert_eq!(*below, U256::from(1));
        *below = U256::from(9);
        assert_eq!(stack.peek(0).unwrap(), U256::from(9));
    }

    #[test]
    fn push_fails_at_limit() {
        let mut stack = Stack::new();
        for i in 0..STACK_LIMIT {
            assert!(stack.push(U256::from(i)));
        }
        assert!(!stack.push(U256::ZERO));
        assert_eq!(stack.len(), STACK_LIMIT);
    }

    #[test]
    fn dup_and_swap() {
        let mut stack = Stack::new();
        assert!(stack.push(U256::from(10)));
        assert!(stack.push(U256::from(20)));
        stack.dup(2).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(10));
        stack.swap(2).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(10));
        assert_eq!(stack.peek(2).unwrap(), U256::from(10));
        assert!(stack.dup(4).is_err());
        assert!(stack.swap(3).is_err());
    }

    #[test]
    fn push_slice_pads_partial_words() {
        let mut stack = Stack::new();
        stack.push_slice(&[0x01, 0x02]).unwrap();
        assert_eq!(stack.pop().unwrap(), U256::from(0x0102));

        let two_words = [0xFFu8; 33];
        stack.push_slice(&two_words).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), U256::from(0xFF));
    }
}
