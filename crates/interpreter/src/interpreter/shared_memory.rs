use core::{cmp::min, fmt};
use primitives::{hex, U256};
use std::vec::Vec;

/// Byte memory shared across nested frames.
///
/// One growing buffer serves the whole transaction, partitioned by
/// checkpoints: each frame sees only `buffer[last_checkpoint..]`. Entering a
/// frame pushes a checkpoint, leaving one truncates back to it, so teardown
/// never reallocates.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharedMemory {
    /// The shared buffer.
    data: Vec<u8>,
    /// Buffer offsets where each active frame's view begins.
    checkpoints: Vec<usize>,
    /// Length of the active frame's view.
    current_len: usize,
}

impl fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMemory")
            .field("current_len", &self.current_len)
            .field("context_memory", &hex::encode(self.context_memory()))
            .finish_non_exhaustive()
    }
}

impl SharedMemory {
    /// Allocates the shared buffer. The initial 4 KiB reserve covers most
    /// transactions without growing.
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(4 * 1024),
            checkpoints: Vec::with_capacity(32),
            current_len: 0,
        }
    }

    /// Opens a fresh, zero-length view for a new frame.
    pub fn new_context(&mut self) {
        let base = self.last_checkpoint();
        self.checkpoints.push(base + self.current_len);
        self.current_len = 0;
    }

    /// Discards the active frame's view, restoring the parent's.
    pub fn free_context(&mut self) {
        if let Some(old_checkpoint) = self.checkpoints.pop() {
            let last_checkpoint = self.last_checkpoint();
            self.current_len = old_checkpoint - last_checkpoint;
            self.data.truncate(old_checkpoint);
        }
    }

    /// Length of the active view in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.current_len
    }

    /// Returns `true` if the active view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current_len == 0
    }

    /// Grows the active view to `new_size` bytes, zero-filling.
    ///
    /// Gas for the expansion has already been charged and `new_size` is a
    /// multiple of 32 greater than the current length.
    #[inline]
    pub fn resize(&mut self, new_size: usize) {
        self.data.resize(self.last_checkpoint() + new_size, 0);
        self.current_len = new_size;
    }

    /// A slice of the active view.
    ///
    /// # Panics
    ///
    /// On out-of-bounds access; callers resize first.
    #[inline]
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        let base = self.last_checkpoint();
        &self.data[base + offset..base + offset + size]
    }

    /// A mutable slice of the active view.
    ///
    /// # Panics
    ///
    /// On out-of-bounds access; callers resize first.
    #[inline]
    pub fn slice_mut(&mut self, offset: usize, size: usize) -> &mut [u8] {
        let base = self.last_checkpoint();
        &mut self.data[base + offset..base + offset + size]
    }

    /// Sets a single byte.
    #[inline]
    pub fn set_byte(&mut self, offset: usize, byte: u8) {
        self.slice_mut(offset, 1)[0] = byte;
    }

    /// Writes a 256-bit word big-endian at `offset`.
    #[inline]
    pub fn set_u256(&mut self, offset: usize, value: U256) {
        self.set(offset, &value.to_be_bytes::<32>());
    }

    /// Reads a 256-bit word big-endian at `offset`.
    #[inline]
    pub fn get_u256(&self, offset: usize) -> U256 {
        U256::from_be_slice(self.slice(offset, 32))
    }

    /// Writes `value` at `offset`.
    #[inline]
    pub fn set(&mut self, offset: usize, value: &[u8]) {
        if !value.is_empty() {
            self.slice_mut(offset, value.len()).copy_from_slice(value);
        }
    }

    /// Writes `len` bytes of `data[data_offset..]` to memory at
    /// `memory_offset`, zero-filling whatever the source cannot cover.
    #[inline]
    pub fn set_data(&mut self, memory_offset: usize, data_offset: usize, len: usize, data: &[u8]) {
        if data_offset >= data.len() {
            self.slice_mut(memory_offset, len).fill(0);
            return;
        }
        let data_end = min(data_offset + len, data.len());
        let copied = data_end - data_offset;
        self.slice_mut(memory_offset, copied)
            .copy_from_slice(&data[data_offset..data_end]);
        self.slice_mut(memory_offset + copied, len - copied).fill(0);
    }

    /// Copies within the active view; the ranges may overlap.
    #[inline]
    pub fn copy(&mut self, dst: usize, src: usize, len: usize) {
        let base = self.last_checkpoint();
        self.data[base..base + self.current_len].copy_within(src..src + len, dst);
    }

    /// The active frame's whole view.
    #[inline]
    pub fn context_memory(&self) -> &[u8] {
        let base = self.last_checkpoint();
        &self.data[base..base + self.current_len]
    }

    #[inline]
    fn last_checkpoint(&self) -> usize {
        self.checkpoints.last().copied().unwrap_or_default()
    }
}

/// Number of 32-byte words needed to hold `x` bytes.
#[inline]
pub fn num_words(x: usize) -> usize {
    x.div_ceil(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_are_isolated() {
        let mut memory = SharedMemory::new();
        memory.new_context();
        memory.resize(64);
        memory.set(0, &[1, 2, 3]);

        memory.new_context();
        assert_eq!(memory.len(), 0);
        memory.resize(32);
        memory.set(0, &[9; 32]);
        memory.free_context();

        assert_eq!(memory.len(), 64);
        assert_eq!(&memory.slice(0, 3)[..], &[1, 2, 3]);
    }

    #[test]
    fn set_data_zero_fills_the_tail() {
        let mut memory = SharedMemory::new();
        memory.new_context();
        memory.resize(32);
        memory.set(0, &[0xAA; 32]);

        memory.set_data(0, 2, 8, &[1, 2, 3, 4]);
        assert_eq!(&memory.slice(0, 8)[..], &[3, 4, 0, 0, 0, 0, 0, 0]);

        // Source offset past the data zero-fills everything.
        memory.set_data(8, 10, 4, &[1, 2]);
        assert_eq!(&memory.slice(8, 4)[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn word_round_trip() {
        let mut memory = SharedMemory::new();
        memory.new_context();
        memory.resize(64);
        let value = U256::from(0xDEADBEEFu64);
        memory.set_u256(32, value);
        assert_eq!(memory.get_u256(32), value);
    }

    #[test]
    fn copy_handles_overlap() {
        let mut memory = SharedMemory::new();
        memory.new_context();
        memory.resize(32);
        memory.set(0, &[1, 2, 3, 4]);
        memory.copy(2, 0, 4);
        assert_eq!(&memory.slice(0, 6)[..], &[1, 2, 1, 2, 3, 4]);
    }
}
