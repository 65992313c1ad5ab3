use alloy_primitives::{b256, B256};

/// Keccak-256 hash of the empty byte sequence.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// EIP-170: Contract code size limit.
///
/// By default the limit is `0x6000` (~25kb).
pub const MAX_CODE_SIZE: usize = 0x6000;

/// EIP-3860: Limit and meter initcode.
///
/// Limit of maximum initcode size is `2 * MAX_CODE_SIZE`.
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;

/// Number of blocks the `BLOCKHASH` opcode can look back.
pub const BLOCK_HASH_HISTORY: u64 = 256;

/// Maximum depth of nested call frames.
pub const CALL_STACK_LIMIT: u64 = 1024;

/// EIP-4844: gas consumed per blob.
pub const GAS_PER_BLOB: u64 = 1 << 17;

/// EIP-4844: minimum gas price for a blob.
pub const MIN_BLOB_GASPRICE: u64 = 1;

/// EIP-4844: controls how fast the blob gas price adjusts.
pub const BLOB_GASPRICE_UPDATE_FRACTION: u64 = 3338477;

/// The address of precompile 3, used by a journal-revert quirk inherited
/// from the mainnet state-clear incident (yellow paper appendix K.1).
pub const PRECOMPILE3: alloy_primitives::Address =
    alloy_primitives::Address::new([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3]);
