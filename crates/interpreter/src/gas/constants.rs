/// Gas cost for operations that consume zero gas.
pub const ZERO: u64 = 0;
/// Base gas cost for cheap environment reads.
pub const BASE: u64 = 2;
/// Gas cost for very low-cost operations.
pub const VERYLOW: u64 = 3;
/// Gas cost for low-cost operations.
pub const LOW: u64 = 5;
/// Gas cost for medium-cost operations, including `JUMP`.
pub const MID: u64 = 8;
/// Gas cost for high-cost operations, including `JUMPI`.
pub const HIGH: u64 = 10;
/// Gas cost for the `JUMPDEST` marker.
pub const JUMPDEST: u64 = 1;
/// Base gas cost for `EXP`.
pub const EXP: u64 = 10;
/// Gas cost per word of memory expansion (linear part).
pub const MEMORY: u64 = 3;
/// Base gas cost for `KECCAK256`.
pub const KECCAK256: u64 = 30;
/// Gas cost per word hashed by `KECCAK256`.
pub const KECCAK256WORD: u64 = 6;
/// Gas cost per word for copy operations.
pub const COPY: u64 = 3;
/// Gas cost for `BLOCKHASH`.
pub const BLOCKHASH: u64 = 20;
/// Base gas cost for `LOG*`.
pub const LOG: u64 = 375;
/// Gas cost per topic of `LOG*`.
pub const LOGTOPIC: u64 = 375;
/// Gas cost per byte of `LOG*` data.
pub const LOGDATA: u64 = 8;
/// Base gas cost for `CREATE`.
pub const CREATE: u64 = 32000;
/// Extra gas when a call transfers value.
pub const CALLVALUE: u64 = 9000;
/// Gas stipend granted to the callee of a value-bearing call.
pub const CALL_STIPEND: u64 = 2300;
/// Extra gas when a call brings a new account into existence.
pub const NEWACCOUNT: u64 = 25000;
/// Gas refund for `SELFDESTRUCT` before EIP-3529 removed it.
pub const SELFDESTRUCT: i64 = 24000;
/// Gas cost per byte of deployed code.
pub const CODEDEPOSIT: u64 = 200;

/// `SLOAD` cost after EIP-1884 repriced trie-dependent opcodes.
pub const ISTANBUL_SLOAD_GAS: u64 = 800;
/// `SSTORE` cost when setting a slot from zero.
pub const SSTORE_SET: u64 = 20000;
/// `SSTORE` cost when modifying a non-zero slot.
pub const SSTORE_RESET: u64 = 5000;
/// `SSTORE` clear refund before EIP-3529.
pub const REFUND_SSTORE_CLEARS: i64 = 15000;

// EIP-2929 cold/warm access pricing.
/// Access-list cost per address.
pub const ACCESS_LIST_ADDRESS: u64 = 2400;
/// Access-list cost per storage key.
pub const ACCESS_LIST_STORAGE_KEY: u64 = 1900;
/// `SLOAD` cost for a cold slot.
pub const COLD_SLOAD_COST: u64 = 2100;
/// Cost of touching a cold account.
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
/// Cost of a warm storage read.
pub const WARM_STORAGE_READ_COST: u64 = 100;
/// `SSTORE` reset cost net of the cold surcharge (EIP-2929).
pub const WARM_SSTORE_RESET: u64 = SSTORE_RESET - COLD_SLOAD_COST;

/// Transaction base cost.
pub const TRANSACTION_BASE: u64 = 21000;
/// Gas cost per zero byte of transaction data.
pub const TRANSACTION_ZERO_DATA: u64 = 4;
/// Gas cost per non-zero byte of transaction data (EIP-2028).
pub const TRANSACTION_NON_ZERO_DATA_ISTANBUL: u64 = 16;
/// Gas cost per non-zero byte of transaction data before EIP-2028.
pub const TRANSACTION_NON_ZERO_DATA_FRONTIER: u64 = 68;

/// EIP-3860: gas per 32-byte initcode word.
pub const INITCODE_WORD_COST: u64 = 2;
