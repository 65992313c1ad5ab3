//! Per-opcode and per-transaction gas formulas.

use super::constants::*;
use crate::host::{SStoreResult, SelfDestructResult, StateLoad};
use primitives::{hardfork::SpecId, Address, U256};
use std::vec::Vec;

/// `const` Option `?`.
macro_rules! tri {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => return None,
        }
    };
}

/// Memory expansion cost for `words` 32-byte words: `3·w + w²/512`.
#[inline]
pub const fn memory_gas(words: usize) -> u64 {
    let words = words as u64;
    MEMORY
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / 512)
}

/// Cost of an operation charging `multiple` gas per 32-byte word of `len`.
#[inline]
pub const fn cost_per_word(len: u64, multiple: u64) -> Option<u64> {
    multiple.checked_mul(len.div_ceil(32))
}

/// `KECCAK256` cost.
#[inline]
pub const fn keccak256_cost(len: u64) -> Option<u64> {
    KECCAK256.checked_add(tri!(cost_per_word(len, KECCAK256WORD)))
}

/// `*COPY` opcode cost.
#[inline]
pub const fn verylowcopy_cost(len: u64) -> Option<u64> {
    VERYLOW.checked_add(tri!(cost_per_word(len, COPY)))
}

/// `EXTCODECOPY` cost.
#[inline]
pub const fn extcodecopy_cost(spec_id: SpecId, len: u64, is_cold: bool) -> Option<u64> {
    let base = if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        20
    };
    base.checked_add(tri!(cost_per_word(len, COPY)))
}

/// `LOG0`..`LOG4` cost.
#[inline]
pub const fn log_cost(n_topics: u8, len: u64) -> Option<u64> {
    tri!(LOG.checked_add(tri!(LOGDATA.checked_mul(len)))).checked_add(LOGTOPIC * n_topics as u64)
}

/// `EXP` cost: `10 + per_byte · byte_len(exponent)`, where `per_byte` is 50
/// from Spurious Dragon (EIP-160) and 10 before.
#[inline]
pub fn exp_cost(spec_id: SpecId, power: U256) -> Option<u64> {
    if power.is_zero() {
        return Some(EXP);
    }
    let gas_byte: u64 = if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        50
    } else {
        10
    };
    let byte_len = (power.bit_len() as u64).div_ceil(8);
    EXP.checked_add(tri!(gas_byte.checked_mul(byte_len)))
}

/// `CREATE2` cost: the create base plus hashing of the init code.
#[inline]
pub const fn create2_cost(len: u64) -> Option<u64> {
    CREATE.checked_add(tri!(cost_per_word(len, KECCAK256WORD)))
}

/// EIP-3860 initcode metering: 2 gas per 32-byte word.
///
/// The length has been checked against the initcode limit, so the
/// multiplication cannot overflow.
#[inline]
pub const fn initcode_cost(len: u64) -> u64 {
    let Some(cost) = cost_per_word(len, INITCODE_WORD_COST) else {
        panic!("initcode cost overflow")
    };
    cost
}

/// Cold/warm account access cost (EIP-2929).
#[inline]
pub const fn warm_cold_cost(is_cold: bool) -> u64 {
    if is_cold {
        COLD_ACCOUNT_ACCESS_COST
    } else {
        WARM_STORAGE_READ_COST
    }
}

/// `BALANCE` cost.
#[inline]
pub const fn balance_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        // EIP-1884
        700
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        400
    } else {
        20
    }
}

/// `EXTCODESIZE` cost.
#[inline]
pub const fn extcodesize_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        20
    }
}

/// `EXTCODEHASH` cost.
#[inline]
pub const fn extcodehash_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        700
    } else {
        400
    }
}

/// `SLOAD` cost.
#[inline]
pub const fn sload_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        if is_cold {
            COLD_SLOAD_COST
        } else {
            WARM_STORAGE_READ_COST
        }
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        ISTANBUL_SLOAD_GAS
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        200
    } else {
        50
    }
}

/// `SSTORE` cost.
///
/// Returns `None` when the remaining gas is at or below the stipend sentry
/// (EIP-1706, from Istanbul), which must surface as out-of-gas.
#[inline]
pub fn sstore_cost(
    spec_id: SpecId,
    vals: &SStoreResult,
    remaining_gas: u64,
    is_cold: bool,
) -> Option<u64> {
    if spec_id.is_enabled_in(SpecId::ISTANBUL) && remaining_gas <= CALL_STIPEND {
        return None;
    }

    if spec_id.is_enabled_in(SpecId::BERLIN) {
        let mut gas_cost = istanbul_sstore_cost::<WARM_STORAGE_READ_COST, WARM_SSTORE_RESET>(vals);
        if is_cold {
            gas_cost += COLD_SLOAD_COST;
        }
        Some(gas_cost)
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        Some(istanbul_sstore_cost::<ISTANBUL_SLOAD_GAS, SSTORE_RESET>(
            vals,
        ))
    } else {
        Some(frontier_sstore_cost(vals))
    }
}

/// EIP-2200 net gas metering.
#[inline]
fn istanbul_sstore_cost<const SLOAD_GAS: u64, const SSTORE_RESET_GAS: u64>(
    vals: &SStoreResult,
) -> u64 {
    if vals.new_value == vals.present_value {
        SLOAD_GAS
    } else if vals.original_value == vals.present_value && vals.original_value.is_zero() {
        SSTORE_SET
    } else if vals.original_value == vals.present_value {
        SSTORE_RESET_GAS
    } else {
        SLOAD_GAS
    }
}

/// The original flat set/reset model.
#[inline]
fn frontier_sstore_cost(vals: &SStoreResult) -> u64 {
    if vals.present_value.is_zero() && !vals.new_value.is_zero() {
        SSTORE_SET
    } else {
        SSTORE_RESET
    }
}

/// `SSTORE` refund delta.
#[inline]
pub fn sstore_refund(spec_id: SpecId, vals: &SStoreResult) -> i64 {
    if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        // EIP-3529 reduced the clear refund.
        let sstore_clears_schedule = if spec_id.is_enabled_in(SpecId::LONDON) {
            (SSTORE_RESET - COLD_SLOAD_COST + ACCESS_LIST_STORAGE_KEY) as i64
        } else {
            REFUND_SSTORE_CLEARS
        };

        if vals.present_value == vals.new_value {
            return 0;
        }
        if vals.original_value == vals.present_value && vals.new_value.is_zero() {
            return sstore_clears_schedule;
        }

        let mut refund = 0;
        if !vals.original_value.is_zero() {
            if vals.present_value.is_zero() {
                refund -= sstore_clears_schedule;
            } else if vals.new_value.is_zero() {
                refund += sstore_clears_schedule;
            }
        }

        if vals.original_value == vals.new_value {
            let (gas_sstore_reset, gas_sload) = if spec_id.is_enabled_in(SpecId::BERLIN) {
                (WARM_SSTORE_RESET, WARM_STORAGE_READ_COST)
            } else {
                (SSTORE_RESET, sload_cost(spec_id, false))
            };
            if vals.original_value.is_zero() {
                refund += (SSTORE_SET - gas_sload) as i64;
            } else {
                refund += (gas_sstore_reset - gas_sload) as i64;
            }
        }

        refund
    } else if !vals.present_value.is_zero() && vals.new_value.is_zero() {
        REFUND_SSTORE_CLEARS
    } else {
        0
    }
}

/// Base cost of a call: account access, value transfer surcharge and the
/// new-account surcharge. Stipend and forwarded gas are handled separately.
#[inline]
pub const fn call_cost(
    spec_id: SpecId,
    transfers_value: bool,
    is_cold: bool,
    new_account_accounting: bool,
) -> u64 {
    let mut gas = if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        40
    };

    if transfers_value {
        gas += CALLVALUE;
    }

    if new_account_accounting {
        // EIP-161: only charge for account creation when value moves.
        if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            if transfers_value {
                gas += NEWACCOUNT;
            }
        } else {
            gas += NEWACCOUNT;
        }
    }

    gas
}

/// `SELFDESTRUCT` cost.
#[inline]
pub const fn selfdestruct_cost(spec_id: SpecId, res: &StateLoad<SelfDestructResult>) -> u64 {
    let should_charge_topup = if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        res.data.had_value && !res.data.target_exists
    } else {
        !res.data.target_exists
    };

    let topup = if spec_id.is_enabled_in(SpecId::TANGERINE) && should_charge_topup {
        25000
    } else {
        0
    };

    let base = if spec_id.is_enabled_in(SpecId::TANGERINE) {
        5000
    } else {
        0
    };

    let mut gas = base + topup;
    if spec_id.is_enabled_in(SpecId::BERLIN) && res.is_cold {
        gas += COLD_ACCOUNT_ACCESS_COST;
    }
    gas
}

/// Intrinsic gas of a transaction: base stipend, data bytes, access list and
/// initcode metering.
pub fn initial_tx_gas(
    spec_id: SpecId,
    input: &[u8],
    is_create: bool,
    access_list: &[(Address, Vec<U256>)],
) -> u64 {
    let zero_data_len = input.iter().filter(|v| **v == 0).count() as u64;
    let non_zero_data_len = input.len() as u64 - zero_data_len;

    let mut initial_gas = 0;
    initial_gas += zero_data_len * TRANSACTION_ZERO_DATA;
    // EIP-2028 reduced the non-zero byte cost.
    initial_gas += non_zero_data_len
        * if spec_id.is_enabled_in(SpecId::ISTANBUL) {
            TRANSACTION_NON_ZERO_DATA_ISTANBUL
        } else {
            TRANSACTION_NON_ZERO_DATA_FRONTIER
        };

    if spec_id.is_enabled_in(SpecId::BERLIN) {
        let accessed_slots: u64 = access_list
            .iter()
            .map(|(_, slots)| slots.len() as u64)
            .sum();
        initial_gas += access_list.len() as u64 * ACCESS_LIST_ADDRESS;
        initial_gas += accessed_slots * ACCESS_LIST_STORAGE_KEY;
    }

    initial_gas += if is_create && spec_id.is_enabled_in(SpecId::HOMESTEAD) {
        // EIP-2
        53000
    } else {
        TRANSACTION_BASE
    };

    // EIP-3860: initcode stipend for the analysis pass.
    if is_create && spec_id.is_enabled_in(SpecId::SHANGHAI) {
        initial_gas += initcode_cost(input.len() as u64);
    }

    initial_gas
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::hardfork::SpecId::*;

    fn vals(original: u64, present: u64, new: u64) -> SStoreResult {
        SStoreResult {
            original_value: U256::from(original),
            present_value: U256::from(present),
            new_value: U256::from(new),
        }
    }

    #[test]
    fn exp_cost_per_byte() {
        assert_eq!(exp_cost(CANCUN, U256::ZERO), Some(10));
        assert_eq!(exp_cost(CANCUN, U256::from(255)), Some(60));
        assert_eq!(exp_cost(CANCUN, U256::from(256)), Some(110));
        assert_eq!(exp_cost(HOMESTEAD, U256::from(256)), Some(30));
        assert_eq!(exp_cost(CANCUN, U256::MAX), Some(10 + 50 * 32));
    }

    #[test]
    fn sstore_sentry_fails_with_stipend_left() {
        assert_eq!(sstore_cost(CANCUN, &vals(0, 0, 1), 2300, false), None);
        assert!(sstore_cost(CANCUN, &vals(0, 0, 1), 2301, false).is_some());
        // No sentry before Istanbul.
        assert!(sstore_cost(PETERSBURG, &vals(0, 0, 1), 100, false).is_some());
    }

    #[test]
    fn sstore_cost_ladder_berlin() {
        // Fresh set of a zero slot.
        assert_eq!(sstore_cost(CANCUN, &vals(0, 0, 1), 10_000, false), Some(20000));
        // Reset of a non-zero slot, warm.
        assert_eq!(sstore_cost(CANCUN, &vals(1, 1, 2), 10_000, false), Some(2900));
        // No-op write.
        assert_eq!(sstore_cost(CANCUN, &vals(1, 1, 1), 10_000, false), Some(100));
        // Dirty write.
        assert_eq!(sstore_cost(CANCUN, &vals(1, 2, 3), 10_000, false), Some(100));
        // Cold surcharge stacks on top.
        assert_eq!(sstore_cost(CANCUN, &vals(1, 1, 1), 10_000, true), Some(2200));
    }

    #[test]
    fn sstore_refund_clear_london() {
        // Clearing a slot refunds 4800 from London.
        assert_eq!(sstore_refund(LONDON, &vals(1, 1, 0)), 4800);
        assert_eq!(sstore_refund(BERLIN, &vals(1, 1, 0)), 15000);
        // Restoring a dirty slot to its original value.
        assert_eq!(sstore_refund(LONDON, &vals(1, 2, 1)), 2900 - 100);
        assert_eq!(sstore_refund(LONDON, &vals(0, 2, 0)), (20000 - 100) + 4800);
        // Un-clearing reverses the refund.
        assert_eq!(sstore_refund(LONDON, &vals(1, 0, 2)), -4800);
    }

    #[test]
    fn net_refund_of_a_round_trip_is_zero() {
        // original=5: 5 -> 9 -> 5 nets to zero refund contribution.
        let forward = sstore_refund(LONDON, &vals(5, 5, 9));
        let back = sstore_refund(LONDON, &vals(5, 9, 5));
        assert_eq!(forward, 0);
        assert_eq!(back, 2800);
        // The forward write charged 2900 where a no-op costs 100; the 2800
        // refund on the way back cancels exactly that difference.
    }

    #[test]
    fn intrinsic_gas_data_costs() {
        let data = [0u8, 1, 0, 2];
        assert_eq!(
            initial_tx_gas(CANCUN, &data, false, &[]),
            21000 + 2 * 4 + 2 * 16
        );
        assert_eq!(
            initial_tx_gas(HOMESTEAD, &data, false, &[]),
            21000 + 2 * 4 + 2 * 68
        );
    }

    #[test]
    fn intrinsic_gas_create_and_access_list() {
        assert_eq!(initial_tx_gas(FRONTIER, &[], true, &[]), 21000);
        assert_eq!(initial_tx_gas(HOMESTEAD, &[], true, &[]), 53000);
        // Shanghai adds initcode metering.
        let initcode = [1u8; 64];
        assert_eq!(
            initial_tx_gas(SHANGHAI, &initcode, true, &[]),
            53000 + 64 * 16 + 2 * 2
        );
        let list = [(Address::ZERO, vec![U256::ZERO, U256::from(1)])];
        assert_eq!(
            initial_tx_gas(CANCUN, &[], false, &list),
            21000 + 2400 + 2 * 1900
        );
    }
}
