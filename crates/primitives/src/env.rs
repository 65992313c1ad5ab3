//! Execution environment: block, transaction and configuration data.

use crate::{
    hardfork::SpecId,
    result::{InvalidHeader, InvalidTransaction},
    BLOB_GASPRICE_UPDATE_FRACTION, GAS_PER_BLOB, MIN_BLOB_GASPRICE,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use std::vec::Vec;

/// The environment a transaction executes in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Env {
    /// Chain configuration.
    pub cfg: CfgEnv,
    /// The block being built.
    pub block: BlockEnv,
    /// The transaction being executed.
    pub tx: TxEnv,
}

impl Env {
    /// Effective gas price of the transaction.
    ///
    /// For EIP-1559 transactions this is `min(gas_price, basefee + priority_fee)`.
    pub fn effective_gas_price(&self) -> U256 {
        match self.tx.gas_priority_fee {
            None => self.tx.gas_price,
            Some(priority_fee) => {
                core::cmp::min(self.tx.gas_price, self.block.basefee + priority_fee)
            }
        }
    }

    /// Total blob gas consumed by the transaction (EIP-4844).
    pub fn total_blob_gas(&self) -> u64 {
        GAS_PER_BLOB * self.tx.blob_hashes.len() as u64
    }

    /// Blob fee of the transaction, if the block carries a blob gas price.
    pub fn calc_data_fee(&self) -> Option<U256> {
        self.block
            .get_blob_gasprice()
            .map(|price| U256::from(price).saturating_mul(U256::from(self.total_blob_gas())))
    }

    /// Validates fields of the block that the active fork requires.
    pub fn validate_block_env(&self, spec_id: SpecId) -> Result<(), InvalidHeader> {
        // `prevrandao` replaced `difficulty` at the merge.
        if spec_id.is_enabled_in(SpecId::MERGE) && self.block.prevrandao.is_none() {
            return Err(InvalidHeader::PrevrandaoNotSet);
        }
        // Excess blob gas is part of the header from Cancun on.
        if spec_id.is_enabled_in(SpecId::CANCUN) && self.block.blob_excess_gas_and_price.is_none() {
            return Err(InvalidHeader::ExcessBlobGasNotSet);
        }
        Ok(())
    }

    /// Validates the transaction against the block and configuration.
    pub fn validate_tx(&self, spec_id: SpecId) -> Result<(), InvalidTransaction> {
        // Gas limit may not exceed the block gas limit.
        if !self.cfg.disable_block_gas_limit
            && U256::from(self.tx.gas_limit) > self.block.gas_limit
        {
            return Err(InvalidTransaction::CallerGasLimitMoreThanBlock);
        }

        if let Some(chain_id) = self.tx.chain_id {
            if chain_id != self.cfg.chain_id {
                return Err(InvalidTransaction::InvalidChainId);
            }
        }

        // EIP-1559: the declared max fee must cover the block basefee.
        if spec_id.is_enabled_in(SpecId::LONDON) {
            if let Some(priority_fee) = self.tx.gas_priority_fee {
                if priority_fee > self.tx.gas_price {
                    return Err(InvalidTransaction::PriorityFeeGreaterThanMaxFee);
                }
            }
            if self.tx.gas_price < self.block.basefee {
                return Err(InvalidTransaction::GasPriceLessThanBasefee);
            }
        }

        if spec_id.is_enabled_in(SpecId::CANCUN) && !self.tx.blob_hashes.is_empty() {
            // A create transaction cannot carry blobs.
            if self.tx.transact_to.is_create() {
                return Err(InvalidTransaction::BlobCreateTransaction);
            }
            let Some(max_fee) = self.tx.max_fee_per_blob_gas else {
                return Err(InvalidTransaction::BlobGasPriceGreaterThanMax);
            };
            // There must be a block blob gas price to compare against;
            // `validate_block_env` has established its presence.
            if let Some(price) = self.block.get_blob_gasprice() {
                if U256::from(price) > max_fee {
                    return Err(InvalidTransaction::BlobGasPriceGreaterThanMax);
                }
            }
        }

        Ok(())
    }
}

/// The block the transaction is part of.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockEnv {
    /// Block number.
    pub number: U256,
    /// Beneficiary of the block reward and transaction fees.
    pub coinbase: Address,
    /// Block timestamp in seconds.
    pub timestamp: U256,
    /// Block gas limit.
    pub gas_limit: U256,
    /// Base fee per gas (EIP-1559), zero before London.
    pub basefee: U256,
    /// Block difficulty; unused after the merge.
    pub difficulty: U256,
    /// Randomness beacon output, set from the merge onward.
    pub prevrandao: Option<B256>,
    /// Excess blob gas and the derived blob gas price (EIP-4844).
    pub blob_excess_gas_and_price: Option<BlobExcessGasAndPrice>,
}

impl BlockEnv {
    /// Blob gas price of the block, if set.
    pub fn get_blob_gasprice(&self) -> Option<u128> {
        self.blob_excess_gas_and_price.as_ref().map(|a| a.blob_gasprice)
    }
}

impl Default for BlockEnv {
    fn default() -> Self {
        Self {
            number: U256::ZERO,
            coinbase: Address::ZERO,
            timestamp: U256::from(1),
            gas_limit: U256::MAX,
            basefee: U256::ZERO,
            difficulty: U256::ZERO,
            prevrandao: Some(B256::ZERO),
            blob_excess_gas_and_price: Some(BlobExcessGasAndPrice::new(0)),
        }
    }
}

/// Excess blob gas of the block together with the price derived from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlobExcessGasAndPrice {
    /// Excess blob gas carried over from the parent block.
    pub excess_blob_gas: u64,
    /// Blob gas price derived via the fake exponential of EIP-4844.
    pub blob_gasprice: u128,
}

impl BlobExcessGasAndPrice {
    /// Derives the blob gas price from the excess blob gas.
    pub fn new(excess_blob_gas: u64) -> Self {
        Self {
            excess_blob_gas,
            blob_gasprice: calc_blob_gasprice(excess_blob_gas),
        }
    }
}

/// Approximates `factor * e^(numerator / denominator)` using Taylor expansion,
/// as specified by EIP-4844.
pub fn calc_blob_gasprice(excess_blob_gas: u64) -> u128 {
    fake_exponential(
        MIN_BLOB_GASPRICE,
        excess_blob_gas,
        BLOB_GASPRICE_UPDATE_FRACTION,
    )
}

fn fake_exponential(factor: u64, numerator: u64, denominator: u64) -> u128 {
    let factor = factor as u128;
    let numerator = numerator as u128;
    let denominator = denominator as u128;

    let mut i = 1;
    let mut output = 0;
    let mut numerator_accum = factor * denominator;
    while numerator_accum > 0 {
        output += numerator_accum;
        // Denominator is a protocol constant, never zero.
        numerator_accum = (numerator_accum * numerator) / (denominator * i);
        i += 1;
    }
    output / denominator
}

/// The transaction to execute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxEnv {
    /// Sender of the transaction.
    pub caller: Address,
    /// Gas limit of the transaction.
    pub gas_limit: u64,
    /// Gas price, or max fee per gas for EIP-1559 transactions.
    pub gas_price: U256,
    /// Max priority fee per gas (EIP-1559).
    pub gas_priority_fee: Option<U256>,
    /// Call target, or contract creation.
    pub transact_to: TransactTo,
    /// Value transferred with the transaction.
    pub value: U256,
    /// Input data of the transaction.
    pub data: Bytes,
    /// Nonce of the transaction; checked against the sender when set.
    pub nonce: Option<u64>,
    /// Chain id; checked against the configuration when set.
    pub chain_id: Option<u64>,
    /// EIP-2930 access list as `(address, storage_keys)` pairs.
    pub access_list: Vec<(Address, Vec<U256>)>,
    /// Blob versioned hashes (EIP-4844).
    pub blob_hashes: Vec<B256>,
    /// Max fee per blob gas (EIP-4844).
    pub max_fee_per_blob_gas: Option<U256>,
}

impl Default for TxEnv {
    fn default() -> Self {
        Self {
            caller: Address::ZERO,
            gas_limit: u64::MAX,
            gas_price: U256::ZERO,
            gas_priority_fee: None,
            transact_to: TransactTo::Call(Address::ZERO),
            value: U256::ZERO,
            data: Bytes::new(),
            nonce: None,
            chain_id: None,
            access_list: Vec::new(),
            blob_hashes: Vec::new(),
            max_fee_per_blob_gas: None,
        }
    }
}

/// Destination of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransactTo {
    /// A call to an existing account.
    Call(Address),
    /// A contract creation.
    Create,
}

impl TransactTo {
    /// Returns `true` if the transaction creates a contract.
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Chain configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgEnv {
    /// Chain id, compared against the transaction's when set there.
    pub chain_id: u64,
    /// Active hardfork.
    pub spec_id: SpecId,
    /// Overrides the EIP-170 contract code size limit.
    pub limit_contract_code_size: Option<usize>,
    /// Whether created and loaded bytecode gets a jump-dest analysis pass.
    pub perf_analyse_created_bytecodes: AnalysisKind,
    /// Disables the EIP-3607 sender-has-code rejection.
    pub disable_eip3607: bool,
    /// Disables balance checks; missing funds saturate to zero instead.
    pub disable_balance_check: bool,
    /// Disables the block gas limit validation.
    pub disable_block_gas_limit: bool,
    /// Disables the end-of-transaction gas refund.
    pub disable_gas_refund: bool,
}

impl Default for CfgEnv {
    fn default() -> Self {
        Self {
            chain_id: 1,
            spec_id: SpecId::LATEST,
            limit_contract_code_size: None,
            perf_analyse_created_bytecodes: AnalysisKind::default(),
            disable_eip3607: false,
            disable_balance_check: false,
            disable_block_gas_limit: false,
            disable_gas_refund: false,
        }
    }
}

/// How bytecode entering the system is prepared for execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisKind {
    /// Keep bytecode raw. Jumps will fault because the jump-dest set is empty.
    Raw,
    /// Pad the bytecode and precompute the jump-dest set.
    #[default]
    Analyse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_requires_prevrandao() {
        let mut env = Env::default();
        env.block.prevrandao = None;
        assert_eq!(
            env.validate_block_env(SpecId::MERGE),
            Err(InvalidHeader::PrevrandaoNotSet)
        );
        assert_eq!(env.validate_block_env(SpecId::LONDON), Ok(()));
    }

    #[test]
    fn cancun_requires_excess_blob_gas() {
        let mut env = Env::default();
        env.block.blob_excess_gas_and_price = None;
        assert_eq!(
            env.validate_block_env(SpecId::CANCUN),
            Err(InvalidHeader::ExcessBlobGasNotSet)
        );
    }

    #[test]
    fn effective_gas_price_caps_at_max_fee() {
        let mut env = Env::default();
        env.block.basefee = U256::from(100);
        env.tx.gas_price = U256::from(150);
        env.tx.gas_priority_fee = Some(U256::from(10));
        assert_eq!(env.effective_gas_price(), U256::from(110));

        env.tx.gas_priority_fee = Some(U256::from(90));
        assert_eq!(env.effective_gas_price(), U256::from(150));
    }

    #[test]
    fn blob_gasprice_at_zero_excess() {
        assert_eq!(calc_blob_gasprice(0), 1);
    }
}
