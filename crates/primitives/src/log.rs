use alloy_primitives::{Address, Bytes, B256};
use std::vec::Vec;

/// A log emitted by `LOG0`..`LOG4`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Log {
    /// Address of the contract that emitted the log.
    pub address: Address,
    /// Between zero and four indexed topics.
    pub topics: Vec<B256>,
    /// Unindexed payload.
    pub data: Bytes,
}

impl Log {
    /// Creates a new log, returning `None` if more than four topics are given.
    pub fn new(address: Address, topics: Vec<B256>, data: Bytes) -> Option<Self> {
        if topics.len() > 4 {
            return None;
        }
        Some(Self {
            address,
            topics,
            data,
        })
    }
}
