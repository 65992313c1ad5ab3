//! Opcodes that read the block and transaction environment.

use crate::{gas, interpreter::Interpreter, Host};
use primitives::{hardfork::SpecId, U256};

pub fn chainid<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(host.env().cfg.chain_id));
}

pub fn coinbase<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.coinbase.into_word().into());
}

pub fn timestamp<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.timestamp);
}

pub fn block_number<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.number);
}

/// `DIFFICULTY` before the merge, `PREVRANDAO` after.
pub fn difficulty<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    if interpreter.spec_id.is_enabled_in(SpecId::MERGE) {
        // Validation guarantees prevrandao is present post-merge.
        let prevrandao = host.env().block.prevrandao.unwrap_or_default();
        push!(interpreter, prevrandao.into());
    } else {
        push!(interpreter, host.env().block.difficulty);
    }
}

pub fn gaslimit<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.gas_limit);
}

pub fn gasprice<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().effective_gas_price());
}

pub fn origin<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().tx.caller.into_word().into());
}

/// EIP-3198 `BASEFEE`.
pub fn basefee<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.basefee);
}

/// EIP-4844 `BLOBHASH`: the `i`th versioned hash of the transaction, zero
/// when out of range.
pub fn blob_hash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], index, interpreter);
    let i = as_usize_saturated!(*index);
    *index = host
        .env()
        .tx
        .blob_hashes
        .get(i)
        .map(|hash| U256::from_be_bytes(hash.0))
        .unwrap_or(U256::ZERO);
}

/// EIP-7516 `BLOBBASEFEE`.
pub fn blob_basefee<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(
        interpreter,
        U256::from(host.env().block.get_blob_gasprice().unwrap_or_default())
    );
}
