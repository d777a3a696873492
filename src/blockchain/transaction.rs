//! Unsigned transfer construction.
//!
//! Building is pure: every envelope field comes from the caller. Chain ID
//! and gas values are never defaulted or estimated here.

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxKind, U256};

use crate::blockchain::amount::HumanAmount;
use crate::blockchain::token::encode_transfer_call;
use crate::blockchain::types::TransferResult;

/// Unsigned ERC-20 transfer envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransfer {
    pub sender: Address,
    /// Call target: the token contract.
    pub to: Address,
    /// Token recipient encoded in the call data.
    pub recipient: Address,
    /// Amount in the token's smallest units.
    pub amount: U256,
    pub decimals: u8,
    /// ABI-encoded `transfer(address,uint256)`.
    pub input: Bytes,
    pub nonce: u64,
    pub chain_id: u64,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
}

impl UnsignedTransfer {
    /// Native value attached to the call. Always zero for token transfers.
    pub fn value(&self) -> U256 {
        U256::ZERO
    }

    /// Legacy (gasPrice) transaction carrying an EIP-155 chain ID.
    pub fn to_legacy_tx(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value(),
            input: self.input.clone(),
        }
    }
}

/// Build an unsigned transfer of `amount` whole tokens.
///
/// Fails with `Precision` when `amount` has more fractional digits than
/// `decimals` allows and with `Encoding` when the smallest-unit amount
/// overflows uint256 or the recipient is the zero address.
#[allow(clippy::too_many_arguments)]
pub fn build_transfer(
    sender: Address,
    recipient: Address,
    token: Address,
    amount: &HumanAmount,
    decimals: u8,
    nonce: u64,
    chain_id: u64,
    gas_limit: u64,
    gas_price: u128,
) -> TransferResult<UnsignedTransfer> {
    let base_units = amount.to_base_units(decimals)?;
    let input = encode_transfer_call(recipient, base_units)?;

    Ok(UnsignedTransfer {
        sender,
        to: token,
        recipient,
        amount: base_units,
        decimals,
        input,
        nonce,
        chain_id,
        gas_limit,
        gas_price,
    })
}
