//! ERC-20 token contract binding.
//!
//! Only the three functions a transfer needs: `decimals` and `balanceOf`
//! reads, and `transfer` call encoding.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{TransferError, TransferResult};

sol! {
    /// Subset of the ERC-20 interface used for transfers.
    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
    }
}

/// Typed handle over one ERC-20 contract.
#[derive(Debug, Clone, Copy)]
pub struct TokenContract {
    address: Address,
}

impl TokenContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Read `decimals()` from the chain. Never cached.
    pub async fn read_decimals<C: ChainClient>(&self, client: &C) -> TransferResult<u8> {
        let data = IERC20::decimalsCall {}.abi_encode();
        let output = client.call(self.address, Bytes::from(data)).await?;

        IERC20::decimalsCall::abi_decode_returns(&output).map_err(|e| TransferError::Rpc {
            method: "decimals",
            reason: format!("undecodable return data: {}", e),
        })
    }

    /// Read `balanceOf(owner)` from the chain.
    pub async fn read_balance<C: ChainClient>(
        &self,
        client: &C,
        owner: Address,
    ) -> TransferResult<U256> {
        let data = IERC20::balanceOfCall { account: owner }.abi_encode();
        let output = client.call(self.address, Bytes::from(data)).await?;

        IERC20::balanceOfCall::abi_decode_returns(&output).map_err(|e| TransferError::Rpc {
            method: "balanceOf",
            reason: format!("undecodable return data: {}", e),
        })
    }
}

/// ABI-encode `transfer(recipient, amount)`.
///
/// The zero address is refused: standard ERC-20 implementations revert on
/// it, and it is never a deliberate transfer target.
pub fn encode_transfer_call(recipient: Address, amount: U256) -> TransferResult<Bytes> {
    if recipient == Address::ZERO {
        return Err(TransferError::Encoding(
            "recipient is the zero address".to_string(),
        ));
    }

    let call = IERC20::transferCall {
        to: recipient,
        value: amount,
    };
    Ok(Bytes::from(call.abi_encode()))
}
