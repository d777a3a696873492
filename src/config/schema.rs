//! Configuration schema definitions.
//!
//! Fields that decide where funds go or how the transaction is priced have
//! no defaults and must be present in the file. Operational knobs
//! (timeouts, polling, logging) fall back to the defaults below.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::blockchain::amount::HumanAmount;
use crate::blockchain::types::{NonceTag, TransferError, TransferResult};
use crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR;

/// Decimals of the gwei unit relative to wei.
const GWEI_DECIMALS: u8 = 9;

/// Root configuration for one transfer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferConfig {
    /// Chain endpoint.
    pub rpc: RpcConfig,

    /// Token contract.
    pub token: TokenConfig,

    /// What to send, to whom, at what price.
    pub transfer: TransferSettings,

    #[serde(default)]
    pub signer: SignerConfig,

    #[serde(default)]
    pub confirmation: ConfirmationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Chain ID (e.g., 9745 for Plasma mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub timeout_secs: u64,

    /// Block tag for nonce reads.
    #[serde(default)]
    pub nonce_tag: NonceTag,
}

fn default_rpc_timeout_secs() -> u64 {
    10
}

/// Token contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// ERC-20 contract address.
    pub address: Address,

    /// Display symbol for logs and output.
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    "USDT".to_string()
}

/// Transfer parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferSettings {
    /// Token recipient.
    pub recipient: Address,

    /// Amount in whole tokens, as text (e.g. "10" or "12.5").
    pub amount: HumanAmount,

    /// Gas limit for the transfer call.
    pub gas_limit: u64,

    /// Fixed gas price in gwei, as text (e.g. "0.0000001").
    pub gas_price_gwei: HumanAmount,

    /// Refuse to sign when the sender's token balance is too low.
    #[serde(default = "default_true")]
    pub check_balance: bool,
}

fn default_true() -> bool {
    true
}

impl TransferSettings {
    /// Gas price converted to wei.
    pub fn gas_price_wei(&self) -> TransferResult<u128> {
        let wei = self
            .gas_price_gwei
            .to_base_units(GWEI_DECIMALS)
            .map_err(|e| TransferError::Config(format!("gas_price_gwei: {}", e)))?;

        if wei > U256::from(u128::MAX) {
            return Err(TransferError::Config(format!(
                "gas_price_gwei: {} gwei does not fit in 128 bits of wei",
                self.gas_price_gwei
            )));
        }
        Ok(wei.to::<u128>())
    }
}

/// Where the sender key comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Name of the environment variable holding the hex private key.
    pub private_key_env: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            private_key_env: PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Interval between receipt polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum time to wait for a receipt in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            timeout_secs: 120,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
