//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while preparing, sending or confirming a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// RPC endpoint unreachable or transport failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Endpoint or signed transaction belongs to a different chain.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The node answered a read with an error or undecodable data.
    #[error("RPC {method} failed: {reason}")]
    Rpc { method: &'static str, reason: String },

    /// A single RPC request exceeded its deadline.
    #[error("RPC {method} timed out after {secs} seconds")]
    RpcTimeout { method: &'static str, secs: u64 },

    /// Amount has more fractional digits than the token supports.
    #[error("Precision error: {0}")]
    Precision(String),

    /// Call data could not be encoded (overflow, bad recipient).
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Sender does not hold enough tokens for the transfer.
    #[error("Insufficient token balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },

    /// Invalid private key or signature failure.
    #[error("Signing error: {0}")]
    Signing(String),

    /// The node rejected the raw transaction.
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// The raw transaction was handed to the transport but no answer came
    /// back. The node may have accepted it.
    #[error("Submission of {tx_hash} unconfirmed: {reason}")]
    SubmissionUnknown { tx_hash: TxHash, reason: String },

    /// No receipt was observed before the confirmation deadline.
    #[error("Transaction {tx_hash} not confirmed within {waited:?}")]
    ConfirmationTimeout { tx_hash: TxHash, waited: Duration },

    /// Shutdown requested before anything was broadcast.
    #[error("Transfer interrupted before submission; nothing was sent")]
    Interrupted,

    /// The local confirmation wait was abandoned.
    #[error("Confirmation wait for {tx_hash} cancelled")]
    Cancelled { tx_hash: TxHash },

    /// Transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted in block {block_number}")]
    Reverted { tx_hash: TxHash, block_number: u64 },
}

impl TransferError {
    /// True when the transaction may still be mined. Re-query before acting.
    pub fn is_indeterminate(&self) -> bool {
        matches!(
            self,
            TransferError::SubmissionUnknown { .. }
                | TransferError::ConfirmationTimeout { .. }
                | TransferError::Cancelled { .. }
        )
    }

    /// True when the caller may rebuild with a fresh nonce and try again.
    pub fn is_fresh_nonce_retryable(&self) -> bool {
        matches!(self, TransferError::Submission(_))
    }
}

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Block tag used when reading the sender's nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceTag {
    /// Count includes transactions still in the mempool.
    #[default]
    Pending,
    /// Count of mined transactions only.
    Latest,
}

/// Minimal receipt view the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// `None` while the node reports the receipt without a block.
    pub block_number: Option<u64>,
    /// Execution status; `false` means the call reverted.
    pub status: bool,
    pub gas_used: u64,
}

/// Stages of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Failed,
    TimedOut,
    Cancelled,
}

/// Final record of a confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub sender: Address,
    pub recipient: Address,
    pub token: Address,
    /// Amount in the token's smallest units.
    pub amount: U256,
    pub decimals: u8,
    pub nonce: u64,
    pub gas_used: u64,
}
