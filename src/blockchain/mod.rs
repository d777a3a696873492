//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! client.rs      (RPC session: nonce, eth_call, raw submission, receipts)
//!     → token.rs       (decimals / balanceOf reads, transfer encoding)
//!     → amount.rs      (exact human amount → smallest units)
//!     → transaction.rs (unsigned envelope)
//!     → wallet.rs      (scoped key, EIP-155 signing)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod amount;
pub mod client;
pub mod token;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use amount::HumanAmount;
pub use client::{ChainClient, RpcChainClient};
pub use token::TokenContract;
pub use transaction::{build_transfer, UnsignedTransfer};
pub use types::{NonceTag, TransferError, TransferOutcome, TransferResult, TxReceipt};
pub use wallet::{sign_transfer, verify_signed, SenderKey, SignedTransfer};
