//! Single ERC-20 stablecoin transfer: build, sign, broadcast, confirm.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod transfer;

pub use blockchain::{ChainClient, RpcChainClient, SenderKey, TransferError, TransferOutcome};
pub use config::TransferConfig;
pub use lifecycle::Shutdown;
pub use transfer::TransferPipeline;
