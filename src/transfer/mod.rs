//! Transfer subsystem.
//!
//! # Data Flow
//! ```text
//! Built      pipeline.rs prepare: decimals + nonce → UnsignedTransfer
//!   → Signed     wallet signing, chain-bound
//!   → Submitted  eth_sendRawTransaction
//!   → Confirmed  confirmation.rs polling, status checked
//!
//! Submitted → TimedOut | Cancelled | Failed (reverted)
//! ```

pub mod confirmation;
pub mod pipeline;

pub use confirmation::wait_for_receipt;
pub use pipeline::TransferPipeline;
