//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed confirmation wait returns Cancelled
//! ```
//!
//! # Design Decisions
//! - Cancelling abandons the local wait only; nothing on chain is undone

pub mod shutdown;
pub mod signals;

pub use shutdown::{cancelled, Shutdown};
