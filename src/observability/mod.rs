//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / pipeline / confirmation
//!     → logging.rs (structured log events, one span per transfer)
//!     → metrics.rs (liveness gauge, outcome counters, latency histogram)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never formatted key material
//! - Each transfer runs inside a span carrying a UUID v4 transfer id

pub mod logging;
pub mod metrics;
