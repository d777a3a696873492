//! Transfer metrics.
//!
//! # Metrics
//! - `transfer_rpc_healthy` (gauge): 1 when the liveness probe succeeded
//! - `transfers_total` (counter): finished transfers by outcome
//! - `transfer_confirmation_seconds` (histogram): submit-to-receipt latency
//!
//! # Design Decisions
//! - Uses the `metrics` facade only; the embedding process installs a
//!   recorder if it wants these exported
//! - Without a recorder every call is a no-op

use std::time::Duration;

/// Record RPC endpoint liveness.
pub fn record_rpc_health(healthy: bool) {
    metrics::gauge!("transfer_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}

/// Record a finished transfer.
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("transfers_total", "outcome" => outcome).increment(1);
}

/// Record how long the receipt took to appear.
pub fn record_confirmation_latency(elapsed: Duration) {
    metrics::histogram!("transfer_confirmation_seconds").record(elapsed.as_secs_f64());
}
