//! Receipt polling.

use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{TransferError, TransferResult, TxReceipt};
use crate::lifecycle::cancelled;

/// Poll for the receipt of `tx_hash` until it carries a block number.
///
/// The first poll is immediate, then one every `poll_interval`. Returns
/// `ConfirmationTimeout` after `wait_timeout` and `Cancelled` when
/// `shutdown` fires. Neither affects the transaction itself. A zero
/// `poll_interval` is a `Config` error.
pub async fn wait_for_receipt<C: ChainClient>(
    client: &C,
    tx_hash: TxHash,
    poll_interval: Duration,
    wait_timeout: Duration,
    shutdown: &mut broadcast::Receiver<()>,
) -> TransferResult<TxReceipt> {
    if poll_interval.is_zero() {
        return Err(TransferError::Config(
            "confirmation poll interval must be greater than 0".to_string(),
        ));
    }

    let poll = async {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u64 = 0;

        loop {
            ticker.tick().await;
            attempts += 1;

            match client.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.block_number.is_some() => return receipt,
                Ok(_) => {
                    tracing::debug!(tx_hash = %tx_hash, attempts, "Transaction pending");
                }
                Err(e) => {
                    // Polling continues; the deadline bounds persistent failures.
                    tracing::warn!(tx_hash = %tx_hash, attempts, error = %e, "Receipt poll failed");
                }
            }
        }
    };

    tokio::select! {
        result = timeout(wait_timeout, poll) => result.map_err(|_| {
            TransferError::ConfirmationTimeout {
                tx_hash,
                waited: wait_timeout,
            }
        }),
        _ = cancelled(shutdown) => Err(TransferError::Cancelled { tx_hash }),
    }
}
