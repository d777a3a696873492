//! Build → sign → submit → confirm.
//!
//! # Responsibilities
//! - Read decimals and nonce fresh for every transfer
//! - Refuse to sign when the sender cannot cover the amount
//! - Refuse to broadcast a transaction signed for another chain or by
//!   another key
//! - Require a successful receipt status before reporting success
//!
//! No step is retried. A rejected submission is reported to the caller,
//! who must rebuild with a fresh nonce; a timed-out wait is reported as
//! indeterminate because the transaction may still be mined.
//!
//! Nonces are read, not allocated: two pipelines sharing a sender key and
//! running concurrently can read the same nonce, and the network will reject
//! one of them. Serialize transfers per sender outside this type.

use alloy::primitives::{Address, TxHash};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::client::ChainClient;
use crate::blockchain::token::TokenContract;
use crate::blockchain::transaction::{build_transfer, UnsignedTransfer};
use crate::blockchain::types::{
    TransferError, TransferOutcome, TransferResult, TransferState, TxReceipt,
};
use crate::blockchain::wallet::{sign_transfer, verify_signed, SenderKey, SignedTransfer};
use crate::config::loader::ConfigError;
use crate::config::schema::TransferConfig;
use crate::config::validation::validate_config;
use crate::observability::metrics;
use crate::transfer::confirmation::wait_for_receipt;

/// One configured transfer over a chain client.
pub struct TransferPipeline<C> {
    client: C,
    config: TransferConfig,
    token: TokenContract,
}

impl<C: ChainClient> TransferPipeline<C> {
    pub fn new(client: C, config: TransferConfig) -> Self {
        let token = TokenContract::new(config.token.address);
        Self {
            client,
            config,
            token,
        }
    }

    /// Underlying chain client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Configuration this pipeline was built with.
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Run the whole transfer with `key` as sender.
    ///
    /// A `shutdown` signal received before submission aborts with
    /// `Interrupted`; one received later abandons the confirmation wait.
    pub async fn execute(
        &self,
        key: &SenderKey,
        shutdown: broadcast::Receiver<()>,
    ) -> TransferResult<TransferOutcome> {
        self.execute_with(key, shutdown, |_| {}).await
    }

    /// Like [`execute`](Self::execute), calling `on_submitted` with the
    /// transaction hash as soon as the node has accepted it.
    pub async fn execute_with(
        &self,
        key: &SenderKey,
        mut shutdown: broadcast::Receiver<()>,
        on_submitted: impl FnOnce(TxHash) + Send,
    ) -> TransferResult<TransferOutcome> {
        let span = tracing::info_span!("transfer", transfer_id = %Uuid::new_v4());

        async {
            let result = self.run(key, &mut shutdown, on_submitted).await;
            match &result {
                Ok(outcome) => {
                    metrics::record_outcome("confirmed");
                    tracing::info!(
                        state = ?TransferState::Confirmed,
                        tx_hash = %outcome.tx_hash,
                        block_number = outcome.block_number,
                        "Transfer confirmed"
                    );
                }
                Err(e) => {
                    let (label, state) = failure_label(e);
                    metrics::record_outcome(label);
                    tracing::error!(state = ?state, error = %e, "Transfer failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        key: &SenderKey,
        shutdown: &mut broadcast::Receiver<()>,
        on_submitted: impl FnOnce(TxHash),
    ) -> TransferResult<TransferOutcome> {
        // The config may have been built in code rather than loaded.
        validate_config(&self.config).map_err(ConfigError::Validation)?;

        let sender = key.address()?;
        let unsigned = self.prepare(sender).await?;
        let signed = self.sign(&unsigned, key)?;

        // Last point at which stopping leaves no trace on chain.
        if shutdown_requested(shutdown) {
            return Err(TransferError::Interrupted);
        }
        let tx_hash = self.submit(&signed, sender).await?;
        on_submitted(tx_hash);
        let receipt = self.confirm(tx_hash, shutdown).await?;

        Ok(TransferOutcome {
            tx_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            sender,
            recipient: unsigned.recipient,
            token: unsigned.to,
            amount: unsigned.amount,
            decimals: unsigned.decimals,
            nonce: unsigned.nonce,
            gas_used: receipt.gas_used,
        })
    }

    /// Read decimals and nonce, build the unsigned transfer and check the
    /// sender's balance.
    pub async fn prepare(&self, sender: Address) -> TransferResult<UnsignedTransfer> {
        let settings = &self.config.transfer;
        let gas_price = settings.gas_price_wei()?;

        let decimals = self.token.read_decimals(&self.client).await?;
        let nonce = self.client.get_transaction_count(sender).await?;

        let unsigned = build_transfer(
            sender,
            settings.recipient,
            self.token.address(),
            &settings.amount,
            decimals,
            nonce,
            self.config.rpc.chain_id,
            settings.gas_limit,
            gas_price,
        )?;

        if settings.check_balance {
            let available = self.token.read_balance(&self.client, sender).await?;
            if available < unsigned.amount {
                return Err(TransferError::InsufficientBalance {
                    required: unsigned.amount,
                    available,
                });
            }
        }

        tracing::info!(
            state = ?TransferState::Built,
            sender = %sender,
            recipient = %unsigned.recipient,
            token = %unsigned.to,
            symbol = %self.config.token.symbol,
            amount = %settings.amount,
            base_units = %unsigned.amount,
            decimals,
            nonce,
            chain_id = unsigned.chain_id,
            gas_limit = unsigned.gas_limit,
            gas_price = unsigned.gas_price,
            "Transfer built"
        );

        Ok(unsigned)
    }

    /// Sign `unsigned` with `key`.
    pub fn sign(&self, unsigned: &UnsignedTransfer, key: &SenderKey) -> TransferResult<SignedTransfer> {
        let signed = sign_transfer(unsigned, key)?;
        tracing::info!(
            state = ?TransferState::Signed,
            tx_hash = %signed.tx_hash(),
            nonce = signed.nonce(),
            "Transfer signed"
        );
        Ok(signed)
    }

    /// Broadcast `signed` after checking it belongs to the client's chain
    /// and was signed by `sender`.
    pub async fn submit(&self, signed: &SignedTransfer, sender: Address) -> TransferResult<TxHash> {
        verify_signed(signed.raw(), self.client.chain_id(), sender)?;

        let tx_hash = self.client.send_raw_transaction(signed.raw()).await?;
        if tx_hash != signed.tx_hash() {
            tracing::warn!(
                local = %signed.tx_hash(),
                remote = %tx_hash,
                "Node reported a different transaction hash"
            );
        }

        tracing::info!(state = ?TransferState::Submitted, tx_hash = %tx_hash, "Transfer submitted");
        Ok(tx_hash)
    }

    /// Wait for the receipt of `tx_hash` and require a success status.
    pub async fn confirm(
        &self,
        tx_hash: TxHash,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> TransferResult<TxReceipt> {
        let confirmation = &self.config.confirmation;
        let started = Instant::now();

        let receipt = wait_for_receipt(
            &self.client,
            tx_hash,
            Duration::from_millis(confirmation.poll_interval_ms),
            Duration::from_secs(confirmation.timeout_secs),
            shutdown,
        )
        .await?;
        metrics::record_confirmation_latency(started.elapsed());

        let block_number = receipt.block_number.unwrap_or_default();
        if !receipt.status {
            return Err(TransferError::Reverted {
                tx_hash,
                block_number,
            });
        }

        Ok(receipt)
    }
}

/// Non-blocking check for a pending shutdown signal.
fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    matches!(
        shutdown.try_recv(),
        Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_))
    )
}

/// Metric label and terminal state for a failed transfer.
fn failure_label(error: &TransferError) -> (&'static str, TransferState) {
    match error {
        TransferError::ConfirmationTimeout { .. } => ("timed_out", TransferState::TimedOut),
        TransferError::Cancelled { .. } => ("cancelled", TransferState::Cancelled),
        TransferError::Interrupted => ("interrupted", TransferState::Cancelled),
        TransferError::Reverted { .. } => ("reverted", TransferState::Failed),
        TransferError::Submission(_) => ("rejected", TransferState::Failed),
        TransferError::SubmissionUnknown { .. } => ("submission_unknown", TransferState::Failed),
        _ => ("failed", TransferState::Failed),
    }
}
