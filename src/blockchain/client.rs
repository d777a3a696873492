//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint and verify it serves the configured chain
//! - Read nonces and contract views
//! - Broadcast raw transactions and fetch receipts
//! - Classify failures (transport, node rejection, timeout)

use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportError};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{NonceTag, TransferError, TransferResult, TxReceipt};
use crate::config::schema::RpcConfig;
use crate::observability::metrics;

/// Chain operations a transfer depends on.
///
/// Implemented over JSON-RPC by [`RpcChainClient`]; tests substitute an
/// in-memory chain.
pub trait ChainClient: Send + Sync {
    /// Chain ID this client is bound to.
    fn chain_id(&self) -> u64;

    /// Next nonce for `address` (`eth_getTransactionCount`).
    fn get_transaction_count(
        &self,
        address: Address,
    ) -> impl Future<Output = TransferResult<u64>> + Send;

    /// Read-only contract call (`eth_call`).
    fn call(&self, to: Address, data: Bytes)
        -> impl Future<Output = TransferResult<Bytes>> + Send;

    /// Broadcast a signed transaction (`eth_sendRawTransaction`).
    ///
    /// A node-side rejection is [`TransferError::Submission`]. When no answer
    /// comes back the outcome is [`TransferError::SubmissionUnknown`].
    fn send_raw_transaction(
        &self,
        raw: &[u8],
    ) -> impl Future<Output = TransferResult<TxHash>> + Send;

    /// Receipt for `tx_hash`, `None` while pending (`eth_getTransactionReceipt`).
    fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = TransferResult<Option<TxReceipt>>> + Send;
}

/// JSON-RPC chain client.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: String,
    chain_id: u64,
    nonce_tag: NonceTag,
    /// Per-request timeout.
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Connect to the endpoint and verify it.
    ///
    /// Fails fast: an unreachable endpoint is a `Connection` error and an
    /// endpoint serving another chain is a `ChainMismatch`.
    pub async fn connect(config: &RpcConfig) -> TransferResult<Self> {
        let client = Self::new(config)?;

        let remote_chain_id = match client
            .request("eth_chainId", client.provider.get_chain_id())
            .await
        {
            Ok(id) => id,
            Err(e) => {
                metrics::record_rpc_health(false);
                return Err(TransferError::Connection(format!(
                    "liveness probe to {} failed: {}",
                    config.url, e
                )));
            }
        };
        metrics::record_rpc_health(true);

        if remote_chain_id != config.chain_id {
            return Err(TransferError::ChainMismatch {
                expected: config.chain_id,
                actual: remote_chain_id,
            });
        }

        tracing::info!(
            rpc_url = %config.url,
            chain_id = config.chain_id,
            nonce_tag = ?config.nonce_tag,
            "Blockchain client connected"
        );

        Ok(client)
    }

    /// Build the client without contacting the endpoint.
    fn new(config: &RpcConfig) -> TransferResult<Self> {
        let url: url::Url = config.url.parse().map_err(|e| {
            TransferError::Config(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;

        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        Ok(Self {
            provider,
            rpc_url: config.url.clone(),
            chain_id: config.chain_id,
            nonce_tag: config.nonce_tag,
            timeout_duration: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Run one RPC request under the per-request timeout.
    async fn request<T, F>(&self, method: &'static str, fut: F) -> TransferResult<T>
    where
        F: IntoFuture<Output = Result<T, TransportError>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(classify_read_error(method, e)),
            Err(_) => Err(TransferError::RpcTimeout {
                method,
                secs: self.timeout_duration.as_secs(),
            }),
        }
    }

    /// Endpoint URL this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl ChainClient for RpcChainClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn get_transaction_count(&self, address: Address) -> TransferResult<u64> {
        let request = self.provider.get_transaction_count(address);
        let request = match self.nonce_tag {
            NonceTag::Pending => request.pending(),
            NonceTag::Latest => request.latest(),
        };
        self.request("eth_getTransactionCount", request).await
    }

    async fn call(&self, to: Address, data: Bytes) -> TransferResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.request("eth_call", self.provider.call(tx)).await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> TransferResult<TxHash> {
        // keccak256 of the EIP-2718 encoding is the transaction hash.
        let tx_hash = keccak256(raw);

        match timeout(self.timeout_duration, self.provider.send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(RpcError::ErrorResp(payload))) => {
                Err(TransferError::Submission(payload.to_string()))
            }
            // Only an explicit node error proves the transaction was refused.
            Ok(Err(e)) => Err(TransferError::SubmissionUnknown {
                tx_hash,
                reason: e.to_string(),
            }),
            Err(_) => Err(TransferError::SubmissionUnknown {
                tx_hash,
                reason: format!(
                    "no answer within {} seconds",
                    self.timeout_duration.as_secs()
                ),
            }),
        }
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> TransferResult<Option<TxReceipt>> {
        let receipt = self
            .request(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(tx_hash),
            )
            .await?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash: r.transaction_hash,
            block_number: r.block_number,
            status: r.status(),
            gas_used: r.gas_used,
        }))
    }
}

/// Map an alloy transport error onto the transfer taxonomy.
fn classify_read_error(method: &'static str, error: TransportError) -> TransferError {
    match error {
        RpcError::Transport(kind) => TransferError::Connection(format!("{}: {}", method, kind)),
        RpcError::ErrorResp(payload) => TransferError::Rpc {
            method,
            reason: payload.to_string(),
        },
        other => TransferError::Rpc {
            method,
            reason: other.to_string(),
        },
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("nonce_tag", &self.nonce_tag)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
