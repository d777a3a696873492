//! Shared utilities for integration testing: an in-memory chain.

#![allow(dead_code)]

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use std::collections::HashMap;
use std::sync::Mutex;

use usdt_transfer::blockchain::{ChainClient, TransferError, TransferResult, TxReceipt};
use usdt_transfer::config::{parse_config, TransferConfig};

/// Anvil's first account.
pub const SENDER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const SENDER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const TOKEN: Address = address!("b8ce59fc3717ada4c02eadf9682a9e934f625ebb");
pub const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
/// Anvil's second account, which is also `RECIPIENT`.
pub const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

const DECIMALS_SELECTOR: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Configuration for chain 9745 with fast polling.
pub fn test_config(amount: &str) -> TransferConfig {
    parse_config(&format!(
        r#"
        [rpc]
        url = "http://localhost:8545"
        chain_id = 9745

        [token]
        address = "{TOKEN}"
        symbol = "USDT0"

        [transfer]
        recipient = "{RECIPIENT}"
        amount = "{amount}"
        gas_limit = 150000
        gas_price_gwei = "0.0000001"

        [confirmation]
        poll_interval_ms = 10
        timeout_secs = 1
        "#
    ))
    .unwrap()
}

#[derive(Default)]
struct MockState {
    decimals: u8,
    balance: U256,
    next_nonce: u64,
    block_number: u64,
    /// Receipts served once their remaining empty polls reach zero.
    receipts: HashMap<TxHash, (u32, TxReceipt)>,
    /// Empty polls before each accepted transaction becomes visible.
    pending_polls: u32,
    /// Polls that report the receipt without a block number first.
    blockless_polls: u32,
    /// Polls that fail with a transport error first.
    failing_polls: u32,
    revert: bool,
    /// Accept the transaction but lose the node's answer.
    drop_send_answer: bool,
    receipt_polls: u32,
    calls: u32,
    sent: Vec<Bytes>,
}

/// In-memory chain with one ERC-20 token.
///
/// Accepts a transaction only when its nonce is the sender's next nonce,
/// like a node rejecting "nonce too low".
pub struct MockChain {
    chain_id: u64,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(chain_id: u64, decimals: u8) -> Self {
        Self {
            chain_id,
            state: Mutex::new(MockState {
                decimals,
                balance: U256::from(1_000_000_000_000u64),
                block_number: 100,
                ..Default::default()
            }),
        }
    }

    pub fn set_balance(&self, balance: U256) {
        self.state.lock().unwrap().balance = balance;
    }

    pub fn set_pending_polls(&self, polls: u32) {
        self.state.lock().unwrap().pending_polls = polls;
    }

    pub fn set_blockless_polls(&self, polls: u32) {
        self.state.lock().unwrap().blockless_polls = polls;
    }

    pub fn set_failing_polls(&self, polls: u32) {
        self.state.lock().unwrap().failing_polls = polls;
    }

    pub fn set_revert(&self, revert: bool) {
        self.state.lock().unwrap().revert = revert;
    }

    pub fn set_drop_send_answer(&self, drop: bool) {
        self.state.lock().unwrap().drop_send_answer = drop;
    }

    /// Register a receipt for a hash that was never sent through the mock.
    pub fn insert_receipt(&self, tx_hash: TxHash, empty_polls: u32) {
        let mut state = self.state.lock().unwrap();
        let receipt = TxReceipt {
            tx_hash,
            block_number: Some(state.block_number),
            status: true,
            gas_used: 21_000,
        };
        state.receipts.insert(tx_hash, (empty_polls, receipt));
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn receipt_polls(&self) -> u32 {
        self.state.lock().unwrap().receipt_polls
    }

    pub fn calls(&self) -> u32 {
        self.state.lock().unwrap().calls
    }
}

impl ChainClient for MockChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn get_transaction_count(&self, _address: Address) -> TransferResult<u64> {
        Ok(self.state.lock().unwrap().next_nonce)
    }

    async fn call(&self, to: Address, data: Bytes) -> TransferResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        assert_eq!(to, TOKEN, "call to unexpected contract");

        let word = match &data[..4] {
            s if s == DECIMALS_SELECTOR => U256::from(state.decimals),
            s if s == BALANCE_OF_SELECTOR => state.balance,
            other => {
                return Err(TransferError::Rpc {
                    method: "eth_call",
                    reason: format!("unknown selector {:?}", other),
                })
            }
        };
        Ok(Bytes::from(word.to_be_bytes::<32>().to_vec()))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> TransferResult<TxHash> {
        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| TransferError::Submission(e.to_string()))?;
        // A node on this chain refuses transactions signed for another one.
        if envelope.chain_id() != Some(self.chain_id) {
            return Err(TransferError::Submission("invalid chain id".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let nonce = envelope.nonce();
        if nonce < state.next_nonce {
            return Err(TransferError::Submission(format!(
                "nonce too low: next nonce {}, tx nonce {}",
                state.next_nonce, nonce
            )));
        }

        state.next_nonce = nonce + 1;
        state.block_number += 1;
        state.sent.push(Bytes::copy_from_slice(raw));

        let tx_hash = *envelope.tx_hash();
        let receipt = TxReceipt {
            tx_hash,
            block_number: Some(state.block_number),
            status: !state.revert,
            gas_used: 51_000,
        };
        let polls = state.pending_polls;
        state.receipts.insert(tx_hash, (polls, receipt));

        if state.drop_send_answer {
            return Err(TransferError::SubmissionUnknown {
                tx_hash,
                reason: "no answer within 10 seconds".to_string(),
            });
        }
        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> TransferResult<Option<TxReceipt>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;

        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(TransferError::Connection("connection reset".into()));
        }

        let blockless = if state.blockless_polls > 0 {
            state.blockless_polls -= 1;
            true
        } else {
            false
        };

        match state.receipts.get_mut(&tx_hash) {
            Some((remaining, _)) if *remaining > 0 => {
                *remaining -= 1;
                Ok(None)
            }
            Some((_, receipt)) if blockless => Ok(Some(TxReceipt {
                block_number: None,
                ..receipt.clone()
            })),
            Some((_, receipt)) => Ok(Some(receipt.clone())),
            None => Ok(None),
        }
    }
}
