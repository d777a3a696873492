//! End-to-end transfer tests against an in-memory chain.

use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use usdt_transfer::blockchain::token::IERC20;
use usdt_transfer::blockchain::{build_transfer, HumanAmount, SenderKey, TransferError};
use usdt_transfer::{Shutdown, TransferPipeline};

mod common;

use common::{test_config, MockChain, OTHER_KEY, RECIPIENT, SENDER, SENDER_KEY, TOKEN};

fn key() -> SenderKey {
    SenderKey::from_hex(SENDER_KEY).unwrap()
}

fn sent_amount(raw: &[u8]) -> U256 {
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;

    let envelope = TxEnvelope::decode_2718(&mut &raw[..]).unwrap();
    IERC20::transferCall::abi_decode(envelope.input()).unwrap().value
}

#[tokio::test]
async fn test_ten_usdt_confirmed() {
    let chain = MockChain::new(9745, 6);
    chain.set_pending_polls(2);
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();

    let outcome = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap();

    assert_eq!(outcome.amount, U256::from(10_000_000u64));
    assert_eq!(outcome.decimals, 6);
    assert_eq!(outcome.sender, SENDER);
    assert_eq!(outcome.recipient, RECIPIENT);
    assert_eq!(outcome.token, TOKEN);
    assert_eq!(outcome.nonce, 0);
    assert_eq!(outcome.block_number, 101);

    let sent = pipeline.client().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent_amount(&sent[0]), U256::from(10_000_000u64));
    assert!(pipeline.client().receipt_polls() >= 3);
}

#[tokio::test]
async fn test_nonce_read_fresh_each_run() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), test_config("1"));
    let shutdown = Shutdown::new();

    let first = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap();
    let second = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap();

    assert_eq!(first.nonce, 0);
    assert_eq!(second.nonce, 1);
    assert_ne!(first.tx_hash, second.tx_hash);
}

#[tokio::test]
async fn test_decimals_read_on_every_prepare() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), test_config("1"));

    pipeline.prepare(SENDER).await.unwrap();
    let after_first = pipeline.client().calls();
    pipeline.prepare(SENDER).await.unwrap();

    // decimals + balanceOf per prepare
    assert_eq!(after_first, 2);
    assert_eq!(pipeline.client().calls(), 4);
}

#[tokio::test]
async fn test_same_nonce_second_submission_rejected() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), test_config("10"));
    let key = key();

    let first = pipeline.prepare(SENDER).await.unwrap();
    let five: HumanAmount = "5".parse().unwrap();
    let second = build_transfer(
        SENDER,
        RECIPIENT,
        TOKEN,
        &five,
        first.decimals,
        first.nonce,
        first.chain_id,
        first.gas_limit,
        first.gas_price,
    )
    .unwrap();

    let first_signed = pipeline.sign(&first, &key).unwrap();
    let second_signed = pipeline.sign(&second, &key).unwrap();
    assert_eq!(first_signed.nonce(), second_signed.nonce());

    pipeline.submit(&first_signed, SENDER).await.unwrap();
    let err = pipeline.submit(&second_signed, SENDER).await.unwrap_err();

    assert!(matches!(err, TransferError::Submission(_)), "{:?}", err);
    assert!(err.is_fresh_nonce_retryable());
    assert_eq!(pipeline.client().sent().len(), 1);
}

#[tokio::test]
async fn test_sub_unit_amount_is_precision_error() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 2), test_config("0.0000001"));
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    assert!(matches!(err, TransferError::Precision(_)), "{:?}", err);
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_insufficient_balance_stops_before_signing() {
    let chain = MockChain::new(9745, 6);
    chain.set_balance(U256::from(9_999_999u64));
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    match err {
        TransferError::InsufficientBalance {
            required,
            available,
        } => {
            assert_eq!(required, U256::from(10_000_000u64));
            assert_eq!(available, U256::from(9_999_999u64));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_balance_check_can_be_disabled() {
    let chain = MockChain::new(9745, 6);
    chain.set_balance(U256::ZERO);
    let mut config = test_config("10");
    config.transfer.check_balance = false;
    let pipeline = TransferPipeline::new(chain, config);

    let unsigned = pipeline.prepare(SENDER).await.unwrap();

    assert_eq!(unsigned.amount, U256::from(10_000_000u64));
    assert_eq!(pipeline.client().calls(), 1);
}

#[tokio::test]
async fn test_reverted_receipt_is_failure() {
    let chain = MockChain::new(9745, 6);
    chain.set_revert(true);
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    assert!(
        matches!(err, TransferError::Reverted { block_number: 101, .. }),
        "{:?}",
        err
    );
    assert!(!err.is_indeterminate());
}

#[tokio::test]
async fn test_signed_for_other_chain_is_not_broadcast() {
    // Config says 9745, the client is connected to chain 1.
    let pipeline = TransferPipeline::new(MockChain::new(1, 6), test_config("10"));
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    assert!(
        matches!(
            err,
            TransferError::ChainMismatch {
                expected: 1,
                actual: 9745
            }
        ),
        "{:?}",
        err
    );
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_confirmation_timeout_is_indeterminate() {
    let chain = MockChain::new(9745, 6);
    chain.set_pending_polls(u32::MAX);
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    assert!(
        matches!(err, TransferError::ConfirmationTimeout { .. }),
        "{:?}",
        err
    );
    assert!(err.is_indeterminate());
    assert_eq!(pipeline.client().sent().len(), 1);
}

#[tokio::test]
async fn test_shutdown_before_submission_sends_nothing() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), test_config("10"));
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    shutdown.trigger();

    let err = pipeline.execute(&key(), receiver).await.unwrap_err();

    assert!(matches!(err, TransferError::Interrupted), "{:?}", err);
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_invalid_key_is_signing_error() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), test_config("10"));
    let shutdown = Shutdown::new();
    let zero_key = SenderKey::from_hex(&"00".repeat(32)).unwrap();

    let err = pipeline.execute(&zero_key, shutdown.subscribe()).await.unwrap_err();

    assert!(matches!(err, TransferError::Signing(_)), "{:?}", err);
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_transfer_signed_by_other_key_is_not_broadcast() {
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), test_config("10"));
    let other = SenderKey::from_hex(OTHER_KEY).unwrap();

    let unsigned = pipeline.prepare(RECIPIENT).await.unwrap();
    let signed = pipeline.sign(&unsigned, &other).unwrap();
    let err = pipeline.submit(&signed, SENDER).await.unwrap_err();

    assert!(matches!(err, TransferError::Signing(_)), "{:?}", err);
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_lost_broadcast_answer_is_indeterminate() {
    let chain = MockChain::new(9745, 6);
    chain.set_drop_send_answer(true);
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    assert!(
        matches!(err, TransferError::SubmissionUnknown { .. }),
        "{:?}",
        err
    );
    assert!(err.is_indeterminate());
    assert!(!err.is_fresh_nonce_retryable());
    assert_eq!(pipeline.client().sent().len(), 1);
}

#[tokio::test]
async fn test_config_built_in_code_is_validated() {
    let mut config = test_config("10");
    config.confirmation.poll_interval_ms = 0;
    let pipeline = TransferPipeline::new(MockChain::new(9745, 6), config);
    let shutdown = Shutdown::new();

    let err = pipeline.execute(&key(), shutdown.subscribe()).await.unwrap_err();

    assert!(matches!(err, TransferError::Config(_)), "{:?}", err);
    assert!(err.to_string().contains("confirmation.poll_interval_ms"));
    assert!(pipeline.client().sent().is_empty());
}

#[tokio::test]
async fn test_hash_reported_before_confirmation() {
    let chain = MockChain::new(9745, 6);
    chain.set_pending_polls(3);
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();
    let mut reported = None;

    let outcome = pipeline
        .execute_with(&key(), shutdown.subscribe(), |tx_hash| {
            reported = Some(tx_hash);
        })
        .await
        .unwrap();

    assert_eq!(reported, Some(outcome.tx_hash));
}

#[tokio::test]
async fn test_hash_not_reported_when_nothing_sent() {
    let chain = MockChain::new(9745, 6);
    chain.set_balance(U256::ZERO);
    let pipeline = TransferPipeline::new(chain, test_config("10"));
    let shutdown = Shutdown::new();
    let mut reported = false;

    let result = pipeline
        .execute_with(&key(), shutdown.subscribe(), |_| reported = true)
        .await;

    assert!(result.is_err());
    assert!(!reported);
}
