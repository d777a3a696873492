//! Sender key handling and transaction signing.
//!
//! # Security
//! - The key is read from an environment variable, never from the config file
//! - Key bytes are zeroized on drop and never logged or serialized
//! - A signer object exists only inside [`SenderKey::with_signer`]

use alloy::consensus::{SignableTransaction, Transaction, TxEnvelope};
use alloy::eips::eip2718::{Decodable2718, Encodable2718};
use alloy::network::TxSignerSync;
use alloy::primitives::{hex, Address, Bytes, TxHash};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use zeroize::Zeroizing;

use crate::blockchain::transaction::UnsignedTransfer;
use crate::blockchain::types::{TransferError, TransferResult};

/// Default environment variable holding the sender's private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "TRANSFER_SENDER_PRIVATE_KEY";

/// Sender private key with scoped access.
pub struct SenderKey {
    bytes: Zeroizing<[u8; 32]>,
}

impl SenderKey {
    /// Parse a hex-encoded key (with or without 0x prefix).
    ///
    /// Only the format is checked here; whether the scalar is a valid
    /// secp256k1 key surfaces on first use.
    pub fn from_hex(private_key_hex: &str) -> TransferResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if key_hex.len() != 64 {
            return Err(TransferError::Signing(format!(
                "Invalid private key format: expected 64 hex characters, got {}",
                key_hex.len()
            )));
        }

        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(key_hex, bytes.as_mut_slice()).map_err(|e| {
            TransferError::Signing(format!("Invalid private key format: {}", e))
        })?;

        Ok(Self { bytes })
    }

    /// Load the key from the named environment variable.
    pub fn from_env(var: &str) -> TransferResult<Self> {
        let value = Zeroizing::new(std::env::var(var).map_err(|_| {
            TransferError::Config(format!("Environment variable {} not set", var))
        })?);

        Self::from_hex(&value)
    }

    /// Run `f` with a signer bound to `chain_id`. The signer is dropped,
    /// and its key material wiped, when `f` returns.
    pub fn with_signer<T>(
        &self,
        chain_id: u64,
        f: impl FnOnce(&PrivateKeySigner) -> TransferResult<T>,
    ) -> TransferResult<T> {
        let mut signer = PrivateKeySigner::from_slice(self.bytes.as_slice())
            .map_err(|e| TransferError::Signing(format!("Invalid private key: {}", e)))?;
        signer.set_chain_id(Some(chain_id));
        f(&signer)
    }

    /// Address controlled by this key.
    pub fn address(&self) -> TransferResult<Address> {
        let signer = PrivateKeySigner::from_slice(self.bytes.as_slice())
            .map_err(|e| TransferError::Signing(format!("Invalid private key: {}", e)))?;
        Ok(signer.address())
    }
}

impl std::fmt::Debug for SenderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SenderKey(<redacted>)")
    }
}

/// Signed, EIP-2718 encoded transaction. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    raw: Bytes,
    tx_hash: TxHash,
    nonce: u64,
    chain_id: u64,
}

impl SignedTransfer {
    /// Bytes for `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Sign `transfer` with `key`.
///
/// The signer carries the transfer's chain ID, and alloy refuses to sign a
/// transaction whose EIP-155 chain ID differs from the signer's.
pub fn sign_transfer(transfer: &UnsignedTransfer, key: &SenderKey) -> TransferResult<SignedTransfer> {
    let mut tx = transfer.to_legacy_tx();

    let signature = key.with_signer(transfer.chain_id, |signer| {
        if signer.address() != transfer.sender {
            return Err(TransferError::Signing(format!(
                "key controls {} but the transfer was built for sender {}",
                signer.address(),
                transfer.sender
            )));
        }
        signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| TransferError::Signing(format!("Signing failed: {}", e)))
    })?;

    let signed = tx.into_signed(signature);
    let tx_hash = *signed.hash();
    let envelope = TxEnvelope::Legacy(signed);

    Ok(SignedTransfer {
        raw: Bytes::from(envelope.encoded_2718()),
        tx_hash,
        nonce: transfer.nonce,
        chain_id: transfer.chain_id,
    })
}

/// Decode `raw` and check it targets `expected_chain_id` and was signed by
/// `expected_sender`.
///
/// Returns the recovered sender address.
pub fn verify_signed(
    raw: &[u8],
    expected_chain_id: u64,
    expected_sender: Address,
) -> TransferResult<Address> {
    let envelope = TxEnvelope::decode_2718(&mut &raw[..])
        .map_err(|e| TransferError::Encoding(format!("undecodable signed transaction: {}", e)))?;

    let actual = envelope.chain_id().ok_or_else(|| {
        TransferError::Signing("transaction carries no chain ID (pre-EIP-155)".to_string())
    })?;
    if actual != expected_chain_id {
        return Err(TransferError::ChainMismatch {
            expected: expected_chain_id,
            actual,
        });
    }

    let recovered = match &envelope {
        TxEnvelope::Legacy(signed) => signed
            .signature()
            .recover_address_from_prehash(&signed.signature_hash()),
        other => {
            return Err(TransferError::Encoding(format!(
                "unexpected transaction type {:?}",
                other.tx_type()
            )))
        }
    };

    let recovered = recovered
        .map_err(|e| TransferError::Signing(format!("signature recovery failed: {}", e)))?;
    if recovered != expected_sender {
        return Err(TransferError::Signing(format!(
            "transaction signed by {} but the sender is {}",
            recovered, expected_sender
        )));
    }

    Ok(recovered)
}
