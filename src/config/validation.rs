//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, gas limit covers a call)
//! - Reject destinations that would burn or strand funds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TransferConfig → Result<(), Vec<ValidationError>>
//! - Runs before any RPC connection is made

use alloy::primitives::Address;
use tracing_subscriber::EnvFilter;

use crate::config::schema::TransferConfig;

/// Minimum gas for any transaction.
const INTRINSIC_GAS: u64 = 21_000;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TransferConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.rpc.url.parse::<url::Url>() {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "rpc.url",
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("rpc.url", e.to_string())),
    }

    if config.rpc.chain_id == 0 {
        errors.push(ValidationError::new("rpc.chain_id", "must be non-zero"));
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be greater than 0"));
    }

    if config.token.address == Address::ZERO {
        errors.push(ValidationError::new("token.address", "must not be the zero address"));
    }

    let transfer = &config.transfer;
    if transfer.recipient == Address::ZERO {
        errors.push(ValidationError::new(
            "transfer.recipient",
            "must not be the zero address",
        ));
    }
    if transfer.recipient == config.token.address {
        errors.push(ValidationError::new(
            "transfer.recipient",
            "must not be the token contract itself",
        ));
    }
    if transfer.amount.is_zero() {
        errors.push(ValidationError::new("transfer.amount", "must be greater than 0"));
    }
    if transfer.gas_limit < INTRINSIC_GAS {
        errors.push(ValidationError::new(
            "transfer.gas_limit",
            format!("must be at least {}", INTRINSIC_GAS),
        ));
    }
    match transfer.gas_price_wei() {
        Ok(0) => errors.push(ValidationError::new(
            "transfer.gas_price_gwei",
            "must be greater than 0",
        )),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("transfer.gas_price_gwei", e.to_string())),
    }

    if config.signer.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new(
            "signer.private_key_env",
            "must name an environment variable",
        ));
    }

    let confirmation = &config.confirmation;
    if confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "confirmation.timeout_secs",
            "must be greater than 0",
        ));
    } else if confirmation.poll_interval_ms >= confirmation.timeout_secs.saturating_mul(1000) {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be shorter than confirmation.timeout_secs",
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        errors.push(ValidationError::new("observability.log_level", e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
