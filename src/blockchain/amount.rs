//! Exact decimal token amounts.
//!
//! Amounts arrive as human-readable text ("10", "12.5") and are converted to
//! the token's smallest unit using the on-chain `decimals`. The conversion
//! is integer-only: excess fractional digits are rejected, never truncated.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::blockchain::types::{TransferError, TransferResult};

/// Rejected amount text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid amount '{input}': {reason}")]
pub struct InvalidAmount {
    input: String,
    reason: &'static str,
}

/// Non-negative decimal quantity in whole-token units.
///
/// Stored normalized: no leading zeros in the integer part, no trailing
/// zeros in the fractional part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HumanAmount {
    integer: String,
    fraction: String,
}

impl HumanAmount {
    /// Convert to smallest units: `self * 10^decimals`.
    ///
    /// Fails with `Precision` when the product is not an integer and with
    /// `Encoding` when it does not fit in 256 bits.
    pub fn to_base_units(&self, decimals: u8) -> TransferResult<U256> {
        let decimals = usize::from(decimals);
        if self.fraction.len() > decimals {
            return Err(TransferError::Precision(format!(
                "{} has {} fractional digits but the token supports {}",
                self,
                self.fraction.len(),
                decimals
            )));
        }

        let padding = decimals - self.fraction.len();
        let mut digits = String::with_capacity(self.integer.len() + decimals);
        digits.push_str(&self.integer);
        digits.push_str(&self.fraction);
        digits.extend(std::iter::repeat('0').take(padding));

        U256::from_str_radix(&digits, 10).map_err(|e| {
            TransferError::Encoding(format!(
                "{} with {} decimals exceeds uint256: {}",
                self, decimals, e
            ))
        })
    }

    /// True for any representation of zero ("0", "0.000").
    pub fn is_zero(&self) -> bool {
        self.integer == "0" && self.fraction.is_empty()
    }

    /// Number of significant fractional digits.
    pub fn scale(&self) -> usize {
        self.fraction.len()
    }
}

impl FromStr for HumanAmount {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| InvalidAmount {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }

        let (integer, fraction) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        if integer.is_empty() {
            return Err(invalid("missing integer part"));
        }
        if trimmed.contains('.') && fraction.is_empty() {
            return Err(invalid("missing fractional digits after '.'"));
        }
        if !integer.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("only decimal digits and a single '.' are allowed"));
        }

        let integer = integer.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');

        Ok(Self {
            integer: if integer.is_empty() {
                "0".to_string()
            } else {
                integer.to_string()
            },
            fraction: fraction.to_string(),
        })
    }
}

impl TryFrom<String> for HumanAmount {
    type Error = InvalidAmount;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HumanAmount> for String {
    fn from(amount: HumanAmount) -> Self {
        amount.to_string()
    }
}

impl fmt::Display for HumanAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction.is_empty() {
            write!(f, "{}", self.integer)
        } else {
            write!(f, "{}.{}", self.integer, self.fraction)
        }
    }
}
