//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TransferConfig (validated, immutable)
//!     → passed by value into the transfer pipeline
//! ```
//!
//! # Design Decisions
//! - Config is an explicit value; nothing is read from globals
//! - Destination, amount, chain and gas fields have no defaults
//! - The private key is never part of the file, only the name of the
//!   environment variable that holds it
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ConfirmationConfig, ObservabilityConfig, RpcConfig, SignerConfig, TokenConfig,
    TransferConfig, TransferSettings,
};
