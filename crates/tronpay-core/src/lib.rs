//! # tronpay-core
//!
//! Core types, traits, and error definitions shared by the tronpay crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types, [`ErrorKind`], and result aliases
//! - [`types`] - Accounts, transactions, transfer state, and amount helpers
//! - [`gateway`] - The [`LedgerGateway`] trait
//! - [`config`] - Configuration types
//! - [`config_loader`] - Loading configuration from `~/.tronpay`
//!
//! ## Example
//!
//! ```rust
//! use tronpay_core::{ErrorKind, TransferError, TransferRequest};
//!
//! let request = TransferRequest::from_trx("TFrom", "TTo", 1.5).expect("valid amount");
//! assert_eq!(request.amount, 1_500_000);
//!
//! let err = TransferError::invalid_input("amount must be positive");
//! assert_eq!(err.kind(), ErrorKind::InvalidInput);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod config_loader;
pub mod error;
pub mod gateway;
pub mod types;

pub use error::{
    AddressError, ConfigError, ErrorKind, GatewayError, Result, SignError, TransferError,
    TronpayError,
};

pub use config::{Config, ConfigBuilder, GatewayConfig, LoggingConfig, Network, TransferConfig};

pub use config_loader::{expand_path, load_config, ConfigLoader};

pub use gateway::LedgerGateway;

pub use types::{
    format_sun, parse_trx, trx_to_sun, Account, BroadcastOutcome, SignedTransaction,
    TransferReceipt, TransferRequest, TransferResult, TransferState, UnsignedTransaction,
    SUN_PER_TRX,
};
