//! # tronpay
//!
//! TRON wallet core: key generation and import, signing, and the
//! create/sign/broadcast transfer pipeline.
//!
//! ## Crates
//!
//! - [`tronpay_core`] - Shared types, errors, configuration, and the
//!   [`LedgerGateway`](tronpay_core::LedgerGateway) trait
//! - [`tronpay_crypto`] - Keys, addresses, and ECDSA signatures
//! - [`tronpay_gateway`] - TronGrid HTTP adapter
//!
//! ## Modules
//!
//! - [`wallet`] - Create and import wallets
//! - [`transfer`] - [`TransferOrchestrator`]
//! - [`logging`] - Tracing subscriber setup, redaction, correlation ids
//!
//! ## Usage
//!
//! ```no_run
//! use tronpay::{init_logging, LogConfig, TransferOrchestrator};
//! use tronpay_core::config_loader::load_config;
//! use tronpay_core::TransferRequest;
//! use tronpay_crypto::keys::HexKeySource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let _guard = init_logging(&LogConfig::from_config(&config.logging)?)?;
//!
//! let orchestrator = TransferOrchestrator::from_config(&config)?;
//! let key = HexKeySource::new(std::env::var("TRON_PRIVATE_KEY")?);
//! let request = TransferRequest::new(
//!     "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC",
//!     "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL",
//!     1_000_000,
//! );
//! let result = orchestrator.send(&request, &key).await;
//! println!("{result:?}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod logging;
pub mod transfer;
pub mod wallet;

pub use logging::{
    init_logging, log_security_event, new_correlation_id, redact_sensitive, LogConfig, LogError,
    LogFormat, LogGuard, LogLevel,
};
pub use transfer::{TransferOrchestrator, TransferSettings};
pub use wallet::{create_wallet, import_from_source, import_wallet, Wallet};

pub use tronpay_core;
pub use tronpay_crypto;
pub use tronpay_gateway;
