//! # tronpay-gateway
//!
//! HTTP implementation of [`tronpay_core::LedgerGateway`] for TronGrid and
//! other nodes exposing the same REST API.
//!
//! ## Modules
//!
//! - [`client`] - [`TronGridGateway`] and its builder
//! - [`wire`] - Request and response bodies
//!
//! ## Error mapping
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Request timed out | [`GatewayError::Timeout`] |
//! | Connection or I/O failure | [`GatewayError::Transport`] |
//! | Non-2xx status | [`GatewayError::Status`] with the body |
//! | Unparseable or incomplete body | [`GatewayError::MalformedResponse`] |
//! | Broadcast `result: false` | `Ok` with `success == false` |
//!
//! [`GatewayError::Timeout`]: tronpay_core::GatewayError::Timeout
//! [`GatewayError::Transport`]: tronpay_core::GatewayError::Transport
//! [`GatewayError::Status`]: tronpay_core::GatewayError::Status
//! [`GatewayError::MalformedResponse`]: tronpay_core::GatewayError::MalformedResponse

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod wire;

pub use client::{TronGridGateway, TronGridGatewayBuilder, DEFAULT_TIMEOUT, MAX_ERROR_BODY_CHARS};
