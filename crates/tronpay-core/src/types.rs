//! Core data types for tronpay.
//!
//! This module provides the value types passed between the transfer
//! orchestrator and the ledger gateway:
//!
//! - [`Account`] - Balance snapshot for an address
//! - [`TransferRequest`] - Who pays whom, and how much
//! - [`UnsignedTransaction`] / [`SignedTransaction`] - Gateway transaction payloads
//! - [`BroadcastOutcome`] - What the network said about a broadcast
//! - [`TransferState`] - Pipeline stages
//! - [`TransferReceipt`] / [`TransferResult`] - Terminal values of a transfer
//!
//! Amounts are always carried as `u64` sun (1 TRX = 1 000 000 sun). The
//! conversion helpers [`trx_to_sun`], [`parse_trx`] and [`format_sun`] truncate
//! rather than round.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, TransferError};

/// Number of sun in one TRX.
pub const SUN_PER_TRX: u64 = 1_000_000;

/// Number of fractional digits in a TRX amount.
pub const TRX_DECIMALS: usize = 6;

// ============================================================================
// Amount conversion
// ============================================================================

/// Convert a TRX amount to sun, truncating below one sun.
///
/// The value is converted through its shortest decimal representation, so
/// `0.000001` is exactly one sun and `1.0000009` is `1_000_000`.
///
/// # Errors
///
/// Returns [`TransferError::InvalidInput`] for negative, NaN, infinite, or
/// out-of-range amounts.
///
/// # Example
///
/// ```rust
/// use tronpay_core::types::trx_to_sun;
///
/// assert_eq!(trx_to_sun(1.0000009).unwrap(), 1_000_000);
/// assert_eq!(trx_to_sun(12.5).unwrap(), 12_500_000);
/// assert!(trx_to_sun(-1.0).is_err());
/// ```
pub fn trx_to_sun(trx: f64) -> Result<u64, TransferError> {
    if !trx.is_finite() {
        return Err(TransferError::invalid_input(format!(
            "amount must be a finite number, got {trx}"
        )));
    }
    if trx < 0.0 {
        return Err(TransferError::invalid_input(format!(
            "amount must not be negative, got {trx}"
        )));
    }
    parse_trx(&trx.abs().to_string())
}

/// Parse a decimal TRX string into sun, truncating past six fractional digits.
///
/// # Errors
///
/// Returns [`TransferError::InvalidInput`] if the string is not a plain
/// non-negative decimal number or does not fit in a `u64` of sun.
///
/// # Example
///
/// ```rust
/// use tronpay_core::types::parse_trx;
///
/// assert_eq!(parse_trx("2").unwrap(), 2_000_000);
/// assert_eq!(parse_trx("0.1234567").unwrap(), 123_456);
/// assert!(parse_trx("1,5").is_err());
/// ```
pub fn parse_trx(amount: &str) -> Result<u64, TransferError> {
    let amount = amount.trim();
    let invalid = || TransferError::invalid_input(format!("invalid TRX amount: {amount:?}"));

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let fraction_sun = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(TRX_DECIMALS)
        .fold(0u64, |acc, digit| acc * 10 + u64::from(digit - b'0'));

    whole
        .checked_mul(SUN_PER_TRX)
        .and_then(|sun| sun.checked_add(fraction_sun))
        .ok_or_else(invalid)
}

/// Render sun as a TRX decimal string with six fractional digits.
///
/// ```rust
/// use tronpay_core::types::format_sun;
///
/// assert_eq!(format_sun(1_500_000), "1.500000");
/// assert_eq!(format_sun(7), "0.000007");
/// ```
#[must_use]
pub fn format_sun(sun: u64) -> String {
    format!("{}.{:06}", sun / SUN_PER_TRX, sun % SUN_PER_TRX)
}

// ============================================================================
// Account
// ============================================================================

/// Balance snapshot for an address.
///
/// An address the ledger has never seen has a balance of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Base-58 address.
    pub address: String,
    /// Balance in sun.
    pub balance: u64,
}

impl Account {
    /// An account with no funds.
    #[must_use]
    pub fn empty(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance: 0,
        }
    }
}

// ============================================================================
// TransferRequest
// ============================================================================

/// A native TRX transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Sender's base-58 address.
    pub from: String,
    /// Recipient's base-58 address.
    pub to: String,
    /// Amount in sun.
    pub amount: u64,
}

impl TransferRequest {
    /// Create a request for an amount already expressed in sun.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Create a request from a TRX amount, truncating to whole sun.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidInput`] if the amount cannot be converted.
    pub fn from_trx(
        from: impl Into<String>,
        to: impl Into<String>,
        trx: f64,
    ) -> Result<Self, TransferError> {
        Ok(Self::new(from, to, trx_to_sun(trx)?))
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// A transaction built by the gateway, not yet signed.
///
/// Only `txID` is interpreted. Every other field is echoed back to the
/// gateway unchanged on broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Hex-encoded 32-byte transaction id; this is the digest that gets signed.
    #[serde(rename = "txID")]
    pub tx_id: String,
    /// Structured transaction body.
    #[serde(default)]
    pub raw_data: Value,
    /// Protobuf-serialized transaction body, hex-encoded.
    #[serde(default)]
    pub raw_data_hex: String,
    /// Any other fields the gateway returned, such as `visible`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UnsignedTransaction {
    /// Decode `txID` into raw digest bytes.
    ///
    /// The length is not checked here; the signer rejects anything but 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `txID` is not valid hex.
    pub fn digest_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.tx_id)
    }

    /// Attach a hex signature, consuming the unsigned transaction.
    #[must_use]
    pub fn attach_signature(mut self, signature_hex: String) -> SignedTransaction {
        self.extra.remove("signature");
        SignedTransaction {
            transaction: self,
            signature: vec![signature_hex],
        }
    }
}

/// A transaction ready to broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The transaction as built by the gateway.
    #[serde(flatten)]
    pub transaction: UnsignedTransaction,
    /// Hex signatures, `r || s || v`.
    pub signature: Vec<String>,
}

impl SignedTransaction {
    /// The transaction id.
    #[must_use]
    pub fn tx_id(&self) -> &str {
        &self.transaction.tx_id
    }
}

/// The network's answer to a broadcast.
///
/// `success == false` is a business rejection, not a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    /// Whether the node accepted the transaction.
    pub success: bool,
    /// Transaction id echoed by the node.
    pub tx_id: Option<String>,
    /// Rejection code, e.g. `SIGERROR`.
    pub code: Option<String>,
    /// Rejection message as sent by the node.
    pub message: Option<String>,
}

impl BroadcastOutcome {
    /// An accepted broadcast.
    #[must_use]
    pub fn accepted(tx_id: impl Into<String>) -> Self {
        Self {
            success: true,
            tx_id: Some(tx_id.into()),
            code: None,
            message: None,
        }
    }

    /// A rejected broadcast.
    #[must_use]
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_id: None,
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Transfer state and results
// ============================================================================

/// Stages of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferState {
    /// Not started.
    Idle,
    /// Checking the amount and recipient.
    ValidatingInput,
    /// Fetching the sender's balance.
    CheckingBalance,
    /// Asking the gateway to build the transaction.
    CreatingTx,
    /// Signing the transaction id.
    Signing,
    /// Submitting the signed transaction.
    Broadcasting,
    /// The network accepted the transaction.
    Succeeded,
    /// The transfer ended in an error.
    Failed,
}

impl TransferState {
    /// Returns true for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Get the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ValidatingInput => "ValidatingInput",
            Self::CheckingBalance => "CheckingBalance",
            Self::CreatingTx => "CreatingTx",
            Self::Signing => "Signing",
            Self::Broadcasting => "Broadcasting",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof of an accepted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Transaction id.
    pub tx_id: String,
    /// Block explorer link for the transaction.
    pub explorer_url: String,
}

/// Flattened outcome of a transfer, for handing across an app boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    /// Whether the network accepted the transaction.
    pub success: bool,
    /// Transaction id, when one was accepted.
    pub tx_id: Option<String>,
    /// Block explorer link, when a transaction was accepted.
    pub explorer_url: Option<String>,
    /// Failure category.
    pub error_kind: Option<ErrorKind>,
    /// User-facing failure message.
    pub message: Option<String>,
}

impl From<TransferReceipt> for TransferResult {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            success: true,
            tx_id: Some(receipt.tx_id),
            explorer_url: Some(receipt.explorer_url),
            error_kind: None,
            message: None,
        }
    }
}

impl From<&TransferError> for TransferResult {
    fn from(error: &TransferError) -> Self {
        Self {
            success: false,
            tx_id: None,
            explorer_url: None,
            error_kind: Some(error.kind()),
            message: Some(error.user_message()),
        }
    }
}

impl From<Result<TransferReceipt, TransferError>> for TransferResult {
    fn from(result: Result<TransferReceipt, TransferError>) -> Self {
        match result {
            Ok(receipt) => receipt.into(),
            Err(error) => Self::from(&error),
        }
    }
}
