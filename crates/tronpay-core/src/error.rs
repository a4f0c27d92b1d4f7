//! Error types for the tronpay wallet core.
//!
//! Errors are organized by domain:
//!
//! - [`SignError`] - Key material and signing failures
//! - [`AddressError`] - Address decoding failures
//! - [`GatewayError`] - Ledger gateway transport and response failures
//! - [`TransferError`] - Transfer pipeline failures, as seen by callers
//! - [`ConfigError`] - Configuration failures
//! - [`TronpayError`] - Top-level error that wraps all error types
//!
//! Every failure maps onto a stable [`ErrorKind`] for callers that only
//! need to branch on the category.
//!
//! # Example
//!
//! ```rust
//! use tronpay_core::error::{ErrorKind, SignError, TronpayError};
//!
//! let err: TronpayError = SignError::InvalidDigestLength { actual: 31 }.into();
//! assert_eq!(ErrorKind::from(&err), ErrorKind::InvalidDigestLength);
//! ```

use std::fmt;

use crate::types::{format_sun, TransferState};

/// Top-level error type for tronpay.
#[derive(Debug, thiserror::Error)]
pub enum TronpayError {
    /// Key material or signing failed.
    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    /// Address decoding failed.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Ledger gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Transfer pipeline failed.
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ============================================================================
// ErrorKind
// ============================================================================

/// Stable category of a failure, surfaced in [`TransferResult`](crate::types::TransferResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Caller input was rejected before any network call.
    InvalidInput,
    /// The sender cannot cover the requested amount.
    InsufficientBalance,
    /// The OS random number generator failed.
    EntropyError,
    /// A private key was malformed or outside the curve order.
    InvalidPrivateKey,
    /// A digest handed to the signer was not 32 bytes.
    InvalidDigestLength,
    /// The gateway was unreachable, timed out, or answered with an error status.
    GatewayError,
    /// The network refused a well-formed transaction.
    TransactionRejected,
    /// Signing the transaction failed.
    SigningError,
    /// The caller cancelled the transfer between steps.
    Cancelled,
}

impl ErrorKind {
    /// Get the stable identifier for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::EntropyError => "EntropyError",
            Self::InvalidPrivateKey => "InvalidPrivateKey",
            Self::InvalidDigestLength => "InvalidDigestLength",
            Self::GatewayError => "GatewayError",
            Self::TransactionRejected => "TransactionRejected",
            Self::SigningError => "SigningError",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&SignError> for ErrorKind {
    fn from(error: &SignError) -> Self {
        match error {
            SignError::InvalidPrivateKey { .. } => Self::InvalidPrivateKey,
            SignError::InvalidDigestLength { .. } => Self::InvalidDigestLength,
            SignError::Entropy { .. } => Self::EntropyError,
            SignError::SignatureFailed { .. } => Self::SigningError,
        }
    }
}

impl From<&TronpayError> for ErrorKind {
    fn from(error: &TronpayError) -> Self {
        match error {
            TronpayError::Sign(e) => Self::from(e),
            TronpayError::Address(_) | TronpayError::Config(_) => Self::InvalidInput,
            TronpayError::Gateway(_) => Self::GatewayError,
            TronpayError::Transfer(e) => e.kind(),
        }
    }
}

impl From<TronpayError> for ErrorKind {
    fn from(error: TronpayError) -> Self {
        Self::from(&error)
    }
}

// ============================================================================
// SignError
// ============================================================================

/// Errors from key material handling and ECDSA signing.
///
/// Reasons never contain key material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    /// The private key is not 64 hex characters or is not a valid scalar.
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// The digest handed to the signer was not 32 bytes.
    #[error("invalid digest length: expected 32 bytes, got {actual}")]
    InvalidDigestLength {
        /// The length that was supplied.
        actual: usize,
    },

    /// The OS random number generator failed.
    #[error("entropy source failed: {context}")]
    Entropy {
        /// Details from the RNG.
        context: String,
    },

    /// The signing primitive itself failed.
    #[error("signature failed: {context}")]
    SignatureFailed {
        /// What went wrong.
        context: String,
    },
}

impl SignError {
    /// Create an invalid private key error.
    #[must_use]
    pub fn invalid_private_key(reason: impl Into<String>) -> Self {
        Self::InvalidPrivateKey {
            reason: reason.into(),
        }
    }

    /// Create an entropy error.
    #[must_use]
    pub fn entropy(context: impl Into<String>) -> Self {
        Self::Entropy {
            context: context.into(),
        }
    }

    /// Create a signature failed error.
    #[must_use]
    pub fn signature_failed(context: impl Into<String>) -> Self {
        Self::SignatureFailed {
            context: context.into(),
        }
    }
}

// ============================================================================
// AddressError
// ============================================================================

/// Errors from decoding a TRON address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The address has the wrong number of characters or bytes.
    #[error("invalid address length: {actual}")]
    InvalidLength {
        /// The length that was found.
        actual: usize,
    },

    /// The address contains a character outside the base-58 alphabet.
    #[error("invalid base58 character: {character:?}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
    },

    /// The decoded payload does not start with the TRON network prefix.
    #[error("invalid address prefix: 0x{prefix:02x}")]
    InvalidPrefix {
        /// The prefix byte that was found.
        prefix: u8,
    },

    /// The trailing four bytes do not match the double SHA-256 checksum.
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// A hex-form address could not be decoded.
    #[error("invalid hex address: {context}")]
    InvalidHex {
        /// Details from the decoder.
        context: String,
    },
}

impl AddressError {
    /// Create an invalid hex error.
    #[must_use]
    pub fn invalid_hex(context: impl Into<String>) -> Self {
        Self::InvalidHex {
            context: context.into(),
        }
    }
}

// ============================================================================
// GatewayError
// ============================================================================

/// Errors from talking to the ledger gateway.
///
/// A gateway that answers with a well-formed rejection is not an error here;
/// see [`BroadcastOutcome`](crate::types::BroadcastOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("{operation}: transport failure: {context}")]
    Transport {
        /// Gateway operation name.
        operation: String,
        /// Details from the HTTP client.
        context: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("{operation}: timed out after {after_secs}s")]
    Timeout {
        /// Gateway operation name.
        operation: String,
        /// The timeout that elapsed.
        after_secs: u64,
    },

    /// The gateway answered with a non-success status.
    #[error("{operation}: gateway returned status {status}: {body}")]
    Status {
        /// Gateway operation name.
        operation: String,
        /// The HTTP status code.
        status: u16,
        /// The (possibly truncated) response body.
        body: String,
    },

    /// The response could not be interpreted.
    #[error("{operation}: malformed response: {context}")]
    MalformedResponse {
        /// Gateway operation name.
        operation: String,
        /// What was wrong with it.
        context: String,
    },
}

impl GatewayError {
    /// Create a transport error.
    #[must_use]
    pub fn transport(operation: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            context: context.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>, after_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after_secs,
        }
    }

    /// Create a status error.
    #[must_use]
    pub fn status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error.
    #[must_use]
    pub fn malformed(operation: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation: operation.into(),
            context: context.into(),
        }
    }

    /// The upstream HTTP status, if the gateway answered at all.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// TransferError
// ============================================================================

/// Gateway code reported when a signature does not match the owner address.
pub const SIGERROR_CODE: &str = "SIGERROR";

/// Failures of the create, sign, and broadcast pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The request was rejected before any network call.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Why the request was rejected.
        reason: String,
    },

    /// The sender's balance is below the requested amount (both in sun).
    #[error("insufficient balance: available {available} sun, requested {requested} sun")]
    InsufficientBalance {
        /// Balance reported by the gateway.
        available: u64,
        /// Amount the caller asked to send.
        requested: u64,
    },

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Signing failed.
    #[error(transparent)]
    Signing(#[from] SignError),

    /// The network refused the signed transaction.
    #[error("transaction rejected: {code}: {message}")]
    TransactionRejected {
        /// Gateway result code, e.g. `SIGERROR`.
        code: String,
        /// Gateway message, verbatim.
        message: String,
    },

    /// The caller cancelled the transfer.
    #[error("transfer cancelled before {stage}")]
    Cancelled {
        /// The stage that was about to start.
        stage: TransferState,
    },
}

impl TransferError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a transaction rejected error.
    #[must_use]
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransactionRejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Classify this failure.
    ///
    /// Key and digest problems surfacing during a transfer are reported as
    /// [`ErrorKind::SigningError`]; the finer kinds apply to direct calls.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::Gateway(_) => ErrorKind::GatewayError,
            Self::Signing(_) => ErrorKind::SigningError,
            Self::TransactionRejected { .. } => ErrorKind::TransactionRejected,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Returns true if the network reported a signature/owner mismatch.
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::TransactionRejected { code, .. } if code == SIGERROR_CODE)
    }

    /// Message suitable for showing to the end user.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tronpay_core::error::TransferError;
    ///
    /// let err = TransferError::InsufficientBalance { available: 500_000, requested: 2_000_000 };
    /// assert_eq!(
    ///     err.user_message(),
    ///     "Insufficient balance: available 0.500000 TRX, requested 2.000000 TRX"
    /// );
    /// ```
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { reason } => format!("Invalid input: {reason}"),
            Self::InsufficientBalance {
                available,
                requested,
            } => format!(
                "Insufficient balance: available {} TRX, requested {} TRX",
                format_sun(*available),
                format_sun(*requested)
            ),
            Self::Gateway(e) => format!("Could not reach the TRON network: {e}"),
            Self::Signing(e) => format!("Could not sign the transaction: {e}"),
            Self::TransactionRejected { code, .. } if code == SIGERROR_CODE => {
                "The network rejected the signature: the private key does not belong to the \
                 sending address"
                    .to_string()
            }
            Self::TransactionRejected { code, message } => format!(
                "Transaction rejected by the network ({code}): {}",
                decode_node_message(message)
            ),
            Self::Cancelled { stage } => format!("Transfer cancelled before {stage}"),
        }
    }
}

/// Decode a node message that may be hex-encoded UTF-8.
///
/// TRON nodes hex-encode the `message` field of broadcast results. Anything
/// that is not valid hex of valid UTF-8 is returned unchanged.
///
/// ```rust
/// use tronpay_core::error::decode_node_message;
///
/// assert_eq!(decode_node_message("6f7574206f6620656e65726779"), "out of energy");
/// assert_eq!(decode_node_message("already plain"), "already plain");
/// ```
#[must_use]
pub fn decode_node_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .filter(|decoded| !decoded.is_empty() && !decoded.chars().any(char::is_control))
        .unwrap_or_else(|| message.to_string())
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path that was looked up.
        path: String,
    },

    /// The configuration could not be parsed or serialized.
    #[error("failed to parse configuration: {context}")]
    ParseFailed {
        /// Details from the parser.
        context: String,
    },

    /// A field holds an unacceptable value.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Dotted field path, e.g. `gateway.timeout_secs`.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// A required field is absent.
    #[error("missing required field: {field}")]
    MissingField {
        /// Dotted field path.
        field: String,
    },

    /// Reading or writing a configuration file failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

impl ConfigError {
    /// Create a file not found error.
    #[must_use]
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a parse failed error.
    #[must_use]
    pub fn parse_failed(context: impl Into<String>) -> Self {
        Self::ParseFailed {
            context: context.into(),
        }
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a no home directory error.
    #[must_use]
    pub const fn no_home_directory() -> Self {
        Self::NoHomeDirectory
    }
}

// ============================================================================
// Result aliases
// ============================================================================

/// Result type using [`TronpayError`].
pub type Result<T> = std::result::Result<T, TronpayError>;

/// Result type for signing operations.
pub type SignResult<T> = std::result::Result<T, SignError>;

/// Result type for address operations.
pub type AddressResult<T> = std::result::Result<T, AddressError>;

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Unit Tests
// ============================================================================
