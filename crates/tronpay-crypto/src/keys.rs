//! Private key material with secure memory handling.
//!
//! [`SecretKey`] holds a secp256k1 scalar and guarantees that it is:
//! - Zeroized on drop
//! - Never exposed in debug output
//! - Compared in constant time
//!
//! The wallet core never stores keys. Callers keep them in their own secure
//! storage and hand them back through [`SecretKeySource`] when a transfer
//! needs a signature.

use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use tronpay_core::error::SignError;

/// The length of a secret key in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// Number of hex characters in an encoded secret key.
pub const SECRET_KEY_HEX_LEN: usize = SECRET_KEY_LEN * 2;

/// Candidate scalars drawn before [`SecretKey::generate`] gives up.
const MAX_GENERATE_ATTEMPTS: usize = 8;

/// A 32-byte secp256k1 private key with automatic zeroization.
///
/// This type does not implement `Clone`; keys are moved, not copied.
///
/// # Example
///
/// ```
/// use tronpay_crypto::keys::SecretKey;
///
/// let key = SecretKey::generate().expect("OS RNG available");
/// let hex = key.to_hex();
/// assert_eq!(hex.len(), 64);
///
/// let restored = SecretKey::from_hex(&hex).expect("valid key");
/// assert_eq!(key, restored);
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; SECRET_KEY_LEN],
}

impl SecretKey {
    /// Create a new `SecretKey` from raw bytes.
    ///
    /// The bytes are not checked against the curve order; use
    /// [`SecretKey::validated`] when that matters.
    ///
    /// # Security
    /// The input bytes are copied. The caller should zeroize the original.
    #[must_use]
    pub const fn new(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Create a `SecretKey`, rejecting zero and scalars at or above the curve order.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPrivateKey`] if the bytes are not a valid scalar.
    pub fn validated(bytes: [u8; SECRET_KEY_LEN]) -> Result<Self, SignError> {
        let key = Self::new(bytes);
        key.check_scalar()?;
        Ok(key)
    }

    /// Parse a hex private key, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPrivateKey`] if the string is not exactly
    /// 64 hex characters or the value is not a valid secp256k1 scalar.
    pub fn from_hex(private_key: &str) -> Result<Self, SignError> {
        let digits = strip_hex_prefix(private_key);
        if digits.len() != SECRET_KEY_HEX_LEN {
            return Err(SignError::invalid_private_key(format!(
                "expected {SECRET_KEY_HEX_LEN} hex characters, got {}",
                digits.len()
            )));
        }

        let mut bytes = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        hex::decode_to_slice(digits, bytes.as_mut_slice())
            .map_err(|_| SignError::invalid_private_key("not a hex string"))?;

        Self::validated(*bytes)
    }

    /// Generate a new random key from the operating system's CSPRNG.
    ///
    /// Candidates outside `[1, n-1]` are redrawn.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Entropy`] if the RNG fails or keeps producing
    /// invalid scalars.
    pub fn generate() -> Result<Self, SignError> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let mut bytes = Zeroizing::new([0u8; SECRET_KEY_LEN]);
            rand::rngs::OsRng
                .try_fill_bytes(bytes.as_mut_slice())
                .map_err(|e| SignError::entropy(e.to_string()))?;

            let key = Self::new(*bytes);
            if key.check_scalar().is_ok() {
                return Ok(key);
            }
        }
        Err(SignError::entropy(
            "random source produced no valid secp256k1 scalar",
        ))
    }

    /// Expose the raw bytes for cryptographic operations.
    ///
    /// # Security
    ///
    /// The returned reference must not be stored or copied beyond the
    /// immediate cryptographic operation.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.bytes
    }

    /// Encode the key as 64 lowercase hex characters, for export to secure storage.
    ///
    /// The returned string is zeroized when dropped.
    #[must_use]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }

    /// Get the length of the secret key in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        SECRET_KEY_LEN
    }

    /// Returns false (`SecretKey` is never empty).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Convert into a `k256::SecretKey` for secp256k1 operations.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPrivateKey`] if the value is zero or not
    /// below the curve order.
    pub fn to_k256(&self) -> Result<k256::SecretKey, SignError> {
        k256::SecretKey::from_bytes((&self.bytes).into())
            .map_err(|_| SignError::invalid_private_key("scalar is zero or exceeds the curve order"))
    }

    fn check_scalar(&self) -> Result<(), SignError> {
        self.to_k256().map(drop)
    }
}

/// Returns true if `candidate` looks like a hex private key.
///
/// This is a format check only: an optional `0x` prefix followed by exactly
/// 64 hex characters. It does not check the curve order.
///
/// ```
/// use tronpay_crypto::keys::is_valid_private_key;
///
/// assert!(is_valid_private_key(&"ab".repeat(32)));
/// assert!(is_valid_private_key(&format!("0x{}", "AB".repeat(32))));
/// assert!(!is_valid_private_key("not-hex"));
/// ```
#[must_use]
pub fn is_valid_private_key(candidate: &str) -> bool {
    let digits = strip_hex_prefix(candidate);
    digits.len() == SECRET_KEY_HEX_LEN && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn strip_hex_prefix(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

// Prevent accidental debug printing of secrets
impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

// Constant-time equality comparison to prevent timing attacks
impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for SecretKey {}

impl From<[u8; SECRET_KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self::new(bytes)
    }
}

// ============================================================================
// SecretKeySource
// ============================================================================

/// Hands out the signing key when a transfer reaches its signing step.
///
/// Implement this over the platform's secure storage. The orchestrator calls
/// [`load_secret_key`](Self::load_secret_key) at most once per transfer, only
/// after the transaction has been created, and drops the key right after
/// signing.
pub trait SecretKeySource: Send + Sync {
    /// Produce the private key.
    ///
    /// # Errors
    ///
    /// Returns a [`SignError`] if the key is unavailable or malformed.
    fn load_secret_key(&self) -> Result<SecretKey, SignError>;
}

/// Hex-encoded key held in memory, zeroized on drop.
///
/// ```
/// use tronpay_crypto::keys::{HexKeySource, SecretKeySource};
///
/// let source = HexKeySource::new("0x".to_string() + &"11".repeat(32));
/// assert!(source.load_secret_key().is_ok());
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HexKeySource {
    hex: String,
}

impl HexKeySource {
    /// Wrap a hex private key.
    #[must_use]
    pub const fn new(hex: String) -> Self {
        Self { hex }
    }
}

impl SecretKeySource for HexKeySource {
    fn load_secret_key(&self) -> Result<SecretKey, SignError> {
        SecretKey::from_hex(&self.hex)
    }
}

impl std::fmt::Debug for HexKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HexKeySource([REDACTED])")
    }
}

impl<F> SecretKeySource for F
where
    F: Fn() -> Result<SecretKey, SignError> + Send + Sync,
{
    fn load_secret_key(&self) -> Result<SecretKey, SignError> {
        self()
    }
}
