//! secp256k1 key pairs, public keys, and recoverable signatures.
//!
//! # Example
//!
//! ```rust
//! use tronpay_crypto::keypair::TronKeyPair;
//!
//! let keypair = TronKeyPair::generate().expect("OS RNG available");
//! assert_eq!(keypair.public_key().as_bytes().len(), 64);
//! assert!(keypair.address().starts_with('T'));
//!
//! let digest = [0x11u8; 32];
//! let signature = keypair.sign(&digest).expect("signing succeeded");
//! assert_eq!(signature.to_hex().len(), 130);
//! assert!(keypair.verify(&digest, &signature));
//! ```

use k256::ecdsa::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::address::derive_address;
use crate::keys::SecretKey;
use crate::signer;
use tronpay_core::error::SignError;

/// Length of a raw public key (`X || Y`).
pub const PUBLIC_KEY_LEN: usize = 64;

/// Length of an encoded signature (`r || s || v`).
pub const SIGNATURE_LEN: usize = 65;

/// Derive the 64-byte public key for a hex private key.
///
/// # Errors
///
/// Returns [`SignError::InvalidPrivateKey`] if the key is not 64 hex
/// characters (optionally `0x`-prefixed) or is zero or not below the curve order.
///
/// ```rust
/// use tronpay_crypto::keypair::derive_public_key;
///
/// let one = format!("{}01", "00".repeat(31));
/// let public_key = derive_public_key(&one).unwrap();
/// assert!(public_key.to_hex().starts_with("79be667ef9dcbbac"));
///
/// assert!(derive_public_key(&"00".repeat(32)).is_err());
/// assert!(derive_public_key("not-hex").is_err());
/// ```
pub fn derive_public_key(private_key: &str) -> Result<PublicKey, SignError> {
    let secret = SecretKey::from_hex(private_key)?;
    PublicKey::from_secret_key(&secret)
}

// ============================================================================
// PublicKey
// ============================================================================

/// Uncompressed secp256k1 public key without the `0x04` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LEN],
}

impl PublicKey {
    /// Derive the public key for a secret key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPrivateKey`] if the secret is not a valid scalar.
    pub fn from_secret_key(secret: &SecretKey) -> Result<Self, SignError> {
        let signing_key = signing_key_from(secret)?;
        Ok(Self::from_verifying_key(signing_key.verifying_key()))
    }

    /// Parse a public key from 64 raw bytes, 65 uncompressed SEC1 bytes, or
    /// 33 compressed SEC1 bytes.
    ///
    /// Returns `None` if the bytes are not a point on the curve.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let verifying_key = match bytes.len() {
            PUBLIC_KEY_LEN => {
                let mut sec1 = [0u8; PUBLIC_KEY_LEN + 1];
                sec1[0] = 0x04;
                sec1[1..].copy_from_slice(bytes);
                VerifyingKey::from_sec1_bytes(&sec1).ok()?
            }
            33 | 65 => VerifyingKey::from_sec1_bytes(bytes).ok()?,
            _ => return None,
        };
        Some(Self::from_verifying_key(&verifying_key))
    }

    pub(crate) fn from_verifying_key(verifying_key: &VerifyingKey) -> Self {
        let point = verifying_key.to_encoded_point(false);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        if let Some(xy) = point.as_bytes().get(1..) {
            bytes.copy_from_slice(xy);
        }
        Self { bytes }
    }

    pub(crate) fn to_verifying_key(self) -> Option<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(&self.uncompressed()).ok()
    }

    /// The 64 raw bytes (`X || Y`).
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.bytes
    }

    /// SEC1 uncompressed encoding (`0x04 || X || Y`).
    #[must_use]
    pub fn uncompressed(&self) -> [u8; PUBLIC_KEY_LEN + 1] {
        let mut out = [0u8; PUBLIC_KEY_LEN + 1];
        out[0] = 0x04;
        out[1..].copy_from_slice(&self.bytes);
        out
    }

    /// Lowercase hex of the 64 raw bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// The base-58 TRON address for this key.
    #[must_use]
    pub fn address(&self) -> String {
        derive_address(&self.bytes)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

// ============================================================================
// Signature
// ============================================================================

/// Recoverable ECDSA signature.
///
/// `s` is always in the lower half of the curve order. The encoded form is
/// `r (32) || s (32) || v (1)` with `v` the raw recovery id, 0 or 1.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
}

impl Signature {
    /// Assemble a signature from its components.
    #[must_use]
    pub const fn from_parts(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Self {
        Self { r, s, recovery_id }
    }

    /// Parse a 65-byte `r || s || v` signature.
    ///
    /// `v` may be the raw recovery id (0, 1) or the legacy 27/28 form.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::SignatureFailed`] on a wrong length or recovery id.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignError::signature_failed(format!(
                "expected {SIGNATURE_LEN} signature bytes, got {}",
                bytes.len()
            )));
        }
        let (rs, v) = bytes.split_at(64);
        let recovery_id = match v.first().copied() {
            Some(id @ (0 | 1)) => id,
            Some(id @ (27 | 28)) => id - 27,
            other => {
                return Err(SignError::signature_failed(format!(
                    "invalid recovery id {other:?}"
                )))
            }
        };
        let (r_part, s_part) = rs.split_at(32);
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(r_part);
        s.copy_from_slice(s_part);
        Ok(Self { r, s, recovery_id })
    }

    /// Parse a 130-character hex signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::SignatureFailed`] if the hex or its contents are invalid.
    pub fn from_hex(signature: &str) -> Result<Self, SignError> {
        let bytes = hex::decode(signature)
            .map_err(|_| SignError::signature_failed("signature is not hex"))?;
        Self::from_slice(&bytes)
    }

    /// The `r` component.
    #[must_use]
    pub const fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The `s` component.
    #[must_use]
    pub const fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// The recovery id, 0 or 1.
    #[must_use]
    pub const fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// `r || s` without the recovery id.
    #[must_use]
    pub fn to_compact_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// `r || s || v`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&self.to_compact_bytes());
        out[64] = self.recovery_id;
        out
    }

    /// Lowercase hex of `r || s || v`, 130 characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signature(r={}, s={}, v={})",
            hex::encode(self.r),
            hex::encode(self.s),
            self.recovery_id
        )
    }
}

// ============================================================================
// TronKeyPair
// ============================================================================

/// A private key together with its public key and address.
///
/// The signing key zeroizes itself on drop. Debug output shows only the
/// address and public key.
pub struct TronKeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
    address: String,
}

impl TronKeyPair {
    /// Generate a fresh key pair from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Entropy`] if the RNG fails.
    pub fn generate() -> Result<Self, SignError> {
        let secret = SecretKey::generate()?;
        Self::from_secret_key(&secret)
    }

    /// Build a key pair from an existing secret key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPrivateKey`] if the secret is not a valid scalar.
    pub fn from_secret_key(secret: &SecretKey) -> Result<Self, SignError> {
        let signing_key = signing_key_from(secret)?;
        let public_key = PublicKey::from_verifying_key(signing_key.verifying_key());
        let address = public_key.address();
        Ok(Self {
            signing_key,
            public_key,
            address,
        })
    }

    /// Build a key pair from a hex private key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPrivateKey`] for malformed or out-of-range keys.
    pub fn from_hex(private_key: &str) -> Result<Self, SignError> {
        let secret = SecretKey::from_hex(private_key)?;
        Self::from_secret_key(&secret)
    }

    /// The public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The base-58 address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Copy the private key out, for handing to secure storage.
    #[must_use]
    pub fn export_secret_key(&self) -> SecretKey {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        let secret = SecretKey::new(bytes);
        bytes.zeroize();
        secret
    }

    /// Sign a 32-byte digest.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidDigestLength`] if `digest` is not 32 bytes.
    pub fn sign(&self, digest: &[u8]) -> Result<Signature, SignError> {
        let digest = signer::check_digest(digest)?;
        signer::sign_prehash(&self.signing_key, digest)
    }

    /// Verify a signature against this key pair's public key.
    #[must_use]
    pub fn verify(&self, digest: &[u8], signature: &Signature) -> bool {
        signer::verify(digest, &signature.to_bytes(), self.public_key.as_bytes())
    }
}

impl std::fmt::Debug for TronKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TronKeyPair")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

pub(crate) fn signing_key_from(secret: &SecretKey) -> Result<SigningKey, SignError> {
    SigningKey::from_bytes(secret.as_bytes().into())
        .map_err(|_| SignError::invalid_private_key("scalar is zero or exceeds the curve order"))
}

// ============================================================================
// Tests
// ============================================================================
