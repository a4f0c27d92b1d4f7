//! ECDSA signing and verification over secp256k1.
//!
//! Signatures use RFC 6979 deterministic nonces and are normalized to low-s;
//! the recovery id is flipped whenever normalization flips `s`. The digest is
//! signed as given, without re-hashing.
//!
//! # Example
//!
//! ```rust
//! use tronpay_crypto::keypair::PublicKey;
//! use tronpay_crypto::keys::SecretKey;
//! use tronpay_crypto::signer::{sign, verify};
//!
//! let secret = SecretKey::generate().expect("OS RNG available");
//! let public_key = PublicKey::from_secret_key(&secret).expect("valid key");
//!
//! let digest = [0x42u8; 32];
//! let signature = sign(&digest, &secret).expect("signing succeeded");
//! assert!(verify(&digest, &signature.to_bytes(), public_key.as_bytes()));
//! ```

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};

use crate::keypair::{signing_key_from, PublicKey, Signature};
use crate::keys::SecretKey;
use tronpay_core::error::SignError;

/// Required digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Sign a 32-byte digest with a private key.
///
/// # Errors
///
/// Returns [`SignError::InvalidDigestLength`] if `digest` is not 32 bytes,
/// [`SignError::InvalidPrivateKey`] if the key is not a valid scalar, and
/// [`SignError::SignatureFailed`] if the primitive fails.
pub fn sign(digest: &[u8], private_key: &SecretKey) -> Result<Signature, SignError> {
    let digest = check_digest(digest)?;
    let signing_key = signing_key_from(private_key)?;
    sign_prehash(&signing_key, digest)
}

/// Verify a signature over a 32-byte digest.
///
/// `signature` may be 64 (`r || s`) or 65 (`r || s || v`) bytes; `public_key`
/// may be 64 raw, 65 uncompressed, or 33 compressed bytes. Any malformed
/// input yields `false`.
#[must_use]
pub fn verify(digest: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    if digest.len() != DIGEST_LEN {
        return false;
    }
    let compact = match signature.len() {
        64 | 65 => signature.get(..64),
        _ => None,
    };
    let Some(compact) = compact else {
        return false;
    };
    let Ok(k256_sig) = K256Signature::from_slice(compact) else {
        return false;
    };
    let Some(verifying_key) = PublicKey::parse(public_key).and_then(PublicKey::to_verifying_key)
    else {
        return false;
    };

    verifying_key.verify_prehash(digest, &k256_sig).is_ok()
}

/// Recover the signer's public key from a digest and recoverable signature.
///
/// # Errors
///
/// Returns [`SignError::InvalidDigestLength`] for a bad digest and
/// [`SignError::SignatureFailed`] if no key can be recovered.
pub fn recover_public_key(digest: &[u8], signature: &Signature) -> Result<PublicKey, SignError> {
    let digest = check_digest(digest)?;
    let k256_sig = K256Signature::from_slice(&signature.to_compact_bytes())
        .map_err(|_| SignError::signature_failed("malformed signature"))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or_else(|| SignError::signature_failed("invalid recovery id"))?;

    let verifying_key = VerifyingKey::recover_from_prehash(digest, &k256_sig, recovery_id)
        .map_err(|_| SignError::signature_failed("public key recovery failed"))?;
    Ok(PublicKey::from_verifying_key(&verifying_key))
}

pub(crate) fn check_digest(digest: &[u8]) -> Result<&[u8; DIGEST_LEN], SignError> {
    digest
        .try_into()
        .map_err(|_| SignError::InvalidDigestLength {
            actual: digest.len(),
        })
}

pub(crate) fn sign_prehash(
    signing_key: &SigningKey,
    digest: &[u8; DIGEST_LEN],
) -> Result<Signature, SignError> {
    let (signature, recovery_id): (K256Signature, RecoveryId) = signing_key
        .sign_prehash_recoverable(digest)
        .map_err(|_| SignError::signature_failed("secp256k1 signing failed"))?;

    // k256 already returns low-s; normalize anyway and keep v consistent with s
    let normalized = signature.normalize_s();
    let recovery_id = if normalized.is_some() {
        recovery_id.to_byte() ^ 1
    } else {
        recovery_id.to_byte()
    };
    let signature = normalized.unwrap_or(signature);

    let (r, s) = signature.split_bytes();
    Ok(Signature::from_parts(r.into(), s.into(), recovery_id))
}
