//! TRON address codec.
//!
//! A TRON address is derived from a 64-byte uncompressed public key
//! (`X || Y`, no `0x04` prefix):
//!
//! 1. Keccak-256 of the public key
//! 2. Keep the last 20 bytes
//! 3. Prepend the network prefix `0x41`
//! 4. Append the first 4 bytes of `SHA-256(SHA-256(prefix || hash20))`
//! 5. Base-58 encode (Bitcoin alphabet)
//!
//! The result is always 34 characters and starts with `T`.
//!
//! # Example
//!
//! ```rust
//! use tronpay_crypto::address::{address_to_hex, validate_address};
//!
//! let address = "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL";
//! assert!(validate_address(address));
//! assert_eq!(
//!     address_to_hex(address).unwrap(),
//!     "418840e6c55b9ada326d211d818c34a994aeced808"
//! );
//! ```

use sha2::{Digest, Sha256};
use sha3::Keccak256;

use tronpay_core::error::AddressError;

/// Network prefix byte for TRON addresses.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Length of an encoded address in characters.
pub const ADDRESS_LEN: usize = 34;

/// Length of the prefixed address payload in bytes.
pub const ADDRESS_PAYLOAD_LEN: usize = 21;

/// Length of the base-58 checksum in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// The Bitcoin base-58 alphabet.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Derive the base-58 address for a 64-byte uncompressed public key.
#[must_use]
pub fn derive_address(public_key: &[u8; 64]) -> String {
    let hash = Keccak256::digest(public_key);

    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload[0] = ADDRESS_PREFIX;
    if let Some(tail) = hash.get(12..32) {
        payload[1..].copy_from_slice(tail);
    }

    encode_payload(&payload)
}

/// Format check for an address.
///
/// Returns true when `candidate` has 34 characters, starts with `T`, and uses
/// only base-58 characters. The checksum is not verified; use
/// [`verify_address_checksum`] for that.
#[must_use]
pub fn validate_address(candidate: &str) -> bool {
    candidate.len() == ADDRESS_LEN
        && candidate.starts_with('T')
        && candidate.chars().all(is_base58_char)
}

/// Decode an address and verify its prefix and checksum.
///
/// Returns the 21-byte payload (`0x41 || hash20`).
///
/// # Errors
///
/// Returns an [`AddressError`] describing the first problem found.
pub fn verify_address_checksum(address: &str) -> Result<[u8; ADDRESS_PAYLOAD_LEN], AddressError> {
    if let Some(character) = address.chars().find(|c| !is_base58_char(*c)) {
        return Err(AddressError::InvalidCharacter { character });
    }
    if address.len() != ADDRESS_LEN {
        return Err(AddressError::InvalidLength {
            actual: address.len(),
        });
    }

    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|_| AddressError::InvalidLength {
            actual: address.len(),
        })?;
    if decoded.len() != ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN {
        return Err(AddressError::InvalidLength {
            actual: decoded.len(),
        });
    }

    let (payload, checksum) = decoded.split_at(ADDRESS_PAYLOAD_LEN);
    if payload.first() != Some(&ADDRESS_PREFIX) {
        return Err(AddressError::InvalidPrefix {
            prefix: payload.first().copied().unwrap_or_default(),
        });
    }
    if checksum != double_sha256_checksum(payload) {
        return Err(AddressError::ChecksumMismatch);
    }

    let mut out = [0u8; ADDRESS_PAYLOAD_LEN];
    out.copy_from_slice(payload);
    Ok(out)
}

/// Convert a base-58 address to its 42-character hex form (`41...`).
///
/// # Errors
///
/// Returns an [`AddressError`] if the address fails [`verify_address_checksum`].
pub fn address_to_hex(address: &str) -> Result<String, AddressError> {
    verify_address_checksum(address).map(hex::encode)
}

/// Convert a hex address to base-58.
///
/// Accepts the 21-byte `41...` form or a bare 20-byte hash, with or without `0x`.
///
/// ```rust
/// use tronpay_crypto::address::hex_to_address;
///
/// let address = hex_to_address("0x8840e6c55b9ada326d211d818c34a994aeced808").unwrap();
/// assert_eq!(address, "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL");
/// ```
///
/// # Errors
///
/// Returns [`AddressError::InvalidHex`], [`AddressError::InvalidLength`], or
/// [`AddressError::InvalidPrefix`].
pub fn hex_to_address(hex_address: &str) -> Result<String, AddressError> {
    let digits = hex_address
        .strip_prefix("0x")
        .or_else(|| hex_address.strip_prefix("0X"))
        .unwrap_or(hex_address);
    let bytes = hex::decode(digits).map_err(|e| AddressError::invalid_hex(e.to_string()))?;

    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    match bytes.len() {
        ADDRESS_PAYLOAD_LEN => {
            if bytes.first() != Some(&ADDRESS_PREFIX) {
                return Err(AddressError::InvalidPrefix {
                    prefix: bytes.first().copied().unwrap_or_default(),
                });
            }
            payload.copy_from_slice(&bytes);
        }
        20 => {
            payload[0] = ADDRESS_PREFIX;
            payload[1..].copy_from_slice(&bytes);
        }
        actual => return Err(AddressError::InvalidLength { actual }),
    }

    Ok(encode_payload(&payload))
}

fn encode_payload(payload: &[u8; ADDRESS_PAYLOAD_LEN]) -> String {
    let mut full = [0u8; ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN];
    full[..ADDRESS_PAYLOAD_LEN].copy_from_slice(payload);
    full[ADDRESS_PAYLOAD_LEN..].copy_from_slice(&double_sha256_checksum(payload));
    bs58::encode(full).into_string()
}

fn double_sha256_checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut checksum = [0u8; CHECKSUM_LEN];
    if let Some(head) = digest.get(..CHECKSUM_LEN) {
        checksum.copy_from_slice(head);
    }
    checksum
}

fn is_base58_char(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l')
}
