//! # tronpay-crypto
//!
//! Key material, TRON addresses, and ECDSA signing for the tronpay wallet core.
//! Nothing in this crate performs I/O.
//!
//! ## Modules
//!
//! - [`keys`] - [`SecretKey`] and the [`SecretKeySource`] seam
//! - [`keypair`] - [`PublicKey`], [`Signature`], and [`TronKeyPair`]
//! - [`address`] - Address derivation and validation
//! - [`signer`] - Signing, verification, and public key recovery
//!
//! ## Security
//!
//! - No unsafe code allowed
//! - Secret keys are zeroized on drop and never printed
//! - Secret keys are compared in constant time

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod address;
pub mod keypair;
pub mod keys;
pub mod signer;

pub use address::{
    address_to_hex, derive_address, hex_to_address, validate_address, verify_address_checksum,
    ADDRESS_LEN, ADDRESS_PREFIX,
};
pub use keypair::{derive_public_key, PublicKey, Signature, TronKeyPair, PUBLIC_KEY_LEN, SIGNATURE_LEN};
pub use keys::{is_valid_private_key, HexKeySource, SecretKey, SecretKeySource, SECRET_KEY_LEN};
pub use signer::{recover_public_key, sign, verify, DIGEST_LEN};
