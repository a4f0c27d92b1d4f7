//! Wallet creation and import.
//!
//! Both operations return a [`Wallet`] holding the public data plus the
//! private key exactly once, for the caller to move into secure storage. The
//! core keeps no copy.
//!
//! ```
//! use tronpay::wallet::{create_wallet, import_wallet};
//!
//! let wallet = create_wallet().expect("OS RNG available");
//! let hex = wallet.secret_key().to_hex();
//!
//! let restored = import_wallet(&hex).expect("valid key");
//! assert_eq!(restored.address(), wallet.address());
//! ```

use tronpay_core::error::SignError;
use tronpay_crypto::keypair::{PublicKey, TronKeyPair};
use tronpay_crypto::keys::{SecretKey, SecretKeySource};

use crate::logging::log_security_event;

/// A newly created or imported wallet.
///
/// Debug output omits the private key.
pub struct Wallet {
    address: String,
    public_key: PublicKey,
    secret_key: SecretKey,
}

impl Wallet {
    fn from_keypair(keypair: &TronKeyPair) -> Self {
        Self {
            address: keypair.address().to_string(),
            public_key: *keypair.public_key(),
            secret_key: keypair.export_secret_key(),
        }
    }

    /// The base-58 address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The 64-byte public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The private key.
    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Give up the private key, for moving into secure storage.
    #[must_use]
    pub fn into_secret_key(self) -> SecretKey {
        self.secret_key
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Create a wallet from a fresh random key.
///
/// # Errors
///
/// Returns [`SignError::Entropy`] if the OS RNG fails.
pub fn create_wallet() -> Result<Wallet, SignError> {
    let keypair = TronKeyPair::generate()?;
    let wallet = Wallet::from_keypair(&keypair);
    log_security_event("wallet_created", &format!("address={}", wallet.address));
    Ok(wallet)
}

/// Import a wallet from a hex private key (64 hex characters, optional `0x`).
///
/// # Errors
///
/// Returns [`SignError::InvalidPrivateKey`] if the key is malformed, zero, or
/// not below the curve order.
pub fn import_wallet(private_key_hex: &str) -> Result<Wallet, SignError> {
    let keypair = TronKeyPair::from_hex(private_key_hex)?;
    let wallet = Wallet::from_keypair(&keypair);
    log_security_event("wallet_imported", &format!("address={}", wallet.address));
    Ok(wallet)
}

/// Import a wallet from a key held by a [`SecretKeySource`].
///
/// # Errors
///
/// Returns whatever the source returns, or [`SignError::InvalidPrivateKey`]
/// if the key is out of range.
pub fn import_from_source<S: SecretKeySource + ?Sized>(source: &S) -> Result<Wallet, SignError> {
    let secret = source.load_secret_key()?;
    let keypair = TronKeyPair::from_secret_key(&secret)?;
    let wallet = Wallet::from_keypair(&keypair);
    log_security_event("wallet_imported", &format!("address={}", wallet.address));
    Ok(wallet)
}
