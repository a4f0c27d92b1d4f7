//! # Test utilities for tronpay
//!
//! - [`MockGateway`] - scripted [`LedgerGateway`] with call counters
//! - [`CountingKeySource`] - key source that records how often it is asked
//! - Known keys, addresses, and the signatures they produce

#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use tronpay::transfer::TransferSettings;
use tronpay_core::error::{GatewayError, SignError};
use tronpay_core::gateway::LedgerGateway;
use tronpay_core::types::{
    Account, BroadcastOutcome, SignedTransaction, TransferRequest, UnsignedTransaction,
};
use tronpay_crypto::keys::{SecretKey, SecretKeySource};

/// Private key `1`.
pub const KEY_ONE_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";

/// Address of [`KEY_ONE_HEX`].
pub const KEY_ONE_ADDRESS: &str = "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC";

/// Private key `0x11` repeated.
pub const KEY_ELEVENS_HEX: &str = "1111111111111111111111111111111111111111111111111111111111111111";

/// A recipient address.
pub const RECIPIENT: &str = "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL";

/// Explorer prefix used by [`settings`].
pub const EXPLORER: &str = "https://shasta.tronscan.org/#/transaction/";

/// Signature of digest `aa * 32` under [`KEY_ONE_HEX`].
pub const KEY_ONE_SIG_AA: &str = concat!(
    "cf8298b9d991a37626f9816dd75ff8427f5169a0f122a65b8554e9f6504c984f",
    "3490ec2e5a8ddaebd27bbb531fefad6336d2a794dbcf2e0f3cae0e7b34bd33e001"
);

/// Signature of digest `aa * 32` under [`KEY_ELEVENS_HEX`].
pub const KEY_ELEVENS_SIG_AA: &str = concat!(
    "bb70e40ef81d63acdb3e71bb415b10459cb4a2f9cfa589785aad71900d3a7c23",
    "74e8969eab72eb7a8d2fadd7987e5eb6e3faa4212ef35bd2916345efc4f039b901"
);

/// A serialized transaction body.
pub const RAW_DATA_HEX: &str = "0a02f1b022084c3a9dbbd8e2b6ee40e0c5b4c0b2315a67";

/// The transaction id every [`MockGateway`] returns unless told otherwise.
pub fn tx_id_aa() -> String {
    "aa".repeat(32)
}

/// `SHA-256(RAW_DATA_HEX)`, hex.
pub fn raw_data_digest() -> String {
    hex::encode(Sha256::digest(hex::decode(RAW_DATA_HEX).expect("valid hex")))
}

/// Orchestrator settings with a short timeout.
pub fn settings() -> TransferSettings {
    TransferSettings {
        explorer_base_url: EXPLORER.to_string(),
        call_timeout: Duration::from_secs(2),
        verify_sender_key: true,
        verify_tx_id: false,
    }
}

/// A 1 TRX request from [`KEY_ONE_ADDRESS`] to [`RECIPIENT`].
pub fn one_trx_request() -> TransferRequest {
    TransferRequest::new(KEY_ONE_ADDRESS, RECIPIENT, 1_000_000)
}

/// An unsigned transaction as a node would return it.
pub fn unsigned_transaction(tx_id: &str) -> UnsignedTransaction {
    serde_json::from_value(json!({
        "visible": true,
        "txID": tx_id,
        "raw_data": {
            "contract": [{
                "parameter": {
                    "value": {"amount": 1_000_000, "owner_address": KEY_ONE_ADDRESS, "to_address": RECIPIENT},
                    "type_url": "type.googleapis.com/protocol.TransferContract"
                },
                "type": "TransferContract"
            }],
            "ref_block_bytes": "f1b0",
            "ref_block_hash": "4c3a9dbbd8e2b6ee",
            "expiration": 1_700_000_060_000_u64,
            "timestamp": 1_700_000_000_000_u64
        },
        "raw_data_hex": RAW_DATA_HEX
    }))
    .expect("valid transaction")
}

// ============================================================================
// MockGateway
// ============================================================================

type Hook = Box<dyn Fn() + Send + Sync>;

/// Scripted gateway.
///
/// Defaults: balance 10 TRX, `txID = "aa" * 32`, broadcast accepted.
pub struct MockGateway {
    balance: Result<u64, GatewayError>,
    created: Result<UnsignedTransaction, GatewayError>,
    broadcast: Result<BroadcastOutcome, GatewayError>,
    account_delay: Option<Duration>,
    on_create: Option<Hook>,
    on_broadcast: Option<Hook>,
    account_calls: AtomicU32,
    create_calls: AtomicU32,
    broadcast_calls: AtomicU32,
    last_broadcast: Mutex<Option<SignedTransaction>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            balance: Ok(10_000_000),
            created: Ok(unsigned_transaction(&tx_id_aa())),
            broadcast: Ok(BroadcastOutcome::accepted(tx_id_aa())),
            account_delay: None,
            on_create: None,
            on_broadcast: None,
            account_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            broadcast_calls: AtomicU32::new(0),
            last_broadcast: Mutex::new(None),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = Ok(balance);
        self
    }

    pub fn with_account_error(mut self, error: GatewayError) -> Self {
        self.balance = Err(error);
        self
    }

    pub fn with_account_delay(mut self, delay: Duration) -> Self {
        self.account_delay = Some(delay);
        self
    }

    pub fn with_transaction(mut self, transaction: UnsignedTransaction) -> Self {
        self.created = Ok(transaction);
        self
    }

    pub fn with_create_error(mut self, error: GatewayError) -> Self {
        self.created = Err(error);
        self
    }

    pub fn with_broadcast(mut self, outcome: BroadcastOutcome) -> Self {
        self.broadcast = Ok(outcome);
        self
    }

    pub fn with_broadcast_error(mut self, error: GatewayError) -> Self {
        self.broadcast = Err(error);
        self
    }

    pub fn on_create(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_create = Some(Box::new(hook));
        self
    }

    pub fn on_broadcast(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_broadcast = Some(Box::new(hook));
        self
    }

    pub fn account_calls(&self) -> u32 {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn broadcast_calls(&self) -> u32 {
        self.broadcast_calls.load(Ordering::SeqCst)
    }

    /// `(account, create, broadcast)` call counts.
    pub fn calls(&self) -> (u32, u32, u32) {
        (
            self.account_calls(),
            self.create_calls(),
            self.broadcast_calls(),
        )
    }

    pub fn last_broadcast(&self) -> Option<SignedTransaction> {
        self.last_broadcast.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerGateway for MockGateway {
    async fn get_account(&self, address: &str) -> Result<Account, GatewayError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.account_delay {
            tokio::time::sleep(delay).await;
        }
        self.balance.clone().map(|balance| Account {
            address: address.to_string(),
            balance,
        })
    }

    async fn create_transaction(
        &self,
        _request: &TransferRequest,
    ) -> Result<UnsignedTransaction, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.on_create {
            hook();
        }
        self.created.clone()
    }

    async fn broadcast_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastOutcome, GatewayError> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_broadcast.lock().unwrap() = Some(transaction.clone());
        if let Some(hook) = &self.on_broadcast {
            hook();
        }
        self.broadcast.clone()
    }
}

// ============================================================================
// CountingKeySource
// ============================================================================

/// Key source that counts how often the key is requested.
pub struct CountingKeySource {
    hex: Option<String>,
    calls: AtomicU32,
}

impl CountingKeySource {
    pub fn new(hex: &str) -> Self {
        Self {
            hex: Some(hex.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    /// A source whose storage is unavailable.
    pub fn unavailable() -> Self {
        Self {
            hex: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SecretKeySource for CountingKeySource {
    fn load_secret_key(&self) -> Result<SecretKey, SignError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.hex {
            Some(hex) => SecretKey::from_hex(hex),
            None => Err(SignError::invalid_private_key("secure storage is locked")),
        }
    }
}
