//! Transfer orchestration: validate, check balance, create, sign, broadcast.
//!
//! [`TransferOrchestrator`] drives one transfer through
//!
//! ```text
//! Idle -> ValidatingInput -> CheckingBalance -> CreatingTx -> Signing -> Broadcasting -> Succeeded
//!                  \               \               \            \            \
//!                   +---------------+---------------+------------+------------+--> Failed
//! ```
//!
//! Each step starts only once the previous one has succeeded. Nothing is
//! retried: a failed transfer must be started again from the top, which
//! creates a fresh transaction.
//!
//! # Example
//!
//! ```no_run
//! use tronpay::transfer::TransferOrchestrator;
//! use tronpay_core::{Config, TransferRequest};
//! use tronpay_crypto::keys::HexKeySource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = TransferOrchestrator::from_config(&Config::default())?;
//! let key = HexKeySource::new(std::env::var("TRON_PRIVATE_KEY")?);
//!
//! let request = TransferRequest::from_trx(
//!     "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC",
//!     "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL",
//!     1.5,
//! )?;
//! let result = orchestrator.send(&request, &key).await;
//! if result.success {
//!     println!("sent: {}", result.explorer_url.unwrap_or_default());
//! } else {
//!     println!("failed: {}", result.message.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

use tronpay_core::config::Config;
use tronpay_core::error::{GatewayError, SignError, TransferError};
use tronpay_core::gateway::LedgerGateway;
use tronpay_core::types::{
    TransferReceipt, TransferRequest, TransferResult, TransferState, UnsignedTransaction,
};
use tronpay_crypto::address::validate_address;
use tronpay_crypto::keypair::TronKeyPair;
use tronpay_crypto::keys::SecretKeySource;
use tronpay_gateway::TronGridGateway;

use crate::logging::{log_security_event, new_correlation_id};

/// Rejection code used when the node gives none.
const UNKNOWN_REJECTION_CODE: &str = "UNKNOWN";

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    /// Prefix of explorer links; the transaction id is appended.
    pub explorer_base_url: String,
    /// Upper bound for each gateway call.
    pub call_timeout: Duration,
    /// Refuse to sign when the key's address is not the sender.
    pub verify_sender_key: bool,
    /// Refuse to sign when `txID` is not the SHA-256 of `raw_data_hex`.
    pub verify_tx_id: bool,
}

impl TransferSettings {
    /// Settings with the default timeout and guards.
    #[must_use]
    pub fn new(explorer_base_url: impl Into<String>) -> Self {
        let defaults = Config::default();
        Self {
            explorer_base_url: explorer_base_url.into(),
            call_timeout: defaults.gateway.timeout(),
            verify_sender_key: defaults.transfer.verify_sender_key,
            verify_tx_id: defaults.transfer.verify_tx_id,
        }
    }

    /// Settings from the `[gateway]` and `[transfer]` sections.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            explorer_base_url: config.explorer_base_url().to_string(),
            call_timeout: config.gateway.timeout(),
            verify_sender_key: config.transfer.verify_sender_key,
            verify_tx_id: config.transfer.verify_tx_id,
        }
    }

    /// Explorer link for a transaction.
    #[must_use]
    pub fn explorer_url(&self, tx_id: &str) -> String {
        format!("{}{tx_id}", self.explorer_base_url)
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs transfers against a [`LedgerGateway`].
///
/// Holds no per-transfer state, so one orchestrator can serve concurrent
/// transfers. Transfers from the same sender are not serialized.
#[derive(Debug)]
pub struct TransferOrchestrator<G> {
    gateway: G,
    settings: TransferSettings,
}

impl TransferOrchestrator<TronGridGateway> {
    /// An orchestrator talking to the configured TronGrid endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let gateway = TronGridGateway::from_config(&config.gateway)?;
        Ok(Self::new(gateway, TransferSettings::from_config(config)))
    }
}

impl<G: LedgerGateway> TransferOrchestrator<G> {
    /// Create an orchestrator.
    #[must_use]
    pub const fn new(gateway: G, settings: TransferSettings) -> Self {
        Self { gateway, settings }
    }

    /// The gateway.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The settings.
    #[must_use]
    pub const fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Run a transfer and flatten the outcome into a [`TransferResult`].
    pub async fn send<K>(&self, request: &TransferRequest, key_source: &K) -> TransferResult
    where
        K: SecretKeySource + ?Sized,
    {
        self.try_send(request, key_source).await.into()
    }

    /// Run a transfer.
    ///
    /// # Errors
    ///
    /// Returns the [`TransferError`] of the step that failed.
    pub async fn try_send<K>(
        &self,
        request: &TransferRequest,
        key_source: &K,
    ) -> Result<TransferReceipt, TransferError>
    where
        K: SecretKeySource + ?Sized,
    {
        self.run(request, key_source, None).await
    }

    /// Like [`send`](Self::send), but stops before the next step once `cancel`
    /// holds `true`.
    ///
    /// Cancellation is honoured up to the start of broadcasting. A
    /// transaction that is being broadcast is not recalled.
    pub async fn send_cancellable<K>(
        &self,
        request: &TransferRequest,
        key_source: &K,
        cancel: watch::Receiver<bool>,
    ) -> TransferResult
    where
        K: SecretKeySource + ?Sized,
    {
        self.try_send_cancellable(request, key_source, cancel)
            .await
            .into()
    }

    /// Like [`try_send`](Self::try_send), with cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Cancelled`] naming the step that did not start,
    /// or the error of the step that failed.
    pub async fn try_send_cancellable<K>(
        &self,
        request: &TransferRequest,
        key_source: &K,
        cancel: watch::Receiver<bool>,
    ) -> Result<TransferReceipt, TransferError>
    where
        K: SecretKeySource + ?Sized,
    {
        self.run(request, key_source, Some(&cancel)).await
    }

    async fn run<K>(
        &self,
        request: &TransferRequest,
        key_source: &K,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<TransferReceipt, TransferError>
    where
        K: SecretKeySource + ?Sized,
    {
        let span = info_span!(
            "transfer",
            correlation_id = %new_correlation_id(),
            from = %request.from,
            to = %request.to,
            amount = request.amount,
        );

        async {
            let mut progress = Progress::new(cancel);
            let result = self.pipeline(request, key_source, &mut progress).await;
            match &result {
                Ok(receipt) => {
                    progress.finish(TransferState::Succeeded);
                    info!(tx_id = %receipt.tx_id, "transfer succeeded");
                }
                Err(error) => {
                    let stage = progress.state;
                    progress.finish(TransferState::Failed);
                    warn!(%stage, kind = %error.kind(), error = %error, "transfer failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn pipeline<K>(
        &self,
        request: &TransferRequest,
        key_source: &K,
        progress: &mut Progress<'_>,
    ) -> Result<TransferReceipt, TransferError>
    where
        K: SecretKeySource + ?Sized,
    {
        progress.enter(TransferState::ValidatingInput)?;
        validate_request(request)?;

        progress.enter(TransferState::CheckingBalance)?;
        let account = self
            .bounded("get_account", self.gateway.get_account(&request.from))
            .await?;
        if account.balance < request.amount {
            return Err(TransferError::InsufficientBalance {
                available: account.balance,
                requested: request.amount,
            });
        }

        progress.enter(TransferState::CreatingTx)?;
        let unsigned = self
            .bounded("create_transaction", self.gateway.create_transaction(request))
            .await?;
        debug!(tx_id = %unsigned.tx_id, "transaction created");

        progress.enter(TransferState::Signing)?;
        let signature = self.sign(request, &unsigned, key_source)?;

        progress.enter_uncancellable(TransferState::Broadcasting);
        let signed = unsigned.attach_signature(signature);
        let outcome = self
            .bounded("broadcast_transaction", self.gateway.broadcast_transaction(&signed))
            .await?;

        if !outcome.success {
            return Err(TransferError::rejected(
                outcome
                    .code
                    .unwrap_or_else(|| UNKNOWN_REJECTION_CODE.to_string()),
                outcome.message.unwrap_or_default(),
            ));
        }

        let tx_id = signed.tx_id().to_string();
        Ok(TransferReceipt {
            explorer_url: self.settings.explorer_url(&tx_id),
            tx_id,
        })
    }

    /// Sign `txID`. The key lives only for the duration of this call.
    fn sign<K>(
        &self,
        request: &TransferRequest,
        unsigned: &UnsignedTransaction,
        key_source: &K,
    ) -> Result<String, TransferError>
    where
        K: SecretKeySource + ?Sized,
    {
        if self.settings.verify_tx_id {
            check_tx_id(unsigned)?;
        }
        let digest = unsigned
            .digest_bytes()
            .map_err(|e| SignError::signature_failed(format!("txID is not valid hex: {e}")))?;

        let keypair = {
            let secret = key_source.load_secret_key()?;
            TronKeyPair::from_secret_key(&secret)?
        };
        if self.settings.verify_sender_key && keypair.address() != request.from {
            return Err(SignError::invalid_private_key(
                "private key does not belong to the sending address",
            )
            .into());
        }

        let signature = keypair.sign(&digest)?;
        drop(keypair);

        log_security_event(
            "transaction_signed",
            &format!("tx_id={} from={}", unsigned.tx_id, request.from),
        );
        Ok(signature.to_hex())
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        let limit = self.settings.call_timeout;
        tokio::time::timeout(limit, call).await.map_err(|_| {
            warn!(operation, timeout = ?limit, "gateway call timed out");
            GatewayError::timeout(operation, limit.as_secs())
        })?
    }
}

/// Tracks the current state and the cancellation signal.
struct Progress<'a> {
    state: TransferState,
    cancel: Option<&'a watch::Receiver<bool>>,
}

impl<'a> Progress<'a> {
    const fn new(cancel: Option<&'a watch::Receiver<bool>>) -> Self {
        Self {
            state: TransferState::Idle,
            cancel,
        }
    }

    fn enter(&mut self, next: TransferState) -> Result<(), TransferError> {
        if self.cancel.is_some_and(|rx| *rx.borrow()) {
            info!(stage = %next, "transfer cancelled");
            return Err(TransferError::Cancelled { stage: next });
        }
        self.enter_uncancellable(next);
        Ok(())
    }

    fn enter_uncancellable(&mut self, next: TransferState) {
        debug!(from = %self.state, to = %next, "transfer state");
        self.state = next;
    }

    fn finish(&mut self, terminal: TransferState) {
        debug_assert!(terminal.is_terminal());
        self.enter_uncancellable(terminal);
    }
}

fn validate_request(request: &TransferRequest) -> Result<(), TransferError> {
    if request.amount == 0 {
        return Err(TransferError::invalid_input("amount must be greater than zero"));
    }
    if !validate_address(&request.to) {
        return Err(TransferError::invalid_input(format!(
            "invalid recipient address '{}'",
            request.to
        )));
    }
    if !validate_address(&request.from) {
        return Err(TransferError::invalid_input(format!(
            "invalid sender address '{}'",
            request.from
        )));
    }
    Ok(())
}

/// `txID` must be the SHA-256 of the serialized transaction body.
fn check_tx_id(unsigned: &UnsignedTransaction) -> Result<(), SignError> {
    let raw = hex::decode(&unsigned.raw_data_hex)
        .map_err(|e| SignError::signature_failed(format!("raw_data_hex is not valid hex: {e}")))?;
    let expected = Sha256::digest(&raw);
    let claimed = unsigned
        .digest_bytes()
        .map_err(|e| SignError::signature_failed(format!("txID is not valid hex: {e}")))?;

    if claimed.as_slice() != expected.as_slice() {
        return Err(SignError::signature_failed(
            "txID does not match the transaction body",
        ));
    }
    Ok(())
}
