//! HTTP adapter for TronGrid-compatible nodes.
//!
//! [`TronGridGateway`] implements [`LedgerGateway`] over the node's REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get_account` | `GET /v1/accounts/{address}` |
//! | `create_transaction` | `POST /wallet/createtransaction` |
//! | `broadcast_transaction` | `POST /wallet/broadcasttransaction` |
//!
//! Every request carries the configured timeout. The adapter never retries.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tronpay_core::LedgerGateway;
//! use tronpay_gateway::TronGridGateway;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = TronGridGateway::builder("https://api.shasta.trongrid.io")
//!     .api_key("my-api-key")
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let account = gateway.get_account("TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeL").await?;
//! println!("balance: {} sun", account.balance);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use tronpay_core::config::{GatewayConfig, Network, DEFAULT_API_KEY_HEADER};
use tronpay_core::error::GatewayError;
use tronpay_core::gateway::LedgerGateway;
use tronpay_core::types::{
    Account, BroadcastOutcome, SignedTransaction, TransferRequest, UnsignedTransaction,
};

use crate::wire::{AccountsResponse, BroadcastResponse, CreateTransactionBody};

/// Longest response body kept in a [`GatewayError::Status`], in characters.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const OP_GET_ACCOUNT: &str = "get_account";
const OP_CREATE: &str = "create_transaction";
const OP_BROADCAST: &str = "broadcast_transaction";

/// [`LedgerGateway`] backed by a TronGrid-compatible HTTP API.
#[derive(Clone)]
pub struct TronGridGateway {
    http: Client,
    base_url: String,
    timeout: Duration,
    has_api_key: bool,
}

impl fmt::Debug for TronGridGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TronGridGateway")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("has_api_key", &self.has_api_key)
            .finish_non_exhaustive()
    }
}

impl TronGridGateway {
    /// Start building a gateway for `base_url`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> TronGridGatewayBuilder {
        TronGridGatewayBuilder::new(base_url)
    }

    /// A gateway for a network preset, without an API key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn for_network(network: Network, timeout: Duration) -> Result<Self, GatewayError> {
        Self::builder(network.base_url()).timeout(timeout).build()
    }

    /// A gateway configured from the `[gateway]` settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the API key header or value is
    /// not a valid HTTP header, or the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Self::builder(config.resolved_base_url())
            .api_key_header(config.api_key_header.clone())
            .timeout(config.timeout());
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key.clone());
        }
        builder.build()
    }

    /// The base URL requests are sent to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request_error(&self, operation: &str, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            warn!(operation, timeout = ?self.timeout, "gateway request timed out");
            GatewayError::timeout(operation, self.timeout.as_secs())
        } else {
            warn!(operation, error = %error, "gateway request failed");
            GatewayError::transport(operation, error.to_string())
        }
    }

    /// Read the body, mapping non-2xx to [`GatewayError::Status`] and
    /// unparseable JSON to [`GatewayError::MalformedResponse`].
    async fn read_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(operation, &e))?;

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "gateway returned an error status");
            return Err(GatewayError::status(
                operation,
                status.as_u16(),
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::malformed(operation, e.to_string()))
    }
}

#[async_trait]
impl LedgerGateway for TronGridGateway {
    async fn get_account(&self, address: &str) -> Result<Account, GatewayError> {
        let url = self.url(&format!("/v1/accounts/{address}"));
        debug!(operation = OP_GET_ACCOUNT, %url, "sending request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(OP_GET_ACCOUNT, &e))?;

        // Nodes answer 400/404 for addresses that have never been funded.
        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND
        ) {
            debug!(
                address,
                status = response.status().as_u16(),
                "unknown account, balance is zero"
            );
            return Ok(Account::empty(address));
        }

        let body: AccountsResponse = self.read_json(OP_GET_ACCOUNT, response).await?;
        let balance = body.data.first().map_or(0, |entry| entry.balance);

        Ok(Account {
            address: address.to_string(),
            balance,
        })
    }

    async fn create_transaction(
        &self,
        request: &TransferRequest,
    ) -> Result<UnsignedTransaction, GatewayError> {
        let url = self.url("/wallet/createtransaction");
        debug!(operation = OP_CREATE, %url, amount = request.amount, "sending request");

        let body = CreateTransactionBody {
            owner_address: &request.from,
            to_address: &request.to,
            amount: request.amount,
            visible: true,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(OP_CREATE, &e))?;

        let value: Value = self.read_json(OP_CREATE, response).await?;
        parse_unsigned_transaction(value)
    }

    async fn broadcast_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastOutcome, GatewayError> {
        let url = self.url("/wallet/broadcasttransaction");
        debug!(operation = OP_BROADCAST, %url, tx_id = transaction.tx_id(), "sending request");

        let response = self
            .http
            .post(&url)
            .json(transaction)
            .send()
            .await
            .map_err(|e| self.request_error(OP_BROADCAST, &e))?;

        let body: BroadcastResponse = self.read_json(OP_BROADCAST, response).await?;
        Ok(BroadcastOutcome {
            success: body.result,
            tx_id: body.txid,
            code: body.code,
            message: body.message,
        })
    }
}

/// Interpret a 2xx `createtransaction` body.
///
/// Nodes report validation failures (bad address, unfunded owner) as
/// `{"Error": "..."}` with status 200; that text is kept in the error.
fn parse_unsigned_transaction(value: Value) -> Result<UnsignedTransaction, GatewayError> {
    if let Some(node_error) = value.get("Error").and_then(Value::as_str) {
        return Err(GatewayError::malformed(OP_CREATE, node_error));
    }
    if value.get("txID").and_then(Value::as_str).is_none() {
        return Err(GatewayError::malformed(OP_CREATE, "response has no txID"));
    }

    let transaction: UnsignedTransaction = serde_json::from_value(value)
        .map_err(|e| GatewayError::malformed(OP_CREATE, e.to_string()))?;
    if transaction.raw_data_hex.is_empty() {
        return Err(GatewayError::malformed(OP_CREATE, "response has no raw_data_hex"));
    }

    Ok(transaction)
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`TronGridGateway`].
#[derive(Clone)]
pub struct TronGridGatewayBuilder {
    base_url: String,
    api_key: Option<String>,
    api_key_header: String,
    timeout: Duration,
}

impl fmt::Debug for TronGridGatewayBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TronGridGatewayBuilder")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_header", &self.api_key_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TronGridGatewayBuilder {
    /// Create a builder with no API key and the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Send `key` with every request.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Header name for the API key.
    #[must_use]
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the API key header or value is
    /// not a valid HTTP header, or the HTTP client cannot be built.
    pub fn build(self) -> Result<TronGridGateway, GatewayError> {
        const OP: &str = "client_setup";

        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let name = HeaderName::from_bytes(self.api_key_header.as_bytes())
                .map_err(|e| GatewayError::transport(OP, format!("invalid API key header: {e}")))?;
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| GatewayError::transport(OP, "API key is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::transport(OP, e.to_string()))?;

        Ok(TronGridGateway {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
            has_api_key: self.api_key.is_some(),
        })
    }
}
