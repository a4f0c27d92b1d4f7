//! JSON shapes exchanged with a TronGrid-compatible node.
//!
//! Only the fields the adapter reads are modelled. Unknown fields are
//! ignored, and fields a node is known to omit default to empty.

use serde::{Deserialize, Serialize};

/// `GET /v1/accounts/{address}` response.
#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    /// Whether the query itself succeeded.
    #[serde(default)]
    pub success: bool,
    /// Matching accounts; empty for an address the ledger has not seen.
    #[serde(default)]
    pub data: Vec<AccountEntry>,
}

/// One entry of [`AccountsResponse::data`].
#[derive(Debug, Deserialize)]
pub struct AccountEntry {
    /// Balance in sun. Absent for accounts that hold nothing.
    #[serde(default)]
    pub balance: u64,
}

/// `POST /wallet/createtransaction` request body.
#[derive(Debug, Serialize)]
pub struct CreateTransactionBody<'a> {
    /// Sender, base-58.
    pub owner_address: &'a str,
    /// Recipient, base-58.
    pub to_address: &'a str,
    /// Amount in sun.
    pub amount: u64,
    /// Tells the node that addresses are base-58 rather than hex.
    pub visible: bool,
}

/// `POST /wallet/broadcasttransaction` response.
///
/// Accepted: `{"result": true, "txid": "..."}`.
/// Rejected: `{"code": "SIGERROR", "message": "<hex>"}`, sometimes with
/// `"result": false`.
#[derive(Debug, Deserialize)]
pub struct BroadcastResponse {
    /// True when the node accepted the transaction.
    #[serde(default)]
    pub result: bool,
    /// Transaction id echoed back on success.
    #[serde(default)]
    pub txid: Option<String>,
    /// Rejection code.
    #[serde(default)]
    pub code: Option<String>,
    /// Rejection message, usually hex-encoded.
    #[serde(default)]
    pub message: Option<String>,
}
