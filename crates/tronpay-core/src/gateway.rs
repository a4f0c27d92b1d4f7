//! Ledger gateway seam.
//!
//! The transfer orchestrator reaches the TRON network only through
//! [`LedgerGateway`]. The HTTP adapter lives in `tronpay-gateway`; tests and
//! embedding applications can supply their own implementations.
//!
//! The trait is defined here, next to the types it exchanges, so that the
//! orchestrator and the adapter depend on `tronpay-core` and not on each other.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{Account, BroadcastOutcome, SignedTransaction, TransferRequest, UnsignedTransaction};

/// Remote ledger operations used by a transfer.
///
/// Implementations must not retry on their own; the orchestrator decides
/// what a failure means.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch the balance for `address`.
    ///
    /// An address the ledger does not know yet has a balance of zero and is
    /// not an error.
    async fn get_account(&self, address: &str) -> Result<Account, GatewayError>;

    /// Ask the gateway to build an unsigned transfer transaction.
    async fn create_transaction(
        &self,
        request: &TransferRequest,
    ) -> Result<UnsignedTransaction, GatewayError>;

    /// Submit a signed transaction.
    ///
    /// A node rejection is returned as `Ok` with `success == false`.
    async fn broadcast_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastOutcome, GatewayError>;
}

#[async_trait]
impl<G: LedgerGateway + ?Sized> LedgerGateway for Arc<G> {
    async fn get_account(&self, address: &str) -> Result<Account, GatewayError> {
        (**self).get_account(address).await
    }

    async fn create_transaction(
        &self,
        request: &TransferRequest,
    ) -> Result<UnsignedTransaction, GatewayError> {
        (**self).create_transaction(request).await
    }

    async fn broadcast_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastOutcome, GatewayError> {
        (**self).broadcast_transaction(transaction).await
    }
}
