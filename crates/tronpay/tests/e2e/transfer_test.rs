//! Transfer pipeline tests against a scripted gateway.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::significant_drop_tightening
)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use tronpay::transfer::{TransferOrchestrator, TransferSettings};
use tronpay_core::error::{ErrorKind, GatewayError, SignError, TransferError};
use tronpay_core::types::{BroadcastOutcome, TransferRequest, TransferState};

use crate::common::{
    one_trx_request, raw_data_digest, settings, tx_id_aa, unsigned_transaction, CountingKeySource,
    MockGateway, EXPLORER, KEY_ELEVENS_HEX, KEY_ELEVENS_SIG_AA, KEY_ONE_ADDRESS, KEY_ONE_HEX,
    KEY_ONE_SIG_AA, RECIPIENT,
};

fn orchestrator(gateway: MockGateway) -> TransferOrchestrator<MockGateway> {
    TransferOrchestrator::new(gateway, settings())
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_send_signs_tx_id_and_broadcasts() {
    let orchestrator = orchestrator(MockGateway::new());
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let result = orchestrator.send(&one_trx_request(), &key).await;

    assert!(result.success, "transfer failed: {:?}", result.message);
    assert_eq!(result.tx_id, Some(tx_id_aa()));
    assert_eq!(result.explorer_url, Some(format!("{EXPLORER}{}", tx_id_aa())));
    assert_eq!(result.error_kind, None);
    assert_eq!(result.message, None);

    let gateway = orchestrator.gateway();
    assert_eq!(gateway.calls(), (1, 1, 1));
    assert_eq!(key.calls(), 1);

    let signed = gateway.last_broadcast().expect("broadcast happened");
    assert_eq!(signed.signature, vec![KEY_ONE_SIG_AA.to_string()]);
    assert_eq!(signed.signature[0].len(), 130);
}

#[tokio::test]
async fn test_broadcast_echoes_gateway_fields() {
    let orchestrator = orchestrator(MockGateway::new());
    let key = CountingKeySource::new(KEY_ONE_HEX);

    orchestrator.try_send(&one_trx_request(), &key).await.unwrap();

    let signed = orchestrator.gateway().last_broadcast().unwrap();
    let body = serde_json::to_value(&signed).unwrap();
    let mut expected = serde_json::to_value(unsigned_transaction(&tx_id_aa())).unwrap();
    expected["signature"] = serde_json::json!([KEY_ONE_SIG_AA]);
    assert_eq!(body, expected);
    assert_eq!(body["visible"], serde_json::json!(true));
}

#[tokio::test]
async fn test_balance_equal_to_amount_is_enough() {
    let orchestrator = orchestrator(MockGateway::new().with_balance(1_000_000));
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let receipt = orchestrator.try_send(&one_trx_request(), &key).await.unwrap();
    assert_eq!(receipt.tx_id, tx_id_aa());
}

#[tokio::test]
async fn test_shared_gateway_via_arc() {
    let gateway = Arc::new(MockGateway::new());
    let orchestrator = TransferOrchestrator::new(Arc::clone(&gateway), settings());
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let first = orchestrator.send(&one_trx_request(), &key).await;
    let second = orchestrator.send(&one_trx_request(), &key).await;

    assert!(first.success && second.success);
    assert_eq!(gateway.calls(), (2, 2, 2));
    assert_eq!(key.calls(), 2);
}

#[tokio::test]
async fn test_result_serializes_camel_case() {
    let orchestrator = orchestrator(MockGateway::new());
    let result = orchestrator
        .send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], serde_json::json!(true));
    assert_eq!(json["txId"], serde_json::json!(tx_id_aa()));
    assert_eq!(
        json["explorerUrl"],
        serde_json::json!(format!("{EXPLORER}{}", tx_id_aa()))
    );
}

// ============================================================================
// Validation and balance
// ============================================================================

#[tokio::test]
async fn test_insufficient_balance_stops_before_create() {
    let orchestrator = orchestrator(MockGateway::new().with_balance(500_000));
    let key = CountingKeySource::new(KEY_ONE_HEX);
    let request = TransferRequest::new(KEY_ONE_ADDRESS, RECIPIENT, 2_000_000);

    let result = orchestrator.send(&request, &key).await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::InsufficientBalance));
    let message = result.message.unwrap();
    assert!(message.contains("0.500000"), "{message}");
    assert!(message.contains("2.000000"), "{message}");

    assert_eq!(orchestrator.gateway().calls(), (1, 0, 0));
    assert_eq!(key.calls(), 0);
}

#[tokio::test]
async fn test_unknown_account_has_zero_balance() {
    let orchestrator = orchestrator(MockGateway::new().with_balance(0));
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let err = orchestrator
        .try_send(&one_trx_request(), &key)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransferError::InsufficientBalance {
            available: 0,
            requested: 1_000_000
        }
    );
}

#[tokio::test]
async fn test_invalid_input_makes_no_network_calls() {
    let cases = [
        TransferRequest::new(KEY_ONE_ADDRESS, RECIPIENT, 0),
        TransferRequest::new(KEY_ONE_ADDRESS, "0x8840e6c55b9ada326d211d818c34a994aeced808", 1),
        TransferRequest::new(KEY_ONE_ADDRESS, "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqe", 1),
        TransferRequest::new(KEY_ONE_ADDRESS, "", 1),
    ];

    for request in cases {
        let orchestrator = orchestrator(MockGateway::new());
        let key = CountingKeySource::new(KEY_ONE_HEX);

        let result = orchestrator.send(&request, &key).await;
        assert_eq!(
            result.error_kind,
            Some(ErrorKind::InvalidInput),
            "request {request:?}"
        );
        assert_eq!(orchestrator.gateway().calls(), (0, 0, 0));
        assert_eq!(key.calls(), 0);
    }
}

#[tokio::test]
async fn test_recipient_checksum_is_not_checked() {
    // format-valid address with a bad checksum still passes input validation
    let orchestrator = orchestrator(MockGateway::new());
    let request = TransferRequest::new(KEY_ONE_ADDRESS, "TNPeeaaFB7K9cmo4uQpcU32zGK8G1NYqeM", 1);

    let result = orchestrator
        .send(&request, &CountingKeySource::new(KEY_ONE_HEX))
        .await;
    assert!(result.success);
}

// ============================================================================
// Gateway failures
// ============================================================================

#[tokio::test]
async fn test_account_failure_is_gateway_error() {
    let orchestrator = orchestrator(
        MockGateway::new().with_account_error(GatewayError::transport("get_account", "refused")),
    );
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let result = orchestrator.send(&one_trx_request(), &key).await;
    assert_eq!(result.error_kind, Some(ErrorKind::GatewayError));
    assert_eq!(orchestrator.gateway().calls(), (1, 0, 0));
}

#[tokio::test]
async fn test_create_failure_does_not_touch_key() {
    let orchestrator = orchestrator(MockGateway::new().with_create_error(GatewayError::status(
        "create_transaction",
        500,
        "internal error",
    )));
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let err = orchestrator
        .try_send(&one_trx_request(), &key)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::GatewayError);
    let TransferError::Gateway(gateway_error) = err else {
        panic!("expected a gateway error");
    };
    assert_eq!(gateway_error.status_code(), Some(500));
    assert_eq!(orchestrator.gateway().calls(), (1, 1, 0));
    assert_eq!(key.calls(), 0);
}

#[tokio::test]
async fn test_broadcast_transport_failure_is_gateway_error() {
    let orchestrator = orchestrator(
        MockGateway::new()
            .with_broadcast_error(GatewayError::transport("broadcast_transaction", "reset")),
    );

    let result = orchestrator
        .send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await;
    assert_eq!(result.error_kind, Some(ErrorKind::GatewayError));
    assert_eq!(orchestrator.gateway().calls(), (1, 1, 1));
}

#[tokio::test]
async fn test_slow_gateway_times_out() {
    let orchestrator = TransferOrchestrator::new(
        MockGateway::new().with_account_delay(Duration::from_secs(2)),
        TransferSettings {
            call_timeout: Duration::from_millis(50),
            ..settings()
        },
    );

    let err = orchestrator
        .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            TransferError::Gateway(GatewayError::Timeout { ref operation, .. }) if operation == "get_account"
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(orchestrator.gateway().calls(), (1, 0, 0));
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_rejection_keeps_code_and_message() {
    // "balance is not sufficient", hex-encoded as nodes send it
    let message_hex = hex::encode("balance is not sufficient");
    let orchestrator = orchestrator(
        MockGateway::new()
            .with_broadcast(BroadcastOutcome::rejected("CONTRACT_VALIDATE_ERROR", &message_hex)),
    );

    let err = orchestrator
        .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransferError::rejected("CONTRACT_VALIDATE_ERROR", message_hex.clone())
    );
    assert_eq!(err.kind(), ErrorKind::TransactionRejected);
    assert!(err.user_message().contains("balance is not sufficient"));
}

#[tokio::test]
async fn test_rejection_without_code() {
    let orchestrator = orchestrator(MockGateway::new().with_broadcast(BroadcastOutcome {
        success: false,
        tx_id: None,
        code: None,
        message: None,
    }));

    let err = orchestrator
        .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::TransactionRejected { ref code, .. } if code == "UNKNOWN"));
}

#[tokio::test]
async fn test_sigerror_reported_when_sender_check_disabled() {
    let orchestrator = TransferOrchestrator::new(
        MockGateway::new().with_broadcast(BroadcastOutcome::rejected(
            "SIGERROR",
            hex::encode("validate signature error"),
        )),
        TransferSettings {
            verify_sender_key: false,
            ..settings()
        },
    );

    // key does not belong to KEY_ONE_ADDRESS
    let result = orchestrator
        .send(&one_trx_request(), &CountingKeySource::new(KEY_ELEVENS_HEX))
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::TransactionRejected));
    assert!(result.message.unwrap().contains("does not belong"));

    let signed = orchestrator.gateway().last_broadcast().unwrap();
    assert_eq!(signed.signature, vec![KEY_ELEVENS_SIG_AA.to_string()]);
}

// ============================================================================
// Signing
// ============================================================================

#[tokio::test]
async fn test_wrong_key_caught_before_broadcast() {
    let orchestrator = orchestrator(MockGateway::new());
    let key = CountingKeySource::new(KEY_ELEVENS_HEX);

    let err = orchestrator
        .try_send(&one_trx_request(), &key)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SigningError);
    assert!(matches!(
        err,
        TransferError::Signing(SignError::InvalidPrivateKey { .. })
    ));
    assert_eq!(orchestrator.gateway().calls(), (1, 1, 0));
    assert_eq!(key.calls(), 1);
}

#[tokio::test]
async fn test_key_source_failure_is_signing_error() {
    let orchestrator = orchestrator(MockGateway::new());
    let key = CountingKeySource::unavailable();

    let result = orchestrator.send(&one_trx_request(), &key).await;
    assert_eq!(result.error_kind, Some(ErrorKind::SigningError));
    assert_eq!(orchestrator.gateway().broadcast_calls(), 0);
}

#[tokio::test]
async fn test_closure_key_source() {
    let orchestrator = orchestrator(MockGateway::new());
    let key = || tronpay_crypto::keys::SecretKey::from_hex(KEY_ONE_HEX);

    let result = orchestrator.send(&one_trx_request(), &key).await;
    assert!(result.success);
}

#[tokio::test]
async fn test_malformed_tx_id_is_signing_error() {
    for tx_id in ["abcd".to_string(), "zz".repeat(32), String::new()] {
        let orchestrator =
            orchestrator(MockGateway::new().with_transaction(unsigned_transaction(&tx_id)));

        let err = orchestrator
            .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SigningError, "txID {tx_id:?}");
        assert_eq!(orchestrator.gateway().broadcast_calls(), 0);
    }
}

#[tokio::test]
async fn test_tx_id_guard_rejects_mismatch() {
    let orchestrator = TransferOrchestrator::new(
        MockGateway::new(),
        TransferSettings {
            verify_tx_id: true,
            ..settings()
        },
    );
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let err = orchestrator
        .try_send(&one_trx_request(), &key)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransferError::Signing(SignError::SignatureFailed { .. })
    ));
    assert_eq!(key.calls(), 0);
    assert_eq!(orchestrator.gateway().broadcast_calls(), 0);
}

#[tokio::test]
async fn test_tx_id_guard_accepts_matching_digest() {
    let tx_id = raw_data_digest();
    let orchestrator = TransferOrchestrator::new(
        MockGateway::new().with_transaction(unsigned_transaction(&tx_id)),
        TransferSettings {
            verify_tx_id: true,
            ..settings()
        },
    );

    let receipt = orchestrator
        .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await
        .unwrap();
    assert_eq!(receipt.tx_id, tx_id);
}

#[tokio::test]
async fn test_tx_id_guard_off_signs_as_given() {
    // txID unrelated to raw_data_hex is signed when the guard is off
    let orchestrator = orchestrator(MockGateway::new());
    let receipt = orchestrator
        .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await
        .unwrap();
    assert_eq!(receipt.tx_id, tx_id_aa());
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let orchestrator = orchestrator(MockGateway::new());
    let key = CountingKeySource::new(KEY_ONE_HEX);
    let (_tx, rx) = watch::channel(true);

    let err = orchestrator
        .try_send_cancellable(&one_trx_request(), &key, rx)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransferError::Cancelled {
            stage: TransferState::ValidatingInput
        }
    );
    assert_eq!(orchestrator.gateway().calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_cancel_during_create_prevents_signing_and_broadcast() {
    let (tx, rx) = watch::channel(false);
    let gateway = MockGateway::new().on_create(move || {
        tx.send_replace(true);
    });
    let orchestrator = orchestrator(gateway);
    let key = CountingKeySource::new(KEY_ONE_HEX);

    let result = orchestrator
        .send_cancellable(&one_trx_request(), &key, rx)
        .await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Cancelled));
    assert_eq!(orchestrator.gateway().calls(), (1, 1, 0));
    assert_eq!(key.calls(), 0);
}

#[tokio::test]
async fn test_cancel_after_broadcast_started_is_ignored() {
    let (tx, rx) = watch::channel(false);
    let gateway = MockGateway::new().on_broadcast(move || {
        tx.send_replace(true);
    });
    let orchestrator = orchestrator(gateway);

    let result = orchestrator
        .send_cancellable(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX), rx)
        .await;

    assert!(result.success);
    assert_eq!(orchestrator.gateway().calls(), (1, 1, 1));
}

#[tokio::test]
async fn test_uncancelled_receiver_completes() {
    let (_tx, rx) = watch::channel(false);
    let orchestrator = orchestrator(MockGateway::new());

    let receipt = orchestrator
        .try_send_cancellable(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX), rx)
        .await
        .unwrap();
    assert_eq!(receipt.explorer_url, format!("{EXPLORER}{}", tx_id_aa()));
}
