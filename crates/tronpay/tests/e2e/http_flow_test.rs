//! Full-stack transfers: orchestrator, TronGrid adapter, and a mock node.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::significant_drop_tightening
)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tronpay::transfer::TransferOrchestrator;
use tronpay_core::config::Config;
use tronpay_core::error::ErrorKind;
use tronpay_gateway::TronGridGateway;

use crate::common::{
    one_trx_request, settings, tx_id_aa, unsigned_transaction, CountingKeySource, EXPLORER,
    KEY_ONE_HEX, KEY_ONE_SIG_AA,
};

#[derive(Default)]
struct NodeLog {
    api_keys: Vec<Option<String>>,
    created: Vec<Value>,
    broadcast: Vec<Value>,
}

/// A node holding `balance` sun for every account, or unknown accounts when
/// `balance` is `None`.
async fn spawn_node(balance: Option<u64>, broadcast_reply: Value) -> (String, Arc<Mutex<NodeLog>>) {
    let log = Arc::new(Mutex::new(NodeLog::default()));

    let account_log = Arc::clone(&log);
    let create_log = Arc::clone(&log);
    let broadcast_log = Arc::clone(&log);

    let app = Router::new()
        .route(
            "/v1/accounts/{address}",
            get(move |headers: HeaderMap| {
                let log = Arc::clone(&account_log);
                async move {
                    log.lock().unwrap().api_keys.push(
                        headers
                            .get("TRON-PRO-API-KEY")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                    );
                    match balance {
                        Some(balance) => (
                            StatusCode::OK,
                            Json(json!({"success": true, "data": [{"balance": balance}]})),
                        ),
                        None => (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"success": false, "error": "account not found"})),
                        ),
                    }
                }
            }),
        )
        .route(
            "/wallet/createtransaction",
            post(move |Json(body): Json<Value>| {
                let log = Arc::clone(&create_log);
                async move {
                    log.lock().unwrap().created.push(body);
                    Json(serde_json::to_value(unsigned_transaction(&tx_id_aa())).unwrap())
                }
            }),
        )
        .route(
            "/wallet/broadcasttransaction",
            post(move |Json(body): Json<Value>| {
                let log = Arc::clone(&broadcast_log);
                let reply = broadcast_reply.clone();
                async move {
                    log.lock().unwrap().broadcast.push(body);
                    Json(reply)
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{addr}"), log)
}

#[tokio::test]
async fn test_transfer_over_http() {
    let (base, log) = spawn_node(
        Some(5_000_000),
        json!({"result": true, "txid": tx_id_aa()}),
    )
    .await;

    let config = Config::builder()
        .base_url(&base)
        .api_key("node-key")
        .explorer_base_url(EXPLORER)
        .timeout_secs(5)
        .build();
    let orchestrator = TransferOrchestrator::from_config(&config).unwrap();

    let result = orchestrator
        .send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await;

    assert!(result.success, "transfer failed: {:?}", result.message);
    assert_eq!(result.explorer_url, Some(format!("{EXPLORER}{}", tx_id_aa())));

    let log = log.lock().unwrap();
    assert_eq!(log.api_keys, vec![Some("node-key".to_string())]);
    assert_eq!(log.created.len(), 1);
    assert_eq!(log.created[0]["amount"], json!(1_000_000));
    assert_eq!(log.created[0]["visible"], json!(true));
    assert_eq!(log.broadcast.len(), 1);
    assert_eq!(log.broadcast[0]["txID"], json!(tx_id_aa()));
    assert_eq!(log.broadcast[0]["signature"], json!([KEY_ONE_SIG_AA]));
}

#[tokio::test]
async fn test_unknown_account_over_http_is_insufficient_balance() {
    let (base, log) = spawn_node(None, json!({"result": true})).await;

    let gateway = TronGridGateway::builder(&base)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let orchestrator = TransferOrchestrator::new(gateway, settings());

    let result = orchestrator
        .send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::InsufficientBalance));
    let log = log.lock().unwrap();
    assert_eq!(log.api_keys, vec![None]);
    assert!(log.created.is_empty());
    assert!(log.broadcast.is_empty());
}

#[tokio::test]
async fn test_sigerror_over_http() {
    let (base, _log) = spawn_node(
        Some(5_000_000),
        json!({
            "code": "SIGERROR",
            "message": hex::encode("validate signature error")
        }),
    )
    .await;

    let gateway = TronGridGateway::builder(&base).build().unwrap();
    let orchestrator = TransferOrchestrator::new(gateway, settings());

    let err = orchestrator
        .try_send(&one_trx_request(), &CountingKeySource::new(KEY_ONE_HEX))
        .await
        .unwrap_err();

    assert!(err.is_signature_mismatch());
    assert_eq!(err.kind(), ErrorKind::TransactionRejected);
}
