//! HTTP API behaviour, driven through the router with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use chainwatch_core::types::{Block, BlockResponse, Transaction};
use chainwatch_core::{EndpointClient, WatchError};
use chainwatch_engine::{EngineBuilder, IndexingEngine};
use chainwatch_server::{router, save_relay_on_shutdown, AppState};

/// Serves block 100 with a single 0xAAA → 0xBBB transfer.
struct OneBlock;

#[async_trait]
impl EndpointClient for OneBlock {
    async fn current_height(&self) -> Result<u64, WatchError> {
        Ok(100)
    }

    async fn block_at(&self, height: u64) -> Result<BlockResponse, WatchError> {
        if height != 100 {
            return Err(WatchError::Endpoint(format!("block {height} not found")));
        }
        Ok(BlockResponse::new(
            1,
            Block {
                number: 100,
                hash: "0xblock100".into(),
                transactions: vec![Transaction {
                    hash: "0xtx1".into(),
                    from: "0xAAA".into(),
                    to: Some("0xBBB".into()),
                    value: "0x2386f26fc10000".into(),
                    block_number: 100,
                }],
            },
        ))
    }
}

fn engine(relay: bool) -> Arc<IndexingEngine> {
    EngineBuilder::new().relay(relay).build(OneBlock)
}

fn app(engine: &Arc<IndexingEngine>, relay_file: impl Into<std::path::PathBuf>) -> Router {
    router(AppState::new(engine.clone(), relay_file))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn current_block_reports_indexed_height() {
    let engine = engine(false);
    let (status, body) = send(app(&engine, "relay.json"), get("/getCurrentBlock")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "current_block": 0 }));

    engine.process_height(100).await;
    let (_, body) = send(app(&engine, "relay.json"), get("/getCurrentBlock")).await;
    assert_eq!(body, json!({ "current_block": 100 }));
}

#[tokio::test]
async fn subscribe_is_true_only_the_first_time() {
    let engine = engine(false);
    let request = r#"{"address":"0xAAA"}"#;

    let (status, body) = send(app(&engine, "relay.json"), post_json("/subscribe", request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "subscribed": true }));

    let (_, body) = send(app(&engine, "relay.json"), post_json("/subscribe", request)).await;
    assert_eq!(body, json!({ "subscribed": false }));
    assert!(engine.is_subscribed("0xAAA"));
}

#[tokio::test]
async fn subscribe_rejects_malformed_body() {
    let engine = engine(false);
    for body in [r#"{"addr":"0xAAA"}"#, "not json", r#"{"address":""}"#] {
        let (status, body) = send(app(&engine, "relay.json"), post_json("/subscribe", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn transactions_require_address() {
    let engine = engine(false);
    for uri in ["/getTransactions", "/getTransactions?address="] {
        let (status, body) = send(app(&engine, "relay.json"), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing address parameter");
    }
}

#[tokio::test]
async fn transactions_use_wire_shape() {
    let engine = engine(false);
    engine.subscribe("0xAAA");
    engine.process_height(100).await;

    let (status, body) = send(app(&engine, "relay.json"), get("/getTransactions?address=0xAAA")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "hash": "0xtx1",
            "from": "0xAAA",
            "to": "0xBBB",
            "value": "0x2386f26fc10000",
            "blockNumber": "0x64",
        }])
    );

    // Never subscribed.
    let (_, body) = send(app(&engine, "relay.json"), get("/getTransactions?address=0xBBB")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn save_relay_is_absent_without_relay_mode() {
    let engine = engine(false);
    let (status, _) = send(app(&engine, "relay.json"), post_json("/saveRelay", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_relay_writes_trace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.json");
    let engine = engine(true);
    engine.process_height(100).await;

    let (status, body) = send(app(&engine, &path), post_json("/saveRelay", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "entries": 1 }));

    let trace = chainwatch_core::load_trace(&path).await.unwrap();
    assert_eq!(trace[0].block_number, 100);
}

#[tokio::test]
async fn save_relay_failure_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("relay.json");
    let engine = engine(true);

    let (status, body) = send(app(&engine, &path), post_json("/saveRelay", "")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("relay.json"));
}

#[tokio::test]
async fn shutdown_flush_follows_engine_relay_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.json");
    std::fs::write(&path, "[\"keep\"]").unwrap();

    // Not recording: an existing trace must survive.
    let idle = engine(false);
    idle.process_height(100).await;
    assert_eq!(save_relay_on_shutdown(&idle, &path).await, None);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\"keep\"]");

    let recording = engine(true);
    recording.process_height(100).await;
    assert_eq!(save_relay_on_shutdown(&recording, &path).await, Some(1));
    assert_eq!(chainwatch_core::load_trace(&path).await.unwrap().len(), 1);
}

#[tokio::test]
async fn shutdown_flush_failure_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("relay.json");
    let recording = engine(true);
    assert_eq!(save_relay_on_shutdown(&recording, &path).await, None);
}
