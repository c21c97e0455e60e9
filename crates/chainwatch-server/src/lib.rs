//! chainwatch-server: the HTTP API over a running [`IndexingEngine`].
//!
//! | Route                          | Response                         |
//! |--------------------------------|----------------------------------|
//! | `GET  /getCurrentBlock`        | `{"current_block": n}`           |
//! | `POST /subscribe`              | `{"subscribed": bool}`           |
//! | `GET  /getTransactions?address`| `[Transaction, ...]`             |
//! | `POST /saveRelay` (relay mode) | `{"entries": n}`                 |

pub mod api;
pub mod error;
pub mod telemetry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use chainwatch_core::types::Transaction;
use chainwatch_core::WatchError;
use chainwatch_engine::IndexingEngine;

use crate::api::{
    CurrentBlockResponse, SaveRelayResponse, SubscribeRequest, SubscribeResponse,
    TransactionsQuery,
};
pub use crate::error::ApiError;

/// Shared state of the API handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<IndexingEngine>,
    /// Where `/saveRelay` writes the trace.
    pub relay_file: PathBuf,
}

impl AppState {
    pub fn new(engine: Arc<IndexingEngine>, relay_file: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            relay_file: relay_file.into(),
        }
    }
}

/// Build the API router. `/saveRelay` is mounted only when the engine records a relay trace.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/getCurrentBlock", get(get_current_block))
        .route("/subscribe", post(subscribe))
        .route("/getTransactions", get(get_transactions));

    if state.engine.relay().is_enabled() {
        router = router.route("/saveRelay", post(save_relay));
    }

    router.with_state(state)
}

/// Flush the relay trace after the engine has stopped.
///
/// Does nothing unless the engine records a relay trace. A write failure is
/// logged and swallowed. Returns the number of entries written.
pub async fn save_relay_on_shutdown(engine: &IndexingEngine, path: &Path) -> Option<usize> {
    if !engine.relay().is_enabled() {
        return None;
    }
    tracing::info!(entries = engine.relay().len(), path = %path.display(), "saving relay trace");
    match engine.save_relay(path).await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(error = %e, "failed to save relay trace at shutdown");
            None
        }
    }
}

async fn get_current_block(State(state): State<AppState>) -> Json<CurrentBlockResponse> {
    Json(CurrentBlockResponse {
        current_block: state.engine.current_block(),
    })
}

async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let Json(request) = payload?;
    if request.address.is_empty() {
        return Err(WatchError::Validation("address must not be empty".into()).into());
    }
    Ok(Json(SubscribeResponse {
        subscribed: state.engine.subscribe(request.address),
    }))
}

async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let address = query
        .address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| WatchError::Validation("missing address parameter".into()))?;
    Ok(Json(state.engine.transactions(&address)))
}

async fn save_relay(State(state): State<AppState>) -> Result<Json<SaveRelayResponse>, ApiError> {
    let entries = state.engine.save_relay(&state.relay_file).await?;
    Ok(Json(SaveRelayResponse { entries }))
}
