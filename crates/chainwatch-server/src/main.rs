//! `chainwatch` server binary.
//!
//! Starts the indexing engine against a live or replayed endpoint and serves
//! the HTTP API until SIGINT/SIGTERM. On shutdown the HTTP server drains
//! first, then the engine, then the relay trace is flushed (relay mode only).

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use chainwatch_core::config::DEFAULT_ENDPOINT;
use chainwatch_core::{EngineConfig, WatchConfig};
use chainwatch_engine::EngineBuilder;
use chainwatch_server::telemetry::{init_tracing, LogConfig};
use chainwatch_server::{router, save_relay_on_shutdown, AppState};

/// Command-line arguments. Every flag falls back to an environment variable.
#[derive(Parser, Debug)]
#[command(name = "chainwatch", version, about = "Ethereum block polling and transaction indexing server")]
struct Args {
    /// HTTP API listen port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Upstream JSON-RPC endpoint URL
    #[arg(long, env = "ETH_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Record fetched blocks and expose POST /saveRelay
    #[arg(long, env = "RELAY")]
    relay: bool,

    /// Replay the relay file instead of contacting the endpoint
    #[arg(long, env = "MOCK")]
    mock: bool,

    /// Relay trace file
    #[arg(long, env = "RELAY_FILE", default_value = "testdata/relay.json")]
    relay_file: PathBuf,

    /// Per-request timeout for the live endpoint (milliseconds)
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    request_timeout_ms: u64,

    /// Pause before every replayed call in mock mode (milliseconds)
    #[arg(long, env = "REPLAY_STEP_MS", default_value_t = 0)]
    replay_step_ms: u64,

    /// Head polling interval (milliseconds)
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 10_000)]
    poll_interval_ms: u64,

    /// Concurrent block fetchers (0 fetches inline)
    #[arg(long, env = "FETCH_WORKERS", default_value_t = 4)]
    fetch_workers: usize,

    /// Capacity of the fetch submission queue
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 10)]
    queue_capacity: usize,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.log_json,
        }
    }

    fn into_config(self) -> WatchConfig {
        WatchConfig {
            listen_port: self.port,
            endpoint_url: self.endpoint,
            relay: self.relay,
            mock: self.mock,
            relay_file: self.relay_file,
            request_timeout_ms: self.request_timeout_ms,
            replay_step_ms: self.replay_step_ms,
            engine: EngineConfig {
                poll_interval_ms: self.poll_interval_ms,
                fetch_workers: self.fetch_workers,
                queue_capacity: self.queue_capacity,
                relay: self.relay,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_config());

    let config = args.into_config();
    config.validate().context("invalid configuration")?;
    tracing::info!(
        port = config.listen_port,
        mock = config.mock,
        relay = config.relay,
        workers = config.engine.fetch_workers,
        "starting chainwatch"
    );

    let client = chainwatch_rpc::connect(&config)
        .await
        .context("failed to create endpoint client")?;
    let engine = EngineBuilder::from_config(&config.engine_config()).build_shared(client);
    let mut engine_task = tokio::spawn(engine.clone().run());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP API listening");

    let app = router(AppState::new(engine.clone(), config.relay_file.clone()));
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        result = &mut engine_task => {
            // The engine only returns on its own when it cannot start.
            result
                .context("indexing engine panicked")?
                .context("indexing engine failed to start")?;
            return Ok(());
        }
        result = server => {
            result.context("HTTP server error")?;
        }
    }

    tracing::info!("HTTP API stopped, draining engine");
    engine.stop();
    engine_task
        .await
        .context("indexing engine panicked")?
        .context("indexing engine failed")?;

    save_relay_on_shutdown(&engine, &config.relay_file).await;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("received shutdown signal");
}
