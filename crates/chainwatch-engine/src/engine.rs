//! The indexing engine: polls the chain head and indexes new blocks.
//!
//! # Startup
//! Read the head once and use it as the baseline for both progress counters.
//! Nothing at or below the baseline is ever fetched. No baseline, no start.
//!
//! # Poll tick
//! Read the head again. If it moved past `latest_known`, submit every height
//! in `(latest_known, head]` for fetch-and-filter, then raise `latest_known`.
//! A failed read skips the tick; the next successful one covers the gap.
//!
//! # Fetch-and-filter
//! Fetch the block (a failure drops the height for good), record it in the
//! relay trace, append matches to the index, then raise `indexed`.
//!
//! # Shutdown
//! [`IndexingEngine::stop`] is observed at the top of the poll loop. The
//! submission queue is closed and `run` returns only after every worker has
//! drained it.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use chainwatch_core::types::Transaction;
use chainwatch_core::{
    EndpointClient, EngineConfig, EngineState, Progress, RelayRecorder, SubscriptionRegistry,
    TransactionIndex, WatchError,
};

use crate::filter::collect_matches;

/// Where submitted heights go.
enum Dispatch {
    /// Fetch on the poll loop itself.
    Inline,
    /// Hand off to the worker pool through a bounded queue.
    Queue(mpsc::Sender<u64>),
}

/// Block-polling, transaction-indexing engine.
///
/// Shared as `Arc<IndexingEngine>` between the task driving [`run`](Self::run)
/// and callers of the read/subscribe operations, which never wait on fetches.
pub struct IndexingEngine {
    config: EngineConfig,
    client: Arc<dyn EndpointClient>,
    subscriptions: SubscriptionRegistry,
    index: TransactionIndex,
    relay: RelayRecorder,
    progress: Progress,
    state: RwLock<EngineState>,
    shutdown: watch::Sender<bool>,
}

impl IndexingEngine {
    pub fn new(config: EngineConfig, client: Arc<dyn EndpointClient>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            relay: RelayRecorder::new(config.relay),
            config,
            client,
            subscriptions: SubscriptionRegistry::new(),
            index: TransactionIndex::new(),
            progress: Progress::new(),
            state: RwLock::new(EngineState::Idle),
            shutdown,
        }
    }

    // ─── Public operations ────────────────────────────────────────────────

    /// Last indexed block height.
    pub fn current_block(&self) -> u64 {
        self.progress.indexed()
    }

    pub fn latest_known_height(&self) -> u64 {
        self.progress.latest_known()
    }

    pub fn indexed_height(&self) -> u64 {
        self.progress.indexed()
    }

    /// Watch `address`. Returns `false` if it was already watched.
    pub fn subscribe(&self, address: impl Into<String>) -> bool {
        let address = address.into();
        let added = self.subscriptions.subscribe(address.clone());
        if added {
            tracing::info!(%address, watched = self.subscriptions.len(), "subscribed");
        }
        added
    }

    pub fn is_subscribed(&self, address: &str) -> bool {
        self.subscriptions.is_subscribed(address)
    }

    /// Inbound and outbound transactions indexed for `address`, in discovery order.
    pub fn transactions(&self, address: &str) -> Vec<Transaction> {
        self.index.transactions_for(address)
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    pub fn relay(&self) -> &RelayRecorder {
        &self.relay
    }

    /// Flush the relay trace to `path`.
    pub async fn save_relay(&self, path: &Path) -> Result<usize, WatchError> {
        self.relay.flush(path).await
    }

    /// Request shutdown. [`run`](Self::run) returns once in-flight fetches finish.
    pub fn stop(&self) {
        tracing::info!("stop requested");
        self.shutdown.send_replace(true);
    }

    // ─── Poll loop ────────────────────────────────────────────────────────

    /// Run the engine until [`stop`](Self::stop) is called.
    ///
    /// Fails only if the baseline height cannot be read, or if the engine has
    /// already been started.
    pub async fn run(self: Arc<Self>) -> Result<(), WatchError> {
        {
            let mut state = self.state.write();
            if *state != EngineState::Idle {
                return Err(WatchError::Validation(format!("engine already {}", *state)));
            }
            *state = EngineState::Polling;
        }
        let mut shutdown = self.shutdown.subscribe();

        let baseline = match self.client.current_height().await {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(error = %e, "failed to read baseline height");
                self.set_state(EngineState::Stopped);
                return Err(e);
            }
        };
        self.progress.advance_latest(baseline);
        self.progress.advance_indexed(baseline);
        tracing::info!(
            baseline,
            workers = self.config.fetch_workers,
            interval_ms = self.config.poll_interval_ms,
            "indexing engine started"
        );

        let (dispatch, workers) = self.spawn_workers();

        let period = self.config.poll_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            if !self.poll_once(&dispatch, &mut shutdown).await {
                break;
            }
        }

        self.set_state(EngineState::Stopping);
        drop(dispatch);
        for result in futures::future::join_all(workers).await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "fetch worker panicked");
            }
        }
        self.set_state(EngineState::Stopped);
        tracing::info!(
            latest = self.progress.latest_known(),
            indexed = self.progress.indexed(),
            "indexing engine stopped"
        );
        Ok(())
    }

    /// One tick. Returns `false` if the loop should exit.
    async fn poll_once(&self, dispatch: &Dispatch, shutdown: &mut watch::Receiver<bool>) -> bool {
        let reported = match self.client.current_height().await {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    transient = e.is_transient(),
                    "head poll failed, retrying next tick"
                );
                return true;
            }
        };

        let latest = self.progress.latest_known();
        tracing::debug!(
            latest,
            reported,
            indexed = self.progress.indexed(),
            "poll tick"
        );
        if reported <= latest {
            return true;
        }

        tracing::info!(from = latest + 1, to = reported, "submitting catch-up range");
        for height in (latest + 1)..=reported {
            match dispatch {
                Dispatch::Inline => self.process_height(height).await,
                Dispatch::Queue(tx) => {
                    tokio::select! {
                        sent = tx.send(height) => {
                            if sent.is_err() {
                                return false;
                            }
                        }
                        _ = shutdown.changed() => return false,
                    }
                }
            }
        }
        self.progress.advance_latest(reported);
        true
    }

    fn spawn_workers(self: &Arc<Self>) -> (Dispatch, Vec<JoinHandle<()>>) {
        if self.config.fetch_workers == 0 {
            return (Dispatch::Inline, Vec::new());
        }

        let (tx, rx) = mpsc::channel::<u64>(self.config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let workers = (0..self.config.fetch_workers)
            .map(|worker| {
                let engine = Arc::clone(self);
                let rx = Arc::clone(&rx);
                tokio::spawn(async move {
                    loop {
                        let next = rx.lock().await.recv().await;
                        match next {
                            Some(height) => engine.process_height(height).await,
                            None => break,
                        }
                    }
                    tracing::debug!(worker, "fetch worker drained");
                })
            })
            .collect();
        (Dispatch::Queue(tx), workers)
    }

    // ─── Fetch-and-filter ─────────────────────────────────────────────────

    /// Fetch `height`, record it, index its matches and mark it indexed.
    ///
    /// A failed fetch is logged and the height is skipped permanently.
    pub async fn process_height(&self, height: u64) {
        let response = match self.client.block_at(height).await {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(
                    height,
                    error = %e,
                    transient = e.is_transient(),
                    "block fetch failed, height skipped"
                );
                return;
            }
        };

        if self.relay.is_enabled() {
            self.relay.record(height, response.clone());
        }

        let matches = collect_matches(&self.subscriptions, response.block());
        let mut matched = 0;
        for (address, txs) in matches {
            matched += txs.len();
            self.index.record_matches(address, txs);
        }

        self.progress.advance_indexed(height);
        tracing::debug!(
            height,
            txs = response.block().transactions.len(),
            matched,
            "block indexed"
        );
    }

    fn set_state(&self, state: EngineState) {
        *self.state.write() = state;
        tracing::debug!(%state, "engine state");
    }
}
