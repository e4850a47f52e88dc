//! Bootstrap poller: adopts Caddy's existing document at startup.
//!
//! # State Machine
//! ```text
//! Polling ──(non-empty document installed)──▶ Adopted
//!    ▲  │
//!    └──┘ fetch error / null document / rejected document
//! ```
//!
//! The first attempt fires almost immediately; later attempts wait for the
//! poll interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::admin::AdminApi;
use crate::model::ConfigDocument;
use crate::observability::metrics;
use crate::store::ConfigStore;

const FIRST_ATTEMPT_DELAY: Duration = Duration::from_millis(1);

/// Only every `EMPTY_LOG_EVERY`-th "no configuration" occurrence is logged.
const EMPTY_LOG_EVERY: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Adopted,
}

/// Result of a single poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Caddy could not be reached.
    Unreachable,
    /// Caddy has no configuration yet.
    Empty,
    /// Caddy's document could not be installed.
    Rejected,
    /// Caddy's document is now the store's document.
    Adopted,
    /// The store was initialized by someone else; nothing to adopt.
    AlreadyInitialized,
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollOutcome::Adopted | PollOutcome::AlreadyInitialized)
    }
}

pub struct BootstrapPoller {
    admin: Arc<dyn AdminApi>,
    store: Arc<ConfigStore>,
    seed_initial: bool,
    interval: Duration,
    empty_polls: u64,
}

impl BootstrapPoller {
    pub fn new(
        admin: Arc<dyn AdminApi>,
        store: Arc<ConfigStore>,
        seed_initial: bool,
        interval: Duration,
    ) -> Self {
        Self {
            admin,
            store,
            seed_initial,
            interval,
            empty_polls: 0,
        }
    }

    /// Poll until a document is adopted or shutdown is signalled.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> PollState {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            seed_initial = self.seed_initial,
            "Bootstrap poller starting"
        );

        let timer = time::sleep(FIRST_ATTEMPT_DELAY);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Bootstrap poller received shutdown signal, exiting loop");
                    return PollState::Polling;
                }
                _ = &mut timer => {
                    if self.poll_once().await.is_terminal() {
                        return PollState::Adopted;
                    }
                    timer.as_mut().reset(Instant::now() + self.interval);
                }
            }
        }
    }

    /// One fetch-and-adopt attempt.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let outcome = match self.admin.fetch_config().await {
            Err(e) => {
                tracing::error!(error = %e, "Caddy config request failed");
                PollOutcome::Unreachable
            }
            Ok(None) => {
                self.handle_empty().await;
                PollOutcome::Empty
            }
            Ok(Some(conf)) => self.adopt(&conf),
        };

        metrics::record_poll(match outcome {
            PollOutcome::Unreachable => "unreachable",
            PollOutcome::Empty => "empty",
            PollOutcome::Rejected => "rejected",
            PollOutcome::Adopted => "adopted",
            PollOutcome::AlreadyInitialized => "already_initialized",
        });
        outcome
    }

    async fn handle_empty(&mut self) {
        if self.seed_initial {
            tracing::info!("Attempting to inject initial config");
            match serde_json::to_string(&ConfigDocument::minimum(self.store.server_key())) {
                Ok(seed) => {
                    if let Err(e) = self.admin.load_config(&seed).await {
                        tracing::error!(error = %e, "Injecting initial config failed");
                    }
                }
                Err(e) => tracing::error!(error = %e, "Serializing initial config failed"),
            }
        }

        self.empty_polls += 1;
        if warns_on_empty(self.empty_polls) {
            tracing::warn!(
                occurrences = self.empty_polls,
                "Caddy config is empty, skipping incoming routes"
            );
        }
    }

    fn adopt(&self, conf: &str) -> PollOutcome {
        match self.store.install_if_empty(conf.as_bytes()) {
            Ok(true) => {
                tracing::info!(conf = %conf, "Caddy initial config received");
                PollOutcome::Adopted
            }
            Ok(false) => {
                tracing::info!("Store already initialized, not adopting caddy config");
                PollOutcome::AlreadyInitialized
            }
            Err(e) => {
                tracing::error!(conf = %conf, error = %e, "Caddy initial config rejected");
                PollOutcome::Rejected
            }
        }
    }
}

/// Whether the `occurrence`-th empty poll (counting from 1) is logged.
fn warns_on_empty(occurrence: u64) -> bool {
    occurrence % EMPTY_LOG_EVERY == 1
}
