//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the store, the Caddy admin client and the push mailbox
//! - Start the bootstrap poller and push reconciler
//! - Serve the route-add API until shutdown, then wait for the loops

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::{AdminApi, AdminError, CaddyAdminClient};
use crate::api::Injector;
use crate::config::InjectorConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::store::ConfigStore;
use crate::sync::{BootstrapPoller, PushMailbox, PushReconciler};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build caddy admin client: {0}")]
    Admin(#[from] AdminError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the process runs, wired together but not started.
pub struct Services {
    pub injector: Arc<Injector>,
    pub poller: BootstrapPoller,
    pub reconciler: PushReconciler,
}

impl Services {
    pub fn new(config: &InjectorConfig, admin: Arc<dyn AdminApi>) -> Self {
        let store = Arc::new(ConfigStore::new(config.caddy.server_key.clone()));
        let (mailbox, mailbox_rx) = PushMailbox::channel();

        let poller = BootstrapPoller::new(
            admin.clone(),
            store.clone(),
            config.caddy.seed_initial,
            config.caddy.poll_interval(),
        );
        let reconciler = PushReconciler::new(admin, mailbox_rx);
        let injector = Arc::new(Injector::new(store, mailbox));

        Self {
            injector,
            poller,
            reconciler,
        }
    }

    /// Services talking to the Caddy admin API named in `config`.
    pub fn from_config(config: &InjectorConfig) -> Result<Self, StartupError> {
        let admin = CaddyAdminClient::new(&config.caddy.admin_url, config.caddy.timeout())?;
        Ok(Self::new(config, Arc::new(admin)))
    }
}

/// Run the injector on `listener` until `shutdown` is triggered.
pub async fn run(
    config: InjectorConfig,
    listener: TcpListener,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let Services {
        injector,
        poller,
        reconciler,
    } = Services::from_config(&config)?;

    tracing::info!(
        admin_url = %config.caddy.admin_url,
        server_key = %config.caddy.server_key,
        "Starting caddy sync loops"
    );
    let poller_task = tokio::spawn(poller.run(shutdown.subscribe()));
    let reconciler_task = tokio::spawn(reconciler.run(shutdown.subscribe()));

    let server = HttpServer::new(config, injector);
    let served = server.run(listener, shutdown.subscribe()).await;

    // Stop the loops as well if the server ended on its own.
    shutdown.trigger();
    match poller_task.await {
        Ok(state) => tracing::debug!(state = ?state, "Bootstrap poller finished"),
        Err(e) => tracing::error!(error = %e, "Bootstrap poller task failed"),
    }
    if let Err(e) = reconciler_task.await {
        tracing::error!(error = %e, "Push reconciler task failed");
    }

    served?;
    Ok(())
}
