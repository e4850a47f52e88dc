//! Caddy configuration injector.
//!
//! Accepts route-add requests, merges them into a canonical copy of Caddy's
//! JSON configuration, and keeps Caddy in sync through its admin API.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /routes                                     Caddy admin API
//!   ───────────▶ http ──▶ api::Injector                ▲        │
//!                              │ upsert                │ /load  │ /config
//!                              ▼                       │        ▼
//!                        store::ConfigStore ─▶ mailbox ─▶ reconciler
//!                              ▲
//!                              └──────── bootstrap poller ◀─────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use caddy_cfg_injector::config::loader::{read_config, ConfigError};
use caddy_cfg_injector::config::schema::CaddyConfig;
use caddy_cfg_injector::config::validation::validate_config;
use caddy_cfg_injector::config::InjectorConfig;
use caddy_cfg_injector::lifecycle::{self, signals, Shutdown};
use caddy_cfg_injector::observability;

#[derive(Parser, Debug)]
#[command(name = "caddy-cfg-injector", version)]
#[command(about = "Merges route-add requests into Caddy's configuration", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API host. --host="" to expose on all interfaces.
    #[arg(long)]
    host: Option<String>,

    /// API port.
    #[arg(long)]
    port: Option<u16>,

    /// Port of a Caddy admin API on localhost to poll and patch.
    #[arg(long)]
    caddy_port: Option<u16>,

    /// Full Caddy admin API URL; wins over --caddy-port.
    #[arg(long)]
    caddy_url: Option<String>,

    /// Attempt to send an initial config to Caddy if it returns an empty one.
    #[arg(long)]
    init: Option<bool>,
}

impl Args {
    fn apply(&self, config: &mut InjectorConfig) {
        if self.host.is_some() || self.port.is_some() {
            let (current_host, current_port) = config
                .listener
                .bind_address
                .rsplit_once(':')
                .unwrap_or(("localhost", "50051"));

            let host = match self.host.as_deref() {
                Some("") => "0.0.0.0",
                Some(host) => host,
                None => current_host,
            };
            let port = self
                .port
                .map(|p| p.to_string())
                .unwrap_or_else(|| current_port.to_string());
            config.listener.bind_address = format!("{}:{}", host, port);
        }

        if let Some(port) = self.caddy_port {
            config.caddy.admin_url = CaddyConfig::local_admin_url(port);
        }
        if let Some(url) = &self.caddy_url {
            config.caddy.admin_url = url.clone();
        }
        if let Some(init) = self.init {
            config.caddy.seed_initial = init;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => InjectorConfig::default(),
    };
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    observability::logging::init_logging(&config.observability)?;
    tracing::info!("caddy-cfg-injector v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        admin_url = %config.caddy.admin_url,
        seed_initial = config.caddy.seed_initial,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = observability::metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "caddycfginjector listens");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    lifecycle::run(config, listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides() {
        let args = Args::parse_from([
            "caddy-cfg-injector",
            "--host=",
            "--port",
            "6000",
            "--caddy-port",
            "2020",
            "--init",
            "false",
        ]);
        let mut config = InjectorConfig::default();
        args.apply(&mut config);

        assert_eq!(config.listener.bind_address, "0.0.0.0:6000");
        assert_eq!(config.caddy.admin_url, "http://localhost:2020");
        assert!(!config.caddy.seed_initial);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["caddy-cfg-injector"]);
        let mut config = InjectorConfig::default();
        args.apply(&mut config);

        assert_eq!(config.listener.bind_address, "localhost:50051");
        assert_eq!(config.caddy.admin_url, "http://localhost:2019");
        assert!(config.caddy.seed_initial);
    }
}
