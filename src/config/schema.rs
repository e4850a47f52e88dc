//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_SERVER_KEY;

/// Root configuration for the injector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InjectorConfig {
    /// Inbound route-add API listener.
    pub listener: ListenerConfig,

    /// Caddy admin API the document is mirrored to.
    pub caddy: CaddyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "localhost:50051").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "localhost:50051".to_string(),
        }
    }
}

/// Caddy admin API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaddyConfig {
    /// Base URL of the admin API (`/config` and `/load` are appended).
    pub admin_url: String,

    /// Key under `apps.http.servers` this injector manages.
    pub server_key: String,

    /// Push the minimum document when Caddy reports no configuration.
    pub seed_initial: bool,

    /// Delay between bootstrap polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Timeout for a single admin API call in seconds.
    pub timeout_secs: u64,
}

impl CaddyConfig {
    /// Admin URL of a Caddy listening on localhost.
    pub fn local_admin_url(port: u16) -> String {
        format!("http://localhost:{}", port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CaddyConfig {
    fn default() -> Self {
        Self {
            admin_url: Self::local_admin_url(2019),
            server_key: DEFAULT_SERVER_KEY.to_string(),
            seed_initial: true,
            poll_interval_ms: 2000,
            timeout_secs: 5,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directives, overridden by `RUST_LOG`.
    pub log_filter: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "caddy_cfg_injector=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
