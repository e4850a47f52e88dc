//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use caddy_cfg_injector::config::InjectorConfig;
use caddy_cfg_injector::lifecycle::{self, Shutdown, StartupError};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Recorded state of a pretend Caddy admin API.
#[derive(Default)]
pub struct MockCaddyState {
    pub config: Mutex<Option<String>>,
    pub loads: Mutex<Vec<String>>,
    pub fetches: AtomicUsize,
    pub fail_loads: AtomicBool,
}

pub struct MockCaddy {
    pub addr: SocketAddr,
    pub state: Arc<MockCaddyState>,
}

#[allow(dead_code)]
impl MockCaddy {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn loads(&self) -> Vec<String> {
        self.state.loads.lock().unwrap().clone()
    }

    pub fn last_load(&self) -> Option<serde_json::Value> {
        self.loads()
            .last()
            .map(|doc| serde_json::from_str(doc).unwrap())
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }
}

async fn read_config(State(state): State<Arc<MockCaddyState>>) -> String {
    state.fetches.fetch_add(1, Ordering::SeqCst);
    let current = state.config.lock().unwrap().clone();
    current.unwrap_or_else(|| "null\n".to_string())
}

async fn load_config(State(state): State<Arc<MockCaddyState>>, body: String) -> (StatusCode, String) {
    state.loads.lock().unwrap().push(body.clone());
    if state.fail_loads.load(Ordering::SeqCst) {
        return (StatusCode::BAD_REQUEST, "{\"error\":\"loading config\"}".to_string());
    }
    *state.config.lock().unwrap() = Some(body);
    (StatusCode::OK, String::new())
}

/// Start a mock Caddy admin API on a free loopback port.
pub async fn start_mock_caddy(initial: Option<&str>) -> MockCaddy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(MockCaddyState {
        config: Mutex::new(initial.map(str::to_string)),
        ..Default::default()
    });

    let app = Router::new()
        .route("/config", get(read_config))
        .route("/load", post(load_config))
        .with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockCaddy { addr, state }
}

pub struct RunningInjector {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), StartupError>>,
}

#[allow(dead_code)]
impl RunningInjector {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger shutdown and wait for every task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("injector should shut down promptly")
            .unwrap()
            .unwrap();
    }
}

/// Start the injector against `caddy_url` with a fast poll interval.
pub async fn start_injector(caddy_url: &str, seed_initial: bool) -> RunningInjector {
    let mut config = InjectorConfig::default();
    config.caddy.admin_url = caddy_url.to_string();
    config.caddy.seed_initial = seed_initial;
    config.caddy.poll_interval_ms = 50;
    config.caddy.timeout_secs = 1;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let task = tokio::spawn(lifecycle::run(config, listener, shutdown.clone()));

    RunningInjector {
        addr,
        shutdown,
        task,
    }
}

/// Poll `check` until it returns true or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
