use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::{get, post}, Router};

type Config = Arc<Mutex<Option<String>>>;

async fn read_config(State(config): State<Config>) -> String {
    let current = config.lock().unwrap().clone();
    current.unwrap_or_else(|| "null\n".to_string())
}

async fn load_config(State(config): State<Config>, body: String) -> &'static str {
    println!("Loaded config: {}", body);
    *config.lock().unwrap() = Some(body);
    "{}"
}

#[tokio::main]
async fn main() {
    let config: Config = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route("/config", get(read_config))
        .route("/load", post(load_config))
        .with_state(config);

    let addr = SocketAddr::from(([127, 0, 0, 1], 2019));
    println!("Pretend Caddy admin API is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
