use std::time::Duration;

use injector_sdk::client::Route;
use injector_sdk::{periodically, InjectorClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:50051".to_string());
    let client = InjectorClient::new(&addr)?;

    let route = Route::reverse_proxy(
        "example.com",
        "localhost",
        8080,
        &["example.com", "beta.example.com"],
        &["/*"],
    );

    // Keep re-registering for a while in case Caddy comes up later.
    let (client, route) = (&client, &route);
    periodically(
        tokio::time::sleep(Duration::from_secs(5)),
        Duration::from_secs(2),
        move || client.register(route),
    )
    .await;

    Ok(())
}
