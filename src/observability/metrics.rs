//! Metrics collection and exposition.
//!
//! # Metrics
//! - `injector_routes` (gauge): routes in the managed server
//! - `injector_routes_added_total` (counter): accepted add-route requests
//! - `injector_route_rejections_total` (counter): rejected add-route requests, by reason
//! - `injector_pushes_total` (counter): pushes to Caddy's /load, by outcome
//! - `injector_polls_total` (counter): bootstrap polls of Caddy's /config, by outcome

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_route_count(routes: usize) {
    metrics::gauge!("injector_routes").set(routes as f64);
}

pub fn record_route_added() {
    metrics::counter!("injector_routes_added_total").increment(1);
}

pub fn record_route_rejected(reason: &'static str) {
    metrics::counter!("injector_route_rejections_total", "reason" => reason).increment(1);
}

pub fn record_push(outcome: &'static str) {
    metrics::counter!("injector_pushes_total", "outcome" => outcome).increment(1);
}

pub fn record_poll(outcome: &'static str) {
    metrics::counter!("injector_polls_total", "outcome" => outcome).increment(1);
}
