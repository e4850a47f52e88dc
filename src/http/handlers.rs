use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::{AddRouteReply, AddRouteRequest};
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    /// `ready` once the document is initialized, `waiting` before.
    pub status: &'static str,
    pub routes: usize,
}

pub async fn add_route(
    State(state): State<AppState>,
    Json(request): Json<AddRouteRequest>,
) -> Json<AddRouteReply> {
    Json(state.injector.add_route(&request.route))
}

pub async fn get_config(State(state): State<AppState>) -> Response {
    match state.injector.store().snapshot() {
        Ok(document) => (
            [(header::CONTENT_TYPE, "application/json")],
            document,
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(AddRouteReply::error(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let store = state.injector.store();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if store.is_empty() { "waiting" } else { "ready" },
        routes: store.route_count(),
    })
}
