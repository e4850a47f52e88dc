//! Mapping of inbound route descriptions to the canonical model.

use thiserror::Error;

use crate::api::types::{HandleSpec, ReverseProxySpec, RouteSpec};
use crate::model::route::UnknownProtocol;
use crate::model::{Handler, MatchRule, Route, TransportProtocol, Upstream};

/// Reasons a route description is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("id cannot be empty")]
    EmptyId,

    #[error("handles should contain at least one element")]
    NoHandles,

    #[error("none of the {0} handles is of a supported type")]
    NoSupportedHandles(usize),

    #[error(transparent)]
    Protocol(#[from] UnknownProtocol),
}

impl RouteError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RouteError::EmptyId => "empty_id",
            RouteError::NoHandles => "no_handles",
            RouteError::NoSupportedHandles(_) => "unsupported_handles",
            RouteError::Protocol(_) => "unknown_protocol",
        }
    }
}

/// Validate `spec` and build the canonical route.
///
/// Handles of an unknown kind are dropped with a warning; the route is still
/// accepted as long as one handle remains.
pub fn translate(spec: &RouteSpec) -> Result<Route, RouteError> {
    if spec.id.is_empty() {
        return Err(RouteError::EmptyId);
    }
    if spec.handles.is_empty() {
        return Err(RouteError::NoHandles);
    }

    let mut handlers = Vec::with_capacity(spec.handles.len());
    for handle in &spec.handles {
        if let Some(handler) = translate_handle(&spec.id, handle)? {
            handlers.push(handler);
        }
    }
    if handlers.is_empty() {
        return Err(RouteError::NoSupportedHandles(spec.handles.len()));
    }

    let matches = spec
        .matches
        .iter()
        .map(|m| MatchRule::from_patterns(&m.hosts, &m.paths))
        .collect();

    Ok(Route::new(spec.id.clone(), handlers, matches))
}

fn translate_handle(route_id: &str, handle: &HandleSpec) -> Result<Option<Handler>, RouteError> {
    match &handle.reverse_proxy {
        Some(proxy) => reverse_proxy(proxy).map(Some),
        None => {
            let kinds: Vec<&str> = handle.other.keys().map(String::as_str).collect();
            tracing::warn!(route_id = %route_id, kinds = ?kinds, "Unknown handler type, dropping it");
            Ok(None)
        }
    }
}

fn reverse_proxy(spec: &ReverseProxySpec) -> Result<Handler, RouteError> {
    let protocol = match spec.transport.as_ref().and_then(|t| t.protocol.as_deref()) {
        Some(name) => name.parse()?,
        None => TransportProtocol::Http,
    };

    let upstreams = spec
        .upstreams
        .iter()
        .map(|u| Upstream::new(&u.dial.host, u.dial.port))
        .collect();

    Ok(Handler::reverse_proxy(protocol, upstreams))
}
