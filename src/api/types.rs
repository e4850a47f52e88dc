//! Request and reply bodies of the route-add API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddRouteRequest {
    pub route: RouteSpec,
}

/// Inbound description of a route, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSpec {
    pub id: String,
    pub handles: Vec<HandleSpec>,
    pub matches: Vec<MatchSpec>,
}

/// One handler. Exactly one kind key is expected; anything the injector does
/// not know ends up in `other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_proxy: Option<ReverseProxySpec>,

    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl HandleSpec {
    pub fn reverse_proxy(spec: ReverseProxySpec) -> Self {
        Self {
            reverse_proxy: Some(spec),
            other: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseProxySpec {
    /// Missing transport means HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportSpec>,
    pub upstreams: Vec<UpstreamSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSpec {
    /// `http` or `fastcgi`, case-insensitive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSpec {
    pub dial: DialSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialSpec {
    pub host: String,
    pub port: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSpec {
    pub hosts: Vec<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyResult {
    Ok,
    Error,
}

/// Reply to a route-add request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRouteReply {
    pub result: ReplyResult,
    pub message: String,
}

impl AddRouteReply {
    pub fn ok() -> Self {
        Self {
            result: ReplyResult::Ok,
            message: "ok".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: ReplyResult::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == ReplyResult::Ok
    }
}
