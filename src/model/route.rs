//! Route definitions as they appear in Caddy's `routes` array.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

const REVERSE_PROXY: &str = "reverse_proxy";

/// One named rule set (match + handlers) within the document.
///
/// Identity is the `@id`: the store replaces or appends by id only, the rest
/// of the content is never compared. Routes Caddy already had may carry no
/// id at all; those are kept but can never be replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "@id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "handle", default)]
    pub handlers: Vec<Handler>,

    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchRule>,

    /// Route fields the injector does not model (`terminal`, `group`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    pub fn new(id: impl Into<String>, handlers: Vec<Handler>, matches: Vec<MatchRule>) -> Self {
        Self {
            id: id.into(),
            handlers,
            matches,
            extra: Map::new(),
        }
    }
}

/// Route handler, tagged on the wire by its `handler` field.
///
/// Only plain reverse proxies are typed. Any other handler, including a
/// reverse proxy using options outside this model, is kept verbatim so an
/// adopted document is pushed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// Forward matched requests to one of the upstreams.
    ReverseProxy {
        transport: Option<Transport>,
        upstreams: Vec<Upstream>,
    },
    /// Opaque handler object, `handler` key included.
    Other(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReverseProxyFields {
    #[serde(default)]
    transport: Option<Transport>,
    #[serde(default)]
    upstreams: Vec<Upstream>,
}

impl<'de> Deserialize<'de> for Handler {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;

        if fields.get("handler").and_then(Value::as_str) == Some(REVERSE_PROXY) {
            let mut body = fields.clone();
            body.remove("handler");
            if let Ok(proxy) = serde_json::from_value::<ReverseProxyFields>(Value::Object(body)) {
                return Ok(Handler::ReverseProxy {
                    transport: proxy.transport,
                    upstreams: proxy.upstreams,
                });
            }
        }
        Ok(Handler::Other(fields))
    }
}

impl Serialize for Handler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Handler::ReverseProxy { transport, upstreams } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("handler", REVERSE_PROXY)?;
                if let Some(transport) = transport {
                    map.serialize_entry("transport", transport)?;
                }
                map.serialize_entry("upstreams", upstreams)?;
                map.end()
            }
            Handler::Other(fields) => fields.serialize(serializer),
        }
    }
}

impl Handler {
    pub fn reverse_proxy(protocol: TransportProtocol, upstreams: Vec<Upstream>) -> Self {
        Handler::ReverseProxy {
            transport: Some(Transport { protocol }),
            upstreams,
        }
    }

    /// Handler kind as Caddy names it.
    pub fn kind(&self) -> &str {
        match self {
            Handler::ReverseProxy { .. } => REVERSE_PROXY,
            Handler::Other(fields) => fields
                .get("handler")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transport {
    pub protocol: TransportProtocol,
}

/// Transport protocol used to reach upstreams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    #[default]
    Http,
    Fastcgi,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Http => "http",
            TransportProtocol::Fastcgi => "fastcgi",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transport protocol: {0:?}")]
pub struct UnknownProtocol(pub String);

impl FromStr for TransportProtocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(TransportProtocol::Http),
            "fastcgi" => Ok(TransportProtocol::Fastcgi),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Upstream {
    /// `host:port` target.
    pub dial: String,
}

impl Upstream {
    pub fn new(host: &str, port: u32) -> Self {
        Self {
            dial: format!("{}:{}", host, port),
        }
    }
}

/// Host and path patterns of a single Caddy matcher set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    #[serde(rename = "host", default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(rename = "path", default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,

    /// Other matchers (`method`, `header`, `not`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchRule {
    /// Build a rule from borrowed patterns. The rule owns fresh copies.
    pub fn from_patterns(hosts: &[String], paths: &[String]) -> Self {
        Self {
            hosts: hosts.to_vec(),
            paths: paths.to_vec(),
            extra: Map::new(),
        }
    }
}
