//! The configuration document mirrored to Caddy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::route::Route;

/// Server entry managed when no other key is configured.
pub const DEFAULT_SERVER_KEY: &str = "myserver";

/// Listen address of the minimum document.
pub const DEFAULT_LISTEN: &str = ":443";

/// Root of Caddy's JSON configuration (`apps.http.servers`).
///
/// Every level keeps the fields it does not model in `extra`, so a document
/// adopted from Caddy goes back out with them intact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub apps: Apps,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apps {
    #[serde(default)]
    pub http: HttpApp,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpApp {
    #[serde(default)]
    pub servers: BTreeMap<String, Server>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single Caddy HTTP server: its listener configuration and routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic_https: Option<AutomaticHttps>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<Vec<String>>,

    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticHttps {
    /// Domains excluded from automatic HTTPS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of merging one route into a server's route list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Replaced(usize),
    Appended(usize),
}

impl Server {
    /// Baseline listener configuration with no routes.
    pub fn minimum() -> Self {
        Self {
            automatic_https: Some(AutomaticHttps {
                skip: Some(Vec::new()),
                ..Default::default()
            }),
            listen: Some(vec![DEFAULT_LISTEN.to_string()]),
            ..Default::default()
        }
    }

    /// True until both `listen` and `automatic_https.skip` have been set.
    pub fn is_uninitialized(&self) -> bool {
        let skip_missing = self
            .automatic_https
            .as_ref()
            .map_or(true, |https| https.skip.is_none());
        skip_missing || self.listen.is_none()
    }

    /// Replace the route with the same id in place, or append it.
    pub fn upsert_route(&mut self, route: Route) -> Upsert {
        match self.routes.iter().position(|r| r.id == route.id) {
            Some(index) => {
                self.routes[index] = route;
                Upsert::Replaced(index)
            }
            None => {
                self.routes.push(route);
                Upsert::Appended(self.routes.len() - 1)
            }
        }
    }
}

impl ConfigDocument {
    /// The default document: one server with `listen: [":443"]`, an empty
    /// skip list and no routes.
    pub fn minimum(server_key: &str) -> Self {
        let mut doc = Self::default();
        doc.apps
            .http
            .servers
            .insert(server_key.to_string(), Server::minimum());
        doc
    }

    /// Standalone document carrying a single route on top of the minimum one.
    pub fn with_route(server_key: &str, route: Route) -> Self {
        let mut doc = Self::minimum(server_key);
        if let Some(server) = doc.server_mut(server_key) {
            server.upsert_route(route);
        }
        doc
    }

    pub fn server(&self, server_key: &str) -> Option<&Server> {
        self.apps.http.servers.get(server_key)
    }

    pub fn server_mut(&mut self, server_key: &str) -> Option<&mut Server> {
        self.apps.http.servers.get_mut(server_key)
    }

    /// Emptiness is decided by the listener configuration of the managed
    /// server only; routes do not count.
    pub fn is_empty(&self, server_key: &str) -> bool {
        self.server(server_key).map_or(true, Server::is_uninitialized)
    }

    /// Routes of the managed server, in document order.
    pub fn routes(&self, server_key: &str) -> &[Route] {
        self.server(server_key).map_or(&[], |s| s.routes.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str) -> Route {
        Route::new(id, Vec::new(), Vec::new())
    }

    #[test]
    fn test_default_document_is_empty() {
        let doc = ConfigDocument::default();
        assert!(doc.is_empty(DEFAULT_SERVER_KEY));
        assert!(doc.routes(DEFAULT_SERVER_KEY).is_empty());
    }

    #[test]
    fn test_minimum_round_trip() {
        let doc = ConfigDocument::minimum(DEFAULT_SERVER_KEY);
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: ConfigDocument = serde_json::from_str(&json).unwrap();

        assert!(!parsed.is_empty(DEFAULT_SERVER_KEY));
        let server = parsed.server(DEFAULT_SERVER_KEY).unwrap();
        assert_eq!(server.listen, Some(vec![":443".to_string()]));
        assert_eq!(server.automatic_https.as_ref().and_then(|h| h.skip.clone()), Some(vec![]));
        assert!(server.routes.is_empty());
    }

    #[test]
    fn test_minimum_wire_format() {
        let json = serde_json::to_string(&ConfigDocument::minimum("myserver")).unwrap();
        assert_eq!(
            json,
            r#"{"apps":{"http":{"servers":{"myserver":{"automatic_https":{"skip":[]},"listen":[":443"],"routes":[]}}}}}"#
        );
    }

    #[test]
    fn test_emptiness_needs_listen_and_skip() {
        let no_skip = r#"{"apps":{"http":{"servers":{"myserver":{"listen":[":443"]}}}}}"#;
        let doc: ConfigDocument = serde_json::from_str(no_skip).unwrap();
        assert!(doc.is_empty("myserver"));

        let no_listen = r#"{"apps":{"http":{"servers":{"myserver":{"automatic_https":{"skip":[]}}}}}}"#;
        let doc: ConfigDocument = serde_json::from_str(no_listen).unwrap();
        assert!(doc.is_empty("myserver"));

        let other_key = ConfigDocument::minimum("other");
        assert!(other_key.is_empty("myserver"));
        assert!(!other_key.is_empty("other"));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut server = Server::minimum();
        assert_eq!(server.upsert_route(route("0")), Upsert::Appended(0));
        assert_eq!(server.upsert_route(route("1")), Upsert::Appended(1));
        assert_eq!(server.upsert_route(route("0")), Upsert::Replaced(0));

        let ids: Vec<_> = server.routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[test]
    fn test_unmodelled_fields_round_trip() {
        let json = r#"{
            "admin":{"listen":"localhost:2019"},
            "apps":{
                "tls":{"automation":{"policies":[]}},
                "http":{"http_port":8080,"servers":{"myserver":{
                    "automatic_https":{"skip":["a.lan"],"disable_redirects":true},
                    "listen":[":443"],
                    "logs":{"default_logger_name":"log0"},
                    "routes":[{"handle":[{"handler":"file_server","root":"/srv"}]}]
                }}}
            }
        }"#;
        let mut doc: ConfigDocument = serde_json::from_str(json).unwrap();
        assert!(!doc.is_empty("myserver"));

        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap(), original);

        doc.server_mut("myserver").unwrap().upsert_route(route("new"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["admin"], original["admin"]);
        assert_eq!(value["apps"]["tls"], original["apps"]["tls"]);
        assert_eq!(value["apps"]["http"]["servers"]["myserver"]["routes"][0], original["apps"]["http"]["servers"]["myserver"]["routes"][0]);
        assert_eq!(value["apps"]["http"]["servers"]["myserver"]["routes"][1]["@id"], "new");
    }

    #[test]
    fn test_with_route() {
        let doc = ConfigDocument::with_route("myserver", route("example.com"));
        assert!(!doc.is_empty("myserver"));
        assert_eq!(doc.routes("myserver")[0].id, "example.com");
    }
}
