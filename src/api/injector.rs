//! The add-route operation.

use std::sync::Arc;

use crate::api::translate::translate;
use crate::api::types::{AddRouteReply, RouteSpec};
use crate::observability::metrics;
use crate::store::{ConfigStore, StoreError};
use crate::sync::PushMailbox;

/// Entry point for route mutations: validates, merges into the store, and
/// hands the resulting snapshot to the push loop.
#[derive(Debug, Clone)]
pub struct Injector {
    store: Arc<ConfigStore>,
    mailbox: PushMailbox,
}

impl Injector {
    pub fn new(store: Arc<ConfigStore>, mailbox: PushMailbox) -> Self {
        Self { store, mailbox }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Add or replace a route. Only a route that actually landed in the
    /// store triggers a push.
    pub fn add_route(&self, spec: &RouteSpec) -> AddRouteReply {
        let route = match translate(spec) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(route_id = %spec.id, error = %e, "Route rejected");
                metrics::record_route_rejected(e.reason());
                return AddRouteReply::error(e.to_string());
            }
        };

        let route_id = route.id.clone();
        let Some(upsert) = self.store.upsert_route(route) else {
            tracing::debug!(route_id = %route_id, "Config not initialized yet, route skipped");
            metrics::record_route_rejected("empty_config");
            return AddRouteReply::error(StoreError::Empty.to_string());
        };

        match self.store.snapshot() {
            Ok(document) => {
                self.mailbox.send(document);
                metrics::record_route_added();
                tracing::info!(route_id = %route_id, upsert = ?upsert, "Route added");
                AddRouteReply::ok()
            }
            Err(e) => {
                tracing::warn!(route_id = %route_id, error = %e, "Snapshot after route add failed");
                metrics::record_route_rejected("empty_config");
                AddRouteReply::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{DialSpec, HandleSpec, MatchSpec, ReverseProxySpec, TransportSpec, UpstreamSpec};
    use crate::model::DEFAULT_SERVER_KEY;
    use crate::sync::MailboxReceiver;
    use std::time::Duration;

    fn example_spec(id: &str) -> RouteSpec {
        RouteSpec {
            id: id.to_string(),
            handles: vec![HandleSpec::reverse_proxy(ReverseProxySpec {
                transport: Some(TransportSpec {
                    protocol: Some("http".into()),
                }),
                upstreams: vec![UpstreamSpec {
                    dial: DialSpec {
                        host: "localhost".into(),
                        port: 8080,
                    },
                }],
            })],
            matches: vec![MatchSpec {
                hosts: vec!["example.com".into(), "beta.example.com".into()],
                paths: vec!["/*".into()],
            }],
        }
    }

    fn injector() -> (Injector, MailboxReceiver) {
        let store = Arc::new(ConfigStore::new(DEFAULT_SERVER_KEY));
        let (mailbox, rx) = PushMailbox::channel();
        (Injector::new(store, mailbox), rx)
    }

    async fn nothing_pushed(rx: &mut MailboxReceiver) -> bool {
        tokio::time::timeout(Duration::from_millis(30), rx.recv()).await.is_err()
    }

    #[tokio::test]
    async fn test_add_route_end_to_end() {
        let (injector, mut rx) = injector();
        injector.store().reset_to_minimum();

        let reply = injector.add_route(&example_spec("example.com"));
        assert_eq!(reply, AddRouteReply::ok());

        let pushed = rx.recv().await.unwrap();
        assert_eq!(pushed, injector.store().snapshot().unwrap());

        let value: serde_json::Value = serde_json::from_str(&pushed).unwrap();
        let routes = value["apps"]["http"]["servers"]["myserver"]["routes"].as_array().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0]["@id"], "example.com");
        assert_eq!(routes[0]["handle"][0]["upstreams"][0]["dial"], "localhost:8080");
    }

    #[tokio::test]
    async fn test_empty_id_rejected_without_push() {
        let (injector, mut rx) = injector();
        injector.store().reset_to_minimum();
        let before = injector.store().snapshot().unwrap();

        let reply = injector.add_route(&example_spec(""));
        assert!(!reply.is_ok());
        assert_eq!(reply.message, "id cannot be empty");

        assert_eq!(injector.store().snapshot().unwrap(), before);
        assert!(nothing_pushed(&mut rx).await);
    }

    #[tokio::test]
    async fn test_empty_store_rejects_without_push() {
        let (injector, mut rx) = injector();

        let reply = injector.add_route(&example_spec("example.com"));
        assert_eq!(reply, AddRouteReply::error("empty config"));

        assert!(injector.store().is_empty());
        assert!(nothing_pushed(&mut rx).await);
    }

    #[tokio::test]
    async fn test_concurrent_add_route() {
        let (injector, mut rx) = injector();
        injector.store().reset_to_minimum();

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let injector = injector.clone();
                tokio::spawn(async move { injector.add_route(&example_spec(&i.to_string())) })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        assert_eq!(injector.store().route_count(), 10);
        let latest = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&latest).unwrap();
        assert_eq!(
            value["apps"]["http"]["servers"]["myserver"]["routes"].as_array().map(Vec::len),
            Some(10),
            "the pending push carries every route"
        );
    }
}
