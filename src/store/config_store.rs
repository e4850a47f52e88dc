//! Mutex-guarded holder of the canonical document.

use parking_lot::Mutex;
use thiserror::Error;

use crate::model::{ConfigDocument, Route, Upsert};
use crate::observability::metrics;

/// Errors returned by [`ConfigStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The listener configuration has not been initialized yet.
    #[error("empty config")]
    Empty,

    /// Incoming document is not valid JSON for the model.
    #[error("unable to fit conf: {0}")]
    Parse(#[from] serde_json::Error),

    /// Incoming document parsed but is itself empty.
    #[error("unable to set internal conf: seems empty")]
    Rejected,
}

/// Owner of the single configuration document.
///
/// Shared as `Arc<ConfigStore>` between the request handlers and the
/// bootstrap poller. Nobody outside holds a reference into the document.
#[derive(Debug)]
pub struct ConfigStore {
    server_key: String,
    document: Mutex<ConfigDocument>,
}

impl ConfigStore {
    /// Create an empty store managing the server entry `server_key`.
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
            document: Mutex::new(ConfigDocument::default()),
        }
    }

    pub fn server_key(&self) -> &str {
        &self.server_key
    }

    pub fn is_empty(&self) -> bool {
        self.document.lock().is_empty(&self.server_key)
    }

    /// Serialized form of the current document.
    pub fn snapshot(&self) -> Result<String, StoreError> {
        let doc = self.document.lock();
        if doc.is_empty(&self.server_key) {
            return Err(StoreError::Empty);
        }
        Ok(serde_json::to_string(&*doc)?)
    }

    /// Copy of the current document, empty or not.
    pub fn document(&self) -> ConfigDocument {
        self.document.lock().clone()
    }

    /// Replace the whole document with `raw`, unless it fails to parse or
    /// is empty. The previous document is kept on error.
    pub fn replace_all(&self, raw: &[u8]) -> Result<(), StoreError> {
        let incoming: ConfigDocument = serde_json::from_slice(raw)?;
        if incoming.is_empty(&self.server_key) {
            return Err(StoreError::Rejected);
        }

        let routes = incoming.routes(&self.server_key).len();
        *self.document.lock() = incoming;
        metrics::record_route_count(routes);
        Ok(())
    }

    /// Like [`replace_all`](Self::replace_all), but only while the current
    /// document is still empty. Returns `false` if something else
    /// initialized the store first.
    pub fn install_if_empty(&self, raw: &[u8]) -> Result<bool, StoreError> {
        let incoming: ConfigDocument = serde_json::from_slice(raw)?;
        if incoming.is_empty(&self.server_key) {
            return Err(StoreError::Rejected);
        }

        let routes = incoming.routes(&self.server_key).len();
        {
            let mut doc = self.document.lock();
            if !doc.is_empty(&self.server_key) {
                return Ok(false);
            }
            *doc = incoming;
        }
        metrics::record_route_count(routes);
        Ok(true)
    }

    pub fn reset_to_empty(&self) {
        *self.document.lock() = ConfigDocument::default();
        metrics::record_route_count(0);
    }

    /// Install the minimum document so routes can be added.
    pub fn reset_to_minimum(&self) {
        *self.document.lock() = ConfigDocument::minimum(&self.server_key);
        metrics::record_route_count(0);
    }

    /// Merge `route` by id. Returns `None` and leaves the document untouched
    /// while it is empty.
    pub fn upsert_route(&self, route: Route) -> Option<Upsert> {
        let (outcome, routes) = {
            let mut doc = self.document.lock();
            if doc.is_empty(&self.server_key) {
                return None;
            }
            let server = doc.server_mut(&self.server_key)?;
            let outcome = server.upsert_route(route);
            (outcome, server.routes.len())
        };

        metrics::record_route_count(routes);
        Some(outcome)
    }

    pub fn route_count(&self) -> usize {
        self.document.lock().routes(&self.server_key).len()
    }
}
