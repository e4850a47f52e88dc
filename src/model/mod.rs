//! Canonical configuration model.
//!
//! # Data Flow
//! ```text
//! RouteSpec (inbound API)
//!     → api::translate (validate, drop unknown handlers)
//!     → Route (canonical, owned)
//!     → store::ConfigStore::upsert_route
//!     → ConfigDocument (serialized for Caddy's /load)
//! ```
//!
//! # Design Decisions
//! - Field names follow Caddy's JSON config; they are a wire contract
//! - Handlers are a closed enum; the wire tag is `handler`
//! - Maps are ordered so serialization is deterministic

pub mod document;
pub mod route;

pub use document::{AutomaticHttps, ConfigDocument, Server, Upsert, DEFAULT_SERVER_KEY};
pub use route::{Handler, MatchRule, Route, Transport, TransportProtocol, Upstream};
