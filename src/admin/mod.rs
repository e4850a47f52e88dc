//! Caddy admin API access.
//!
//! # Endpoints
//! - `GET <admin_url>/config`: current document, or `null` when unconfigured
//! - `POST <admin_url>/load`: replace the whole document
//!
//! # Design Decisions
//! - Every call has a deadline; a timeout is just another transport error
//! - The bootstrap poller and push reconciler only see the `AdminApi` trait

pub mod client;

pub use client::{AdminApi, AdminError, CaddyAdminClient};
