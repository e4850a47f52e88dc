//! Route-add API.
//!
//! # Data Flow
//! ```text
//! POST /routes {"route": RouteSpec}
//!     → translate.rs (validate, map to canonical Route)
//!     → injector.rs (upsert into the store, snapshot, hand to push mailbox)
//!     → AddRouteReply {"result": "ok" | "error", "message": ...}
//! ```
//!
//! # Design Decisions
//! - A handle object with no recognized kind is dropped with a warning
//! - Errors are reported in the reply body; nothing here can stop the process
//! - A request that changes nothing does not trigger a push

pub mod injector;
pub mod translate;
pub mod types;

pub use injector::Injector;
pub use translate::{translate, RouteError};
pub use types::{AddRouteReply, AddRouteRequest, ReplyResult, RouteSpec};
