//! Configuration store subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap poller ── replace_all(bytes) ──┐
//!                                          ▼
//! add-route handler ── upsert_route ──▶ ConfigStore (Mutex<ConfigDocument>)
//!                                          │
//!                                          └── snapshot() ──▶ push mailbox
//! ```
//!
//! # Design Decisions
//! - One exclusive lock covers reads and writes; critical sections never do I/O
//! - An uninitialized document swallows upserts instead of being promoted
//! - Routes are only ever replaced or appended, never removed

pub mod config_store;

pub use config_store::{ConfigStore, StoreError};
