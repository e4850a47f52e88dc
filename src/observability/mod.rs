//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! store / sync loops / http handlers:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - RUST_LOG wins over the configured filter
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
