//! Reconciliation with Caddy.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     bootstrap.rs: GET /config every poll interval
//!         → null: optionally POST the minimum document, keep polling
//!         → document: install into the store, stop
//!
//! Route mutations:
//!     store snapshot → mailbox.rs (single slot, latest wins)
//!         → reconciler.rs: POST /load, log only when content changed
//! ```
//!
//! # Design Decisions
//! - Both loops run until adopted/cancelled and never hold the store lock across I/O
//! - Failed pushes are not retried; the next mutation pushes again
//! - Shutdown is observed while waiting on timers and on the mailbox

pub mod bootstrap;
pub mod mailbox;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{BootstrapPoller, PollOutcome, PollState};
pub use mailbox::{MailboxReceiver, PushMailbox};
pub use reconciler::{PushOutcome, PushReconciler};
