//! Process-wide stop signal.
//!
//! Three tasks listen: the HTTP server (drains in-flight requests), the
//! bootstrap poller (abandons its timer) and the push reconciler (stops
//! waiting on the mailbox). A push already in flight is not cut short.

use tokio::sync::broadcast;

/// Cloneable handle that both the signal handler and `lifecycle::run` use to
/// stop the injector. Triggering more than once is harmless.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for one long-running task. Subscribe before spawning it,
    /// or an early trigger is missed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed task to stop. A no-op when nobody listens.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Tasks that have subscribed and not yet dropped their receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
