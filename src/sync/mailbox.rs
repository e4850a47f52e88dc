//! Single-slot handoff between route mutations and the push loop.

use std::sync::Arc;

use tokio::sync::watch;

/// Producer side. Sending never blocks: a document that has not been picked
/// up yet is overwritten by the next one, since only the latest snapshot
/// matters to Caddy.
#[derive(Debug, Clone)]
pub struct PushMailbox {
    tx: Arc<watch::Sender<Option<String>>>,
}

/// Consumer side, owned by the push reconciler.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: watch::Receiver<Option<String>>,
}

impl PushMailbox {
    pub fn channel() -> (PushMailbox, MailboxReceiver) {
        let (tx, rx) = watch::channel(None);
        (PushMailbox { tx: Arc::new(tx) }, MailboxReceiver { rx })
    }

    /// Put `document` in the slot, replacing any pending one.
    pub fn send(&self, document: String) {
        self.tx.send_replace(Some(document));
    }
}

impl MailboxReceiver {
    /// Wait for the next unseen document. `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(document) = self.rx.borrow_and_update().clone() {
                return Some(document);
            }
        }
    }
}
