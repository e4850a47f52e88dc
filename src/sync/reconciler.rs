//! Push loop: propagates local document changes to Caddy.
//!
//! # Responsibilities
//! - Wait for the latest snapshot in the mailbox
//! - POST it to Caddy's `/load`
//! - Report a success only when the pushed content changed

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::admin::AdminApi;
use crate::observability::metrics;
use crate::sync::mailbox::MailboxReceiver;

/// Result of a single push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Caddy did not accept the document. Not retried.
    Failed,
    /// Accepted, identical to the previous successful push.
    Unchanged,
    /// Accepted, and different from the previous successful push.
    Changed,
}

pub struct PushReconciler {
    admin: Arc<dyn AdminApi>,
    mailbox: MailboxReceiver,
    last_pushed: Option<String>,
}

impl PushReconciler {
    pub fn new(admin: Arc<dyn AdminApi>, mailbox: MailboxReceiver) -> Self {
        Self {
            admin,
            mailbox,
            last_pushed: None,
        }
    }

    /// Run until shutdown or until every mailbox producer is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Push reconciler starting");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Push reconciler received shutdown signal, exiting loop");
                    break;
                }
                document = self.mailbox.recv() => match document {
                    Some(document) => {
                        self.push(document).await;
                    }
                    None => {
                        tracing::info!("Push mailbox closed, exiting loop");
                        break;
                    }
                }
            }
        }
    }

    /// Push one document.
    pub async fn push(&mut self, document: String) -> PushOutcome {
        if let Err(e) = self.admin.load_config(&document).await {
            tracing::error!(error = %e, "Patching caddy config failed");
            metrics::record_push("failure");
            return PushOutcome::Failed;
        }

        metrics::record_push("success");
        if self.last_pushed.as_deref() == Some(document.as_str()) {
            return PushOutcome::Unchanged;
        }

        tracing::info!(conf = %document, "Patched caddy config");
        self.last_pushed = Some(document);
        PushOutcome::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::sync::mailbox::PushMailbox;
    use crate::sync::testing::FakeAdmin;
    use std::time::Duration;

    fn reconciler(admin: Arc<FakeAdmin>) -> (PushMailbox, PushReconciler) {
        let (mailbox, rx) = PushMailbox::channel();
        (mailbox, PushReconciler::new(admin, rx))
    }

    #[tokio::test]
    async fn test_identical_pushes_notify_once() {
        let admin = Arc::new(FakeAdmin::default());
        let (_mailbox, mut reconciler) = reconciler(admin.clone());

        assert_eq!(reconciler.push("a".into()).await, PushOutcome::Changed);
        assert_eq!(reconciler.push("a".into()).await, PushOutcome::Unchanged);
        assert_eq!(reconciler.push("b".into()).await, PushOutcome::Changed);
        assert_eq!(reconciler.push("a".into()).await, PushOutcome::Changed);

        assert_eq!(admin.loads().len(), 4, "every document is still pushed");
    }

    #[tokio::test]
    async fn test_failed_push_is_not_remembered() {
        let admin = Arc::new(FakeAdmin::default());
        let (_mailbox, mut reconciler) = reconciler(admin.clone());

        admin.set_fail_loads(true);
        assert_eq!(reconciler.push("a".into()).await, PushOutcome::Failed);
        assert_eq!(admin.loads().len(), 1, "no automatic retry");

        admin.set_fail_loads(false);
        assert_eq!(reconciler.push("a".into()).await, PushOutcome::Changed);
    }

    #[tokio::test]
    async fn test_run_pushes_mailbox_until_shutdown() {
        let admin = Arc::new(FakeAdmin::default());
        let (mailbox, reconciler) = reconciler(admin.clone());
        let shutdown = Shutdown::new();

        let task = tokio::spawn(reconciler.run(shutdown.subscribe()));

        mailbox.send("doc-1".into());
        tokio::time::sleep(Duration::from_millis(50)).await;
        mailbox.send("doc-2".into());
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("reconciler should stop promptly")
            .unwrap();

        assert_eq!(admin.loads(), vec!["doc-1".to_string(), "doc-2".to_string()]);
    }

    #[tokio::test]
    async fn test_run_stops_when_idle() {
        let admin = Arc::new(FakeAdmin::default());
        let (_mailbox, reconciler) = reconciler(admin.clone());
        let shutdown = Shutdown::new();

        let task = tokio::spawn(reconciler.run(shutdown.subscribe()));
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("reconciler parked on the mailbox should stop")
            .unwrap();
        assert!(admin.loads().is_empty());
    }
}
