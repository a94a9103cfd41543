//! Graceful stop for the edge server.

use std::future::Future;

use tokio::sync::broadcast;

/// Why the server is stopping, e.g. `"SIGTERM"`.
pub type StopReason = &'static str;

/// Stop signal shared by the server and whatever decides to stop it.
///
/// Clones share one channel; a waiter also wakes when every clone is dropped.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<StopReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Future resolving with the stop reason.
    ///
    /// Subscribes on call, so a trigger after this returns is never missed.
    pub fn wait(&self) -> impl Future<Output = StopReason> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move { rx.recv().await.unwrap_or("coordinator dropped") }
    }

    /// Ask every waiter to stop. Returns false when nobody was waiting.
    pub fn trigger(&self, reason: StopReason) -> bool {
        self.tx.send(reason).is_ok()
    }

    pub fn waiters(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
