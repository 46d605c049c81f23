//! Graceful shutdown coordination.

use tokio::sync::broadcast;

/// Fans one shutdown event out to every running server.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify subscribers. Returns how many were listening.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes once `rx` sees the shutdown event or its sender is gone.
pub async fn notified(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}
