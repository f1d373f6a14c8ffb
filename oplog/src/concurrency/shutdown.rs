//! Shutdown signalling between the pipeline producer and its workers.
//!
//! The signal is a watch channel holding a flag that only ever goes from `false` to `true`.
//! Every receiver observes the transition, whether it is currently waiting or checks later.

use std::sync::Arc;

use tokio::sync::watch;

/// Transmitter side of the shutdown channel.
#[derive(Debug, Clone)]
pub struct ShutdownTx(Arc<watch::Sender<bool>>);

impl ShutdownTx {
    /// Signals shutdown to every subscribed receiver.
    ///
    /// Signalling more than once has no further effect.
    pub fn shutdown(&self) {
        self.0.send_replace(true);
    }

    /// Returns `true` if shutdown was already signalled.
    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }

    /// Creates a new receiver for this channel.
    pub fn subscribe(&self) -> ShutdownRx {
        ShutdownRx(self.0.subscribe())
    }
}

/// Receiver side of the shutdown channel.
#[derive(Debug, Clone)]
pub struct ShutdownRx(watch::Receiver<bool>);

impl ShutdownRx {
    /// Returns `true` if shutdown was signalled.
    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }

    /// Completes once shutdown is signalled.
    ///
    /// If every transmitter is dropped without signalling, the future never completes.
    pub async fn wait(&mut self) {
        if self.0.wait_for(|shutdown| *shutdown).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Creates a new shutdown channel in the running state.
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTx(Arc::new(tx)), ShutdownRx(rx))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn receivers_observe_shutdown() {
        let (tx, mut rx) = create_shutdown_channel();
        let late_rx = tx.subscribe();
        assert!(!rx.is_shutdown());

        let waiter = tokio::spawn(async move {
            rx.wait().await;
        });

        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        assert!(tx.is_shutdown());
        assert!(late_rx.is_shutdown());
    }
}
