use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::concurrency::shutdown::ShutdownTx;
use crate::destination::Destination;
use crate::error::OplogResult;
use crate::types::Statement;

/// Single task writing translated statements to the destination in arrival order.
#[derive(Debug)]
pub struct StatementWriter<D> {
    destination: D,
    statements_rx: mpsc::UnboundedReceiver<Vec<Statement>>,
    shutdown_tx: ShutdownTx,
}

impl<D> StatementWriter<D>
where
    D: Destination,
{
    pub fn new(
        destination: D,
        statements_rx: mpsc::UnboundedReceiver<Vec<Statement>>,
        shutdown_tx: ShutdownTx,
    ) -> Self {
        Self {
            destination,
            statements_rx,
            shutdown_tx,
        }
    }

    /// Writes statements until every sender is dropped, then flushes the destination.
    ///
    /// Returns the number of statements written. A write failure signals shutdown and still
    /// flushes what the destination buffered before returning the write error.
    pub async fn run(mut self) -> OplogResult<usize> {
        let mut written = 0;

        while let Some(statements) = self.statements_rx.recv().await {
            let count = statements.len();
            if let Err(err) = self.destination.write_statements(statements).await {
                error!(destination = D::name(), error = %err, "failed to write statements");
                self.shutdown_tx.shutdown();

                if let Err(flush_err) = self.destination.flush().await {
                    warn!(
                        destination = D::name(),
                        error = %flush_err,
                        "failed to flush after a write error"
                    );
                }

                return Err(err);
            }

            written += count;
        }

        self.destination.flush().await?;

        debug!(destination = D::name(), written, "statement writer finished");

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bail;
    use crate::concurrency::shutdown::create_shutdown_channel;
    use crate::destination::memory::MemoryDestination;
    use crate::error::ErrorKind;
    use crate::types::StatementKind;

    /// Rejects every write and counts flushes on an inner memory destination.
    #[derive(Debug, Clone, Default)]
    struct RejectingDestination {
        inner: MemoryDestination,
    }

    impl Destination for RejectingDestination {
        fn name() -> &'static str {
            "rejecting"
        }

        async fn write_statements(&self, _statements: Vec<Statement>) -> OplogResult<()> {
            bail!(ErrorKind::DestinationError, "Disk full");
        }

        async fn flush(&self) -> OplogResult<()> {
            self.inner.flush().await
        }
    }

    fn delete(id: u32) -> Statement {
        Statement::new(
            StatementKind::Delete,
            "student",
            format!("DELETE FROM student WHERE _id = '{id}'"),
        )
    }

    #[tokio::test]
    async fn writes_in_arrival_order_and_flushes_on_close() {
        let destination = MemoryDestination::new();
        let (shutdown_tx, _) = create_shutdown_channel();
        let (statements_tx, statements_rx) = mpsc::unbounded_channel();

        statements_tx.send(vec![delete(1), delete(2)]).unwrap();
        statements_tx.send(vec![delete(3)]).unwrap();
        drop(statements_tx);

        let written = StatementWriter::new(destination.clone(), statements_rx, shutdown_tx)
            .run()
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(destination.statements().await, vec![delete(1), delete(2), delete(3)]);
        assert_eq!(destination.flushes().await, 1);
    }

    #[tokio::test]
    async fn write_failure_signals_shutdown_and_still_flushes() {
        let destination = RejectingDestination::default();
        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
        let (statements_tx, statements_rx) = mpsc::unbounded_channel();

        statements_tx.send(vec![delete(1)]).unwrap();

        let err = StatementWriter::new(destination.clone(), statements_rx, shutdown_tx)
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DestinationError);
        assert!(shutdown_rx.is_shutdown());
        assert_eq!(destination.inner.flushes().await, 1);
    }
}
