use std::future::Future;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::concurrency::shutdown::ShutdownTx;
use crate::error::{ErrorKind, OplogResult};
use crate::oplog_error;
use crate::workers::translation::WorkerReport;

/// Pool owning the translation worker tasks of a run.
#[derive(Debug, Default)]
pub struct WorkerPool {
    join_set: JoinSet<(usize, OplogResult<WorkerReport>)>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a worker into the pool.
    pub fn spawn<F>(&mut self, worker_id: usize, future: F)
    where
        F: Future<Output = OplogResult<WorkerReport>> + Send + 'static,
    {
        self.join_set.spawn(async move {
            let result = future.await;
            (worker_id, result)
        });

        debug!(worker_id, "spawned worker in pool");
    }

    /// Returns the number of workers still owned by the pool.
    pub fn len(&self) -> usize {
        self.join_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.join_set.is_empty()
    }

    /// Waits for every worker to complete.
    ///
    /// The first failing worker signals shutdown so that the remaining ones stop early. All
    /// errors are collected and returned together.
    pub async fn wait_all(mut self, shutdown_tx: &ShutdownTx) -> OplogResult<Vec<WorkerReport>> {
        let mut reports = Vec::new();
        let mut errors = Vec::new();

        while let Some(result) = self.join_set.join_next().await {
            match result {
                Ok((_, Ok(report))) => reports.push(report),
                Ok((worker_id, Err(err))) => {
                    error!(worker_id, error = %err, "worker completed with error");
                    shutdown_tx.shutdown();
                    errors.push(err);
                }
                Err(join_err) => {
                    shutdown_tx.shutdown();
                    if join_err.is_cancelled() {
                        debug!("worker task was cancelled");
                    } else {
                        errors.push(oplog_error!(
                            ErrorKind::WorkerPanic,
                            "Translation worker panicked",
                            join_err
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(reports)
        } else {
            Err(errors.into())
        }
    }
}
