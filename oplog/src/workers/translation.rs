use std::sync::Arc;

use oplog_config::shared::ErrorPolicy;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, warn};

use crate::bail;
use crate::concurrency::shutdown::ShutdownTx;
use crate::error::{ErrorKind, OplogResult};
use crate::pipeline::SkippedRecord;
use crate::schema::SchemaCatalog;
use crate::translation::translate;
use crate::types::{OperationRecord, Statement, StatementKind};
use crate::workers::turns::{SchemaGates, TableTurns};

/// A record queued for translation.
#[derive(Debug)]
pub struct TranslationJob {
    /// Position of the record in the input.
    pub position: usize,
    /// Ticket of the record within its table.
    pub ticket: u64,
    pub record: OperationRecord,
}

/// Shared receiving end of the record queue.
pub type JobQueue = Arc<Mutex<mpsc::Receiver<TranslationJob>>>;

/// What a worker did before it stopped.
#[derive(Debug, Default)]
pub struct WorkerReport {
    /// Records translated and forwarded to the writer.
    pub translated: usize,
    /// Records skipped under [`ErrorPolicy::SkipAndReport`].
    pub skipped: Vec<SkippedRecord>,
}

/// Worker translating queued records and forwarding their statements to the writer.
#[derive(Debug)]
pub struct TranslationWorker {
    id: usize,
    queue: JobQueue,
    catalog: SchemaCatalog,
    turns: TableTurns,
    gates: SchemaGates,
    statements_tx: mpsc::UnboundedSender<Vec<Statement>>,
    error_policy: ErrorPolicy,
    shutdown_tx: ShutdownTx,
}

impl TranslationWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        queue: JobQueue,
        catalog: SchemaCatalog,
        turns: TableTurns,
        gates: SchemaGates,
        statements_tx: mpsc::UnboundedSender<Vec<Statement>>,
        error_policy: ErrorPolicy,
        shutdown_tx: ShutdownTx,
    ) -> Self {
        Self {
            id,
            queue,
            catalog,
            turns,
            gates,
            statements_tx,
            error_policy,
            shutdown_tx,
        }
    }

    /// Processes records until the queue is closed and drained.
    ///
    /// Once shutdown is signalled, remaining records are dequeued and dropped without being
    /// translated. A translation error that the error policy does not allow to skip signals
    /// shutdown and is returned.
    pub async fn run(self) -> OplogResult<WorkerReport> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut report = WorkerReport::default();

        loop {
            let job = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };

            let Some(job) = job else {
                break;
            };

            if shutdown_rx.is_shutdown() {
                debug!(
                    worker_id = self.id,
                    position = job.position,
                    "dropping record after shutdown"
                );
                continue;
            }

            let turn = tokio::select! {
                biased;

                _ = shutdown_rx.wait() => {
                    debug!(
                        worker_id = self.id,
                        position = job.position,
                        "dropping record after shutdown"
                    );
                    continue;
                }
                turn = self.turns.acquire(&job.record.table, job.ticket) => turn,
            };

            if shutdown_rx.is_shutdown() {
                continue;
            }

            match translate(&job.record, &self.catalog).await {
                Ok(translation) => {
                    let claims_schema = translation
                        .prelude
                        .first()
                        .is_some_and(|statement| statement.kind() == StatementKind::CreateSchema);

                    // DDL of a new database's table must follow the database's `CREATE SCHEMA`,
                    // which another worker may still be forwarding.
                    if !claims_schema && !translation.prelude.is_empty() {
                        tokio::select! {
                            biased;

                            _ = shutdown_rx.wait() => {
                                debug!(
                                    worker_id = self.id,
                                    position = job.position,
                                    "dropping record after shutdown"
                                );
                                continue;
                            }
                            _ = self.gates.wait_open(&job.record.database) => {}
                        }
                    }

                    let statements = translation.into_statements();
                    debug!(
                        worker_id = self.id,
                        position = job.position,
                        kind = %job.record.kind,
                        table = %job.record.table,
                        statements = statements.len(),
                        "translated record"
                    );

                    if self.statements_tx.send(statements).is_err() {
                        self.shutdown_tx.shutdown();
                        bail!(
                            ErrorKind::DestinationError,
                            "Statement writer stopped before translation finished",
                            format!("worker {} could not forward record {}", self.id, job.position)
                        );
                    }

                    if claims_schema {
                        self.gates.open(&job.record.database).await;
                    }

                    report.translated += 1;
                }
                Err(err)
                    if self.error_policy == ErrorPolicy::SkipAndReport
                        && err.kind().is_record_scoped() =>
                {
                    warn!(
                        worker_id = self.id,
                        position = job.position,
                        namespace = %job.record.namespace(),
                        error = %err,
                        "skipping record that could not be translated"
                    );

                    report.skipped.push(SkippedRecord {
                        position: job.position,
                        error: err,
                    });
                }
                Err(err) => {
                    error!(
                        worker_id = self.id,
                        position = job.position,
                        namespace = %job.record.namespace(),
                        error = %err,
                        "failed to translate record"
                    );

                    self.shutdown_tx.shutdown();
                    return Err(err);
                }
            }

            drop(turn);
        }

        debug!(
            worker_id = self.id,
            translated = report.translated,
            skipped = report.skipped.len(),
            "worker finished"
        );

        Ok(report)
    }
}
