use std::fmt;
use std::sync::Arc;

use oplog_config::shared::{ErrorPolicy, PipelineConfig};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tracing::{error, info, warn};

use crate::concurrency::shutdown::create_shutdown_channel;
use crate::conversions::oplog::decode_batch;
use crate::destination::Destination;
use crate::error::{ErrorKind, OplogError, OplogResult};
use crate::oplog_error;
use crate::schema::SchemaCatalog;
use crate::types::OperationRecord;
use crate::workers::pool::WorkerPool;
use crate::workers::translation::{JobQueue, TranslationJob, TranslationWorker};
use crate::workers::turns::{SchemaGates, TableTickets, TableTurns};
use crate::workers::writer::StatementWriter;

/// Lifecycle phase of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// No run has started yet.
    Idle,
    /// The input is being decoded.
    Decoding,
    /// Records are being submitted to the workers.
    Dispatching,
    /// All records were submitted and the workers are finishing.
    Draining,
    /// The run completed.
    Done,
    /// The run stopped because of an error.
    Aborted,
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelinePhase::Idle => "idle",
            PipelinePhase::Decoding => "decoding",
            PipelinePhase::Dispatching => "dispatching",
            PipelinePhase::Draining => "draining",
            PipelinePhase::Done => "done",
            PipelinePhase::Aborted => "aborted",
        };

        f.write_str(name)
    }
}

/// A record left out of the output under [`ErrorPolicy::SkipAndReport`].
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    /// Position of the record in the input, counting from zero.
    pub position: usize,
    pub error: OplogError,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Records that decoded successfully.
    pub records_decoded: usize,
    /// Records whose statements were handed to the destination.
    pub records_translated: usize,
    /// Statements written to the destination, DDL included.
    pub statements_written: usize,
    /// Skipped records, ordered by position.
    pub skipped: Vec<SkippedRecord>,
}

/// Number of phase transitions buffered for each subscriber; a run makes at most five.
const PHASE_EVENTS_CAPACITY: usize = 16;

/// Translates batches of oplog entries into SQL statements written to a destination.
///
/// Each run decodes its whole input, then spreads the records over a pool of workers sharing a
/// fresh [`SchemaCatalog`]. Statements of the same table reach the destination in input order,
/// with the DDL a record depends on right before it. Records of different tables may interleave.
#[derive(Debug)]
pub struct Pipeline<D> {
    config: Arc<PipelineConfig>,
    destination: D,
    phase_tx: watch::Sender<PipelinePhase>,
    phase_events_tx: broadcast::Sender<PipelinePhase>,
}

impl<D> Pipeline<D>
where
    D: Destination + Clone + Send + Sync + 'static,
{
    pub fn new(config: PipelineConfig, destination: D) -> Self {
        let (phase_tx, _) = watch::channel(PipelinePhase::Idle);
        let (phase_events_tx, _) = broadcast::channel(PHASE_EVENTS_CAPACITY);

        Self {
            config: Arc::new(config),
            destination,
            phase_tx,
            phase_events_tx,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> PipelinePhase {
        *self.phase_tx.borrow()
    }

    /// Returns a receiver of every phase entered after this call, in transition order.
    pub fn subscribe_phase(&self) -> broadcast::Receiver<PipelinePhase> {
        self.phase_events_tx.subscribe()
    }

    /// Translates every oplog entry of `input` and writes the statements to the destination.
    ///
    /// Under [`ErrorPolicy::FailFast`] the first error aborts the run. Under
    /// [`ErrorPolicy::SkipAndReport`] records failing for a record-scoped reason are skipped and
    /// listed in the summary, while malformed input still aborts. Statements written before an
    /// abort stay in the destination.
    pub async fn run(&mut self, input: &[u8]) -> OplogResult<PipelineSummary> {
        if let Err(err) = self.config.validate() {
            return Err(self.abort(oplog_error!(
                ErrorKind::ConfigError,
                "Invalid pipeline configuration",
                err,
                source: err
            )));
        }

        self.set_phase(PipelinePhase::Decoding);

        let (records, mut skipped) = match self.decode(input) {
            Ok(decoded) => decoded,
            Err(err) => return Err(self.abort(err)),
        };
        let records_decoded = records.len();

        info!(
            records = records_decoded,
            skipped = skipped.len(),
            workers = self.config.max_workers,
            "decoded oplog input"
        );

        self.set_phase(PipelinePhase::Dispatching);

        // Every run gets its own catalog, so schema decisions never leak between runs.
        let catalog = SchemaCatalog::new();
        let turns = TableTurns::new();
        let gates = SchemaGates::new();
        let (shutdown_tx, mut shutdown_rx) = create_shutdown_channel();

        let (jobs_tx, jobs_rx) = mpsc::channel(self.config.effective_queue_capacity());
        let queue: JobQueue = Arc::new(Mutex::new(jobs_rx));
        let (statements_tx, statements_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(
            StatementWriter::new(self.destination.clone(), statements_rx, shutdown_tx.clone())
                .run(),
        );

        let mut pool = WorkerPool::new();
        for worker_id in 0..usize::from(self.config.max_workers) {
            let worker = TranslationWorker::new(
                worker_id,
                queue.clone(),
                catalog.clone(),
                turns.clone(),
                gates.clone(),
                statements_tx.clone(),
                self.config.error_policy,
                shutdown_tx.clone(),
            );
            pool.spawn(worker_id, worker.run());
        }

        // The writer stops once the workers, which hold the remaining senders, are done.
        drop(statements_tx);

        let mut tickets = TableTickets::new();
        for (position, record) in records {
            let ticket = tickets.issue(&record.table);
            let job = TranslationJob {
                position,
                ticket,
                record,
            };

            tokio::select! {
                biased;

                _ = shutdown_rx.wait() => {
                    info!(position, "stopping record submission after shutdown");
                    break;
                }
                sent = jobs_tx.send(job) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        self.set_phase(PipelinePhase::Draining);
        drop(jobs_tx);

        let workers_result = pool.wait_all(&shutdown_tx).await;
        let writer_result = match writer.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        };

        let mut errors = Vec::new();
        let statements_written = writer_result.unwrap_or_else(|err| {
            errors.push(err);
            0
        });
        let reports = workers_result.unwrap_or_else(|err| {
            errors.push(err);
            Vec::new()
        });

        if !errors.is_empty() {
            return Err(self.abort(errors.into()));
        }

        let mut records_translated = 0;
        for report in reports {
            records_translated += report.translated;
            skipped.extend(report.skipped);
        }
        skipped.sort_by_key(|record| record.position);

        self.set_phase(PipelinePhase::Done);

        info!(
            records_translated,
            statements_written,
            skipped = skipped.len(),
            "pipeline run completed"
        );

        Ok(PipelineSummary {
            records_decoded,
            records_translated,
            statements_written,
            skipped,
        })
    }

    /// Decodes the input, applying the error policy to invalid entries.
    fn decode(
        &self,
        input: &[u8],
    ) -> OplogResult<(Vec<(usize, OperationRecord)>, Vec<SkippedRecord>)> {
        let decoded = decode_batch(input)?;

        let mut records = Vec::with_capacity(decoded.len());
        let mut skipped = Vec::new();
        for (position, result) in decoded.into_iter().enumerate() {
            match result {
                Ok(record) => records.push((position, record)),
                Err(err)
                    if self.config.error_policy == ErrorPolicy::SkipAndReport
                        && err.kind().is_record_scoped() =>
                {
                    warn!(position, error = %err, "skipping record that could not be decoded");
                    skipped.push(SkippedRecord {
                        position,
                        error: err,
                    });
                }
                Err(err) => {
                    error!(position, error = %err, "failed to decode record");
                    return Err(err);
                }
            }
        }

        Ok((records, skipped))
    }

    fn set_phase(&self, phase: PipelinePhase) {
        self.phase_tx.send_replace(phase);
        // Sending only fails when nobody subscribed.
        let _ = self.phase_events_tx.send(phase);
    }

    fn abort(&self, err: OplogError) -> OplogError {
        error!(error = %err, "pipeline run aborted");
        self.set_phase(PipelinePhase::Aborted);
        err
    }
}
