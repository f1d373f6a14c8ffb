//! Tasks executing a pipeline run.
//!
//! Records flow from the producer through a bounded queue to a pool of
//! [`translation::TranslationWorker`]s, which forward the statements of each record to a single
//! [`writer::StatementWriter`] owning the destination. [`turns`] keeps the records of a table in
//! submission order across workers.

pub mod pool;
pub mod translation;
pub mod turns;
pub mod writer;
