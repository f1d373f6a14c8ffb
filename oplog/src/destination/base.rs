use std::future::Future;

use crate::error::OplogResult;
use crate::types::Statement;

/// Trait for sinks receiving the statements produced by a pipeline.
///
/// A pipeline hands all statements to its destination from a single writer task, in the order
/// they must be applied. Each call carries the statements of one record, prelude first, so a
/// destination never observes a partial translation.
pub trait Destination {
    /// Returns the name of the destination.
    fn name() -> &'static str;

    /// Writes the statements of one record, in order.
    fn write_statements(
        &self,
        statements: Vec<Statement>,
    ) -> impl Future<Output = OplogResult<()>> + Send;

    /// Flushes buffered output.
    ///
    /// Called once after the last statement of a run, including aborted runs. The default
    /// implementation is a no-op.
    fn flush(&self) -> impl Future<Output = OplogResult<()>> + Send {
        async { Ok(()) }
    }
}
