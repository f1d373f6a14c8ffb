use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::destination::Destination;
use crate::error::OplogResult;
use crate::types::Statement;

#[derive(Debug, Default)]
struct Inner {
    statements: Vec<Statement>,
    flushes: usize,
}

/// In-memory destination for tests and embedding.
///
/// Clones share the same storage, so a clone kept by the caller can inspect what a pipeline
/// wrote after the run.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    /// Creates a new empty memory destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all statements written so far, in write order.
    pub async fn statements(&self) -> Vec<Statement> {
        let inner = self.inner.lock().await;
        inner.statements.clone()
    }

    /// Returns the written statements rendered as output lines.
    pub async fn lines(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.statements.iter().map(ToString::to_string).collect()
    }

    /// Returns how many times the destination was flushed.
    pub async fn flushes(&self) -> usize {
        self.inner.lock().await.flushes
    }
}

impl Destination for MemoryDestination {
    fn name() -> &'static str {
        "memory"
    }

    async fn write_statements(&self, statements: Vec<Statement>) -> OplogResult<()> {
        let mut inner = self.inner.lock().await;

        debug!("writing a batch of {} statements", statements.len());
        inner.statements.extend(statements);

        Ok(())
    }

    async fn flush(&self) -> OplogResult<()> {
        let mut inner = self.inner.lock().await;
        inner.flushes += 1;

        Ok(())
    }
}
