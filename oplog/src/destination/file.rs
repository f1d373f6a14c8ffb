use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::destination::Destination;
use crate::error::{ErrorKind, OplogResult};
use crate::oplog_error;
use crate::types::Statement;

/// Destination writing statements to a file, one statement per line.
///
/// The file is created, or truncated if it exists, when the destination is created. Output is
/// buffered until [`Destination::flush`] is called.
#[derive(Debug, Clone)]
pub struct FileDestination {
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl FileDestination {
    /// Creates the output file at `path`.
    pub async fn create(path: impl AsRef<Path>) -> OplogResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await.map_err(|err| {
            oplog_error!(
                ErrorKind::DestinationError,
                "Failed to create output file",
                format!("{}: {err}", path.display()),
                source: err
            )
        })?;

        info!(path = %path.display(), "created output file");

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    /// Returns the path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Destination for FileDestination {
    fn name() -> &'static str {
        "file"
    }

    async fn write_statements(&self, statements: Vec<Statement>) -> OplogResult<()> {
        let mut writer = self.writer.lock().await;

        for statement in &statements {
            let line = format!("{statement}\n");
            writer.write_all(line.as_bytes()).await.map_err(|err| {
                oplog_error!(
                    ErrorKind::DestinationError,
                    "Failed to write statement",
                    format!("{}: {err}", self.path.display()),
                    source: err
                )
            })?;
        }

        Ok(())
    }

    async fn flush(&self) -> OplogResult<()> {
        let mut writer = self.writer.lock().await;
        writer.flush().await.map_err(|err| {
            oplog_error!(
                ErrorKind::DestinationError,
                "Failed to flush output file",
                format!("{}: {err}", self.path.display()),
                source: err
            )
        })?;

        debug!(path = %self.path.display(), "flushed output file");

        Ok(())
    }
}
