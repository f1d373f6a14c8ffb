use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

use oplog::error::{ErrorKind, OplogError};

/// Returns whether terminal output should include backtraces.
fn should_render_backtrace() -> bool {
    matches!(
        std::env::var("RUST_BACKTRACE").as_deref(),
        Ok("1") | Ok("full")
    )
}

/// Result type for translator operations.
pub type TranslatorResult<T> = Result<T, TranslatorError>;

/// Captured backtrace of errors not originating from the translation itself.
pub struct CapturedBacktrace(Backtrace);

impl CapturedBacktrace {
    fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl fmt::Debug for CapturedBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type of the translator binary.
#[derive(Debug)]
pub enum TranslatorError {
    /// Decoding, translation or output error.
    Oplog(OplogError),
    /// Configuration error.
    Config(Box<dyn Error + Send + Sync>, CapturedBacktrace),
    /// I/O error outside of the translation, such as building the runtime.
    Io(std::io::Error, CapturedBacktrace),
}

impl TranslatorError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            TranslatorError::Oplog(_) => "translation error",
            TranslatorError::Config(_, _) => "configuration error",
            TranslatorError::Io(_, _) => "i/o error",
        }
    }

    /// Returns the [`ErrorKind`] of translation errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            TranslatorError::Oplog(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Returns the backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            TranslatorError::Oplog(err) => err.backtrace(),
            TranslatorError::Config(_, backtrace) => Some(&backtrace.0),
            TranslatorError::Io(_, backtrace) => Some(&backtrace.0),
        }
    }

    /// Creates a configuration error from any source.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        TranslatorError::Config(Box::new(err), CapturedBacktrace::capture())
    }

    /// Returns a user-oriented report for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("oplog translation failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        if !matches!(self, TranslatorError::Oplog(err) if err.errors().is_some()) {
            let mut source = Error::source(self);
            let mut idx = 1usize;
            while let Some(err) = source {
                out.push_str(&format!("cause {idx}: {err}\n"));
                source = err.source();
                idx += 1;
            }
        }

        if should_render_backtrace()
            && let Some(backtrace) = self.backtrace()
        {
            out.push_str("backtrace:\n");
            out.push_str(&backtrace.to_string());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }
}

impl fmt::Display for TranslatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslatorError::Oplog(err) => write!(f, "{err}"),
            TranslatorError::Config(source, _) => write!(f, "configuration error: {source}"),
            TranslatorError::Io(source, _) => write!(f, "i/o error: {source}"),
        }
    }
}

impl Error for TranslatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TranslatorError::Oplog(err) => err.source(),
            TranslatorError::Config(source, _) => Some(source.as_ref()),
            TranslatorError::Io(source, _) => Some(source),
        }
    }
}

impl From<std::io::Error> for TranslatorError {
    fn from(err: std::io::Error) -> Self {
        TranslatorError::Io(err, CapturedBacktrace::capture())
    }
}

impl From<OplogError> for TranslatorError {
    fn from(err: OplogError) -> Self {
        TranslatorError::Oplog(err)
    }
}
