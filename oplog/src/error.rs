//! Error types and result definitions for oplog translation.
//!
//! Provides a single error type with classification, aggregation, and captured diagnostic
//! metadata. An [`OplogError`] is either a single error, optionally carrying dynamic detail and a
//! source, or an aggregate of several errors collected from concurrent workers.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for oplog operations using [`OplogError`] as the error type.
pub type OplogResult<T> = Result<T, OplogError>;

/// Detailed payload stored for single [`OplogError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for oplog decoding, translation, and pipeline execution.
#[derive(Debug, Clone)]
pub struct OplogError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Single error payload holding rich metadata.
    Single(ErrorPayload),
    /// Multiple aggregated errors, typically one per failed worker.
    Many {
        errors: Vec<OplogError>,
        location: &'static Location<'static>,
    },
}

/// Specific categories of errors that can occur while translating an oplog.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Input Errors
    DecodeError,
    UnknownOperation,
    InvalidNamespace,
    NoFileFound,

    // Record Errors
    MissingDiff,
    MissingCondition,
    UnsupportedValueType,

    // State & Workflow Errors
    InvariantViolation,
    WorkerPanic,

    // IO & Configuration Errors
    IoError,
    DestinationError,
    ConfigError,

    // Unknown / Uncategorized
    Unknown,
}

impl ErrorKind {
    /// Returns `true` when the error is attributable to a single record.
    ///
    /// Only record-scoped errors may be skipped under the skip-and-report policy. Every other
    /// kind signals malformed input or a broken run and always aborts.
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingDiff | ErrorKind::MissingCondition | ErrorKind::UnsupportedValueType
        )
    }
}

impl OplogError {
    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.kind,
            ErrorRepr::Many { ref errors, .. } => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::Single(ref payload) => vec![payload.kind],
            ErrorRepr::Many { ref errors, .. } => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the static description of this error.
    ///
    /// For multiple errors, returns the description of the first error.
    pub fn description(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.description.as_ref()),
            ErrorRepr::Many { ref errors, .. } => errors.first().and_then(|e| e.description()),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.detail.as_deref(),
            ErrorRepr::Many { ref errors, .. } => errors.iter().find_map(|e| e.detail()),
        }
    }

    /// Returns the aggregated errors, if this is an aggregate.
    pub fn errors(&self) -> Option<&[OplogError]> {
        match self.repr {
            ErrorRepr::Single(_) => None,
            ErrorRepr::Many { ref errors, .. } => Some(errors),
        }
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.backtrace.as_ref()),
            ErrorRepr::Many { .. } => None,
        }
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.location,
            ErrorRepr::Many { location, .. } => location,
        }
    }

    /// Attaches an originating [`error::Error`] to this error and returns the modified instance.
    ///
    /// Has no effect on aggregated errors, which forward their first error as source.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(ref mut payload) = self.repr {
            payload.source = Some(Arc::new(source));
        }
        self
    }

    /// Creates an [`OplogError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        OplogError {
            repr: ErrorRepr::Single(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location: Location::caller(),
                backtrace: Arc::new(Backtrace::capture()),
            }),
        }
    }
}

impl PartialEq for OplogError {
    fn eq(&self, other: &OplogError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::Single(a), ErrorRepr::Single(b)) => a.kind == b.kind,
            (
                ErrorRepr::Many {
                    errors: errors_a, ..
                },
                ErrorRepr::Many {
                    errors: errors_b, ..
                },
            ) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl Hash for OplogError {
    /// Hashes the error using only its kind and static description.
    ///
    /// Location, detail, source and backtrace are excluded so that errors of the same category
    /// group together.
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.repr).hash(state);
        match &self.repr {
            ErrorRepr::Single(payload) => {
                payload.kind.hash(state);
                payload.description.hash(state);
            }
            ErrorRepr::Many { errors, .. } => {
                errors.len().hash(state);
                for error in errors {
                    error.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for OplogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.repr {
            ErrorRepr::Single(payload) => {
                let location = payload.location;
                write!(
                    f,
                    "[{:?}] {} @ {}:{}:{}",
                    payload.kind,
                    payload.description,
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                if let Some(detail) = payload.detail.as_deref() {
                    if detail.trim().is_empty() {
                        write!(f, "\n  Detail: <empty>")?;
                    } else {
                        write!(f, "\n  Detail:")?;
                        for line in detail.lines() {
                            write!(f, "\n    {line}")?;
                        }
                    }
                }

                Ok(())
            }
            ErrorRepr::Many { errors, location } => {
                let count = errors.len();
                write!(
                    f,
                    "[Many] {} error{} aggregated @ {}:{}:{}",
                    count,
                    if count == 1 { "" } else { "s" },
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                for (index, error) in errors.iter().enumerate() {
                    let rendered = format!("{error}");
                    let mut lines = rendered.lines();
                    if let Some(first_line) = lines.next() {
                        write!(f, "\n  {}. {}", index + 1, first_line)?;
                    }
                    for line in lines {
                        write!(f, "\n     {line}")?;
                    }
                }

                Ok(())
            }
        }
    }
}

impl error::Error for OplogError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(payload) => payload
                .source
                .as_ref()
                .map(|source| source.as_ref() as &(dyn error::Error + 'static)),
            ErrorRepr::Many { errors, .. } => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

/// Creates an [`OplogError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for OplogError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> OplogError {
        OplogError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates an [`OplogError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for OplogError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> OplogError {
        OplogError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Creates an [`OplogError`] from a vector of errors for aggregation.
///
/// A vector holding exactly one error yields that error unwrapped.
impl<E> From<Vec<E>> for OplogError
where
    E: Into<OplogError>,
{
    #[track_caller]
    fn from(errors: Vec<E>) -> OplogError {
        let location = Location::caller();

        let mut errors: Vec<OplogError> = errors.into_iter().map(Into::into).collect();
        if errors.len() == 1 {
            if let Some(error) = errors.pop() {
                return error;
            }
        }

        OplogError {
            repr: ErrorRepr::Many { errors, location },
        }
    }
}

/// Converts [`std::io::Error`] to [`OplogError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for OplogError {
    #[track_caller]
    fn from(err: std::io::Error) -> OplogError {
        let detail = err.to_string();
        OplogError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`serde_json::Error`] to [`OplogError`].
///
/// Syntax, data and EOF failures are malformed input and map to [`ErrorKind::DecodeError`].
impl From<serde_json::Error> for OplogError {
    #[track_caller]
    fn from(err: serde_json::Error) -> OplogError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => {
                (ErrorKind::DecodeError, "Error parsing oplog as JSON")
            }
        };

        let detail = err.to_string();
        OplogError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`tokio::task::JoinError`] to [`OplogError`] with [`ErrorKind::WorkerPanic`].
impl From<tokio::task::JoinError> for OplogError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> OplogError {
        let detail = err.to_string();
        OplogError::from_components(
            ErrorKind::WorkerPanic,
            Cow::Borrowed("Worker task failed to complete"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
