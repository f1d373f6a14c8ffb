use thiserror::Error;

/// Errors returned when a configuration fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The worker count cannot be zero.
    #[error("`max_workers` cannot be zero")]
    MaxWorkersZero,
    /// The queue capacity cannot be zero.
    #[error("`queue_capacity` cannot be zero")]
    QueueCapacityZero,
    /// The output path cannot be empty.
    #[error("`output.path` cannot be empty")]
    EmptyOutputPath,
}
