use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Default number of translation workers.
pub const DEFAULT_MAX_WORKERS: u16 = 5;

/// How a pipeline reacts to a record that cannot be translated.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The first failing record aborts the run.
    #[default]
    FailFast,
    /// Records failing for a record-scoped reason are skipped and reported in the run summary.
    ///
    /// Malformed input still aborts the run.
    SkipAndReport,
}

const fn default_max_workers() -> u16 {
    DEFAULT_MAX_WORKERS
}

/// Configuration of a translation pipeline.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct PipelineConfig {
    /// Number of workers translating records concurrently.
    #[serde(default = "default_max_workers")]
    pub max_workers: u16,
    /// Capacity of the queue between the record producer and the workers.
    ///
    /// Defaults to twice the number of workers.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Reaction to records that fail translation.
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

impl PipelineConfig {
    /// Validates pipeline configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_workers == 0 {
            return Err(ValidationError::MaxWorkersZero);
        }

        if self.queue_capacity == Some(0) {
            return Err(ValidationError::QueueCapacityZero);
        }

        Ok(())
    }

    /// Returns the effective capacity of the record queue.
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| usize::from(self.max_workers).saturating_mul(2))
            .max(1)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            queue_capacity: None,
            error_policy: ErrorPolicy::default(),
        }
    }
}
