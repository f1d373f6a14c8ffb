use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{PipelineConfig, ValidationError};

/// Default path of the generated SQL file.
pub const DEFAULT_OUTPUT_PATH: &str = "output.sql";

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

/// Where translated statements are written.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// Configuration of the translator binary.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl TranslatorConfig {
    /// Validates the pipeline and output settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pipeline.validate()?;

        if self.output.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyOutputPath);
        }

        Ok(())
    }
}

impl Config for TranslatorConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}
