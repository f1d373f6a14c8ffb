//! Shared configuration types for the translator.

mod base;
mod pipeline;
mod translator;

pub use base::ValidationError;
pub use pipeline::{ErrorPolicy, PipelineConfig};
pub use translator::{OutputConfig, TranslatorConfig};
