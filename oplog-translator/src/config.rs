use oplog_config::load_config;
use oplog_config::shared::{ErrorPolicy, TranslatorConfig};

use crate::Args;
use crate::error::{TranslatorError, TranslatorResult};

/// Loads the translator configuration and applies the command-line overrides.
///
/// Configuration files and `APP_` environment variables are optional. Flags given on the
/// command line take precedence over both.
pub fn load_translator_config(args: &Args) -> TranslatorResult<TranslatorConfig> {
    let config = load_config::<TranslatorConfig>().map_err(TranslatorError::config)?;
    let config = apply_overrides(config, args);
    config.validate().map_err(TranslatorError::config)?;

    Ok(config)
}

fn apply_overrides(mut config: TranslatorConfig, args: &Args) -> TranslatorConfig {
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }

    if let Some(workers) = args.workers {
        config.pipeline.max_workers = workers;
    }

    if args.skip_invalid {
        config.pipeline.error_policy = ErrorPolicy::SkipAndReport;
    }

    config
}
