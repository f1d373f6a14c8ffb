//! Configuration types and loading for the oplog translator.
//!
//! Shared configuration structures live in [`shared`], while [`load_config`] layers optional
//! configuration files and `APP_`-prefixed environment variables into any of them.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config, load_config_from};
