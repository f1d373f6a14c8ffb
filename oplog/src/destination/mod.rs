//! Output sinks for translated SQL statements.
//!
//! This module provides the [`Destination`] trait together with a file destination that writes
//! one statement per line and an in-memory destination used to inspect pipeline output.

mod base;
pub mod file;
pub mod memory;

pub use base::Destination;
