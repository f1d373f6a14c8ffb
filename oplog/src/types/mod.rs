//! Common types used throughout the translator.
//!
//! Re-exports decoded values, normalized operation records, and rendered statements.

mod record;
mod statement;
mod value;

pub use record::*;
pub use statement::*;
pub use value::*;
