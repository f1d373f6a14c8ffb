//! Relational schema tracking.
//!
//! The [`SchemaCatalog`] is shared by all workers of a pipeline run and decides which DDL
//! statements need to be emitted as tables appear and grow.

mod catalog;

pub use catalog::{ColumnSchema, SchemaCatalog};
