//! Conversions between oplog documents and relational SQL.
//!
//! The [`oplog`] module decodes raw oplog entries into [`crate::types::OperationRecord`]s,
//! [`namespace`] resolves `database.collection` strings, and [`sql`] maps decoded values to
//! column types and SQL literals.

pub mod namespace;
pub mod oplog;
pub mod sql;
