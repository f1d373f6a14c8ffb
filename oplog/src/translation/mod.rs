//! Translation of decoded oplog records into SQL statements.
//!
//! Each [`OperationKind`] has its own translator. Inserts consult the [`SchemaCatalog`] to emit
//! the DDL their rows depend on, while updates and deletes only render DML.

mod delete;
mod insert;
mod update;

use crate::error::OplogResult;
use crate::schema::SchemaCatalog;
use crate::types::{OperationKind, OperationRecord, Statement};

/// The statements produced for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// DDL that must be emitted before [`Translation::dml`], in emission order.
    pub prelude: Vec<Statement>,
    pub dml: Statement,
}

impl Translation {
    /// Creates a translation without prelude.
    pub fn dml_only(dml: Statement) -> Self {
        Self {
            prelude: Vec::new(),
            dml,
        }
    }

    /// Returns every statement of the translation in emission order.
    pub fn into_statements(self) -> Vec<Statement> {
        let mut statements = self.prelude;
        statements.push(self.dml);
        statements
    }
}

/// Translates a record into SQL, updating `catalog` with any schema the record introduces.
///
/// A failing translation never leaves the catalog ahead of the statements actually emitted.
pub async fn translate(
    record: &OperationRecord,
    catalog: &SchemaCatalog,
) -> OplogResult<Translation> {
    match record.kind {
        OperationKind::Insert => insert::translate_insert(record, catalog).await,
        OperationKind::Update => update::translate_update(record),
        OperationKind::Delete => delete::translate_delete(record),
    }
}
