use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::bail;
use crate::conversions::sql::{column_definition, column_type, render_identifier};
use crate::error::{ErrorKind, OplogResult};
use crate::types::{KeyValue, Statement, StatementKind};

/// A column known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    /// Relational type keyword, fixed when the column is first seen.
    pub column_type: &'static str,
}

impl ColumnSchema {
    fn new(name: impl Into<String>, column_type: &'static str) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Columns of a single table in creation order.
#[derive(Debug, Default)]
struct TableEntry {
    columns: Vec<ColumnSchema>,
}

impl TableEntry {
    fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}

/// Run-scoped registry of the relational schema emitted so far.
///
/// The catalog decides which DDL statements must be emitted: each database produces a single
/// `CREATE SCHEMA`, each table a single `CREATE TABLE`, and columns only ever get added. Every
/// check-and-act is performed under a lock so that concurrent callers observe exactly one
/// creation. Tables are locked individually, so translations for unrelated tables only contend
/// on the short registry lookup.
///
/// Tables are keyed by their bare name, matching the unqualified table names of the emitted SQL.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    databases: Arc<Mutex<HashSet<String>>>,
    tables: Arc<Mutex<HashMap<String, Arc<Mutex<TableEntry>>>>>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `database` and returns its `CREATE SCHEMA` statement the first time it is seen.
    pub async fn ensure_schema(&self, database: &str) -> Option<Statement> {
        let mut databases = self.databases.lock().await;
        if !databases.insert(database.to_owned()) {
            return None;
        }

        debug!(database, "registered new schema");

        Some(Statement::new(
            StatementKind::CreateSchema,
            database,
            format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                render_identifier(database)
            ),
        ))
    }

    /// Records `table` with the columns of `fields` and returns its `CREATE TABLE` statement the
    /// first time the table is seen.
    ///
    /// Columns are declared in field order. If any field has no column type, the error is
    /// returned and the catalog is left untouched.
    pub async fn ensure_table(
        &self,
        table: &str,
        fields: &[KeyValue],
    ) -> OplogResult<Option<Statement>> {
        let mut tables = self.tables.lock().await;
        let Entry::Vacant(vacant) = tables.entry(table.to_owned()) else {
            return Ok(None);
        };

        let mut columns = Vec::with_capacity(fields.len());
        let mut definitions = Vec::with_capacity(fields.len());
        for field in fields {
            definitions.push(column_definition(field)?);
            columns.push(ColumnSchema::new(&field.key, column_type(&field.value)?));
        }

        vacant.insert(Arc::new(Mutex::new(TableEntry { columns })));

        debug!(table, columns = definitions.len(), "registered new table");

        Ok(Some(Statement::new(
            StatementKind::CreateTable,
            table,
            format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                render_identifier(table),
                definitions.join(", ")
            ),
        )))
    }

    /// Adds the columns of `fields` that `table` does not have yet.
    ///
    /// Returns a single `ALTER TABLE` statement adding every new column in field order, or no
    /// statement when all columns are known. Known columns keep their type and their values are
    /// not checked. Added columns never carry a primary key constraint.
    ///
    /// Fails with [`ErrorKind::InvariantViolation`] if the table was never created and with
    /// [`ErrorKind::UnsupportedValueType`] if a new field has no column type, in which case the
    /// table is left untouched.
    pub async fn diff_columns(
        &self,
        table: &str,
        fields: &[KeyValue],
    ) -> OplogResult<Vec<Statement>> {
        let entry = {
            let tables = self.tables.lock().await;
            tables.get(table).cloned()
        };

        let Some(entry) = entry else {
            bail!(
                ErrorKind::InvariantViolation,
                "Column diff requested for an unknown table",
                format!("table `{table}` has not been created")
            );
        };

        let mut entry = entry.lock().await;

        let mut added: Vec<ColumnSchema> = Vec::new();
        for field in fields {
            if entry.contains(&field.key) || added.iter().any(|column| column.name == field.key) {
                continue;
            }

            let column_type = column_type(&field.value)?;
            added.push(ColumnSchema::new(&field.key, column_type));
        }

        if added.is_empty() {
            return Ok(Vec::new());
        }

        let additions = added
            .iter()
            .map(|column| {
                format!(
                    "ADD COLUMN {} {}",
                    render_identifier(&column.name),
                    column.column_type
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        debug!(table, added = added.len(), "evolving table");

        entry.columns.extend(added);

        Ok(vec![Statement::new(
            StatementKind::AlterTable,
            table,
            format!("ALTER TABLE {} {additions}", render_identifier(table)),
        )])
    }

    /// Returns `true` if a `CREATE SCHEMA` was already issued for `database`.
    pub async fn has_database(&self, database: &str) -> bool {
        self.databases.lock().await.contains(database)
    }

    /// Returns `true` if `table` was already created.
    pub async fn has_table(&self, table: &str) -> bool {
        self.tables.lock().await.contains_key(table)
    }

    /// Returns a snapshot of the columns of `table`, in creation order.
    pub async fn columns(&self, table: &str) -> Option<Vec<ColumnSchema>> {
        let entry = {
            let tables = self.tables.lock().await;
            tables.get(table).cloned()
        }?;

        let entry = entry.lock().await;
        Some(entry.columns.clone())
    }
}
