use crate::bail;
use crate::conversions::sql::{render_identifier, render_literal};
use crate::error::{ErrorKind, OplogResult};
use crate::schema::SchemaCatalog;
use crate::translation::Translation;
use crate::types::{OperationRecord, Statement, StatementKind};

/// Translates an insert into its `INSERT` statement, preceded by the DDL it requires.
///
/// The prelude holds the `CREATE SCHEMA` of a new database, then either the `CREATE TABLE` of a
/// new table or the `ALTER TABLE` adding columns an existing table lacks.
pub(super) async fn translate_insert(
    record: &OperationRecord,
    catalog: &SchemaCatalog,
) -> OplogResult<Translation> {
    // Rendering is pure, so a value that cannot be written fails before the catalog changes.
    let dml = render_insert(record)?;

    let mut prelude = match catalog.ensure_table(&record.table, &record.fields).await? {
        Some(create_table) => vec![create_table],
        None => catalog.diff_columns(&record.table, &record.fields).await?,
    };

    if let Some(create_schema) = catalog.ensure_schema(&record.database).await {
        prelude.insert(0, create_schema);
    }

    Ok(Translation { prelude, dml })
}

fn render_insert(record: &OperationRecord) -> OplogResult<Statement> {
    if record.fields.is_empty() {
        bail!(
            ErrorKind::InvariantViolation,
            "Insert without fields",
            format!("insert into `{}` carries no fields", record.namespace())
        );
    }

    let mut columns = Vec::with_capacity(record.fields.len());
    let mut values = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        columns.push(render_identifier(&field.key));
        values.push(render_literal(&field.value)?);
    }

    Ok(Statement::new(
        StatementKind::Insert,
        &record.table,
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            render_identifier(&record.table),
            columns.join(", "),
            values.join(", ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DynamicValue, KeyValue, OperationKind};

    fn insert(fields: Vec<KeyValue>) -> OperationRecord {
        OperationRecord {
            kind: OperationKind::Insert,
            database: "test".to_owned(),
            table: "student".to_owned(),
            fields,
            condition: None,
            update_kind: None,
        }
    }

    fn rendered(translation: &Translation) -> Vec<String> {
        translation
            .clone()
            .into_statements()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn first_insert_creates_schema_and_table() {
        let catalog = SchemaCatalog::new();
        let record = insert(vec![
            KeyValue::new("_id", "1"),
            KeyValue::new("name", "John"),
            KeyValue::new("age", 5_i64),
        ]);

        let translation = translate_insert(&record, &catalog).await.unwrap();

        assert_eq!(
            rendered(&translation),
            vec![
                "CREATE SCHEMA IF NOT EXISTS test;",
                "CREATE TABLE IF NOT EXISTS student (_id VARCHAR(255) PRIMARY KEY, name VARCHAR(255), age BIGINT);",
                "INSERT INTO student (_id, name, age) VALUES ('1', 'John', 5);",
            ]
        );
    }

    #[tokio::test]
    async fn later_inserts_only_emit_missing_columns() {
        let catalog = SchemaCatalog::new();
        translate_insert(&insert(vec![KeyValue::new("_id", "1")]), &catalog)
            .await
            .unwrap();

        let record = insert(vec![KeyValue::new("_id", "2"), KeyValue::new("gpa", 3.8_f64)]);
        let translation = translate_insert(&record, &catalog).await.unwrap();
        assert_eq!(
            rendered(&translation),
            vec![
                "ALTER TABLE student ADD COLUMN gpa FLOAT;",
                "INSERT INTO student (_id, gpa) VALUES ('2', 3.8);",
            ]
        );

        let translation = translate_insert(&record, &catalog).await.unwrap();
        assert!(translation.prelude.is_empty());
    }

    #[tokio::test]
    async fn rejected_insert_leaves_catalog_untouched() {
        let catalog = SchemaCatalog::new();
        let record = insert(vec![
            KeyValue::new("_id", "1"),
            KeyValue::new("address", DynamicValue::Other(serde_json::json!({"city": "Lagos"}))),
        ]);

        let err = translate_insert(&record, &catalog).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedValueType);
        assert!(!catalog.has_database("test").await);
        assert!(!catalog.has_table("student").await);
    }

    #[tokio::test]
    async fn null_on_a_new_table_is_rejected() {
        let catalog = SchemaCatalog::new();
        let record = insert(vec![
            KeyValue::new("_id", "1"),
            KeyValue::new("nickname", DynamicValue::Null),
        ]);

        let err = translate_insert(&record, &catalog).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedValueType);
        assert!(!catalog.has_table("student").await);
    }
}
