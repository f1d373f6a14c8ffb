use crate::bail;
use crate::conversions::sql::{render_assignment, render_identifier};
use crate::error::{ErrorKind, OplogResult};
use crate::translation::Translation;
use crate::types::{OperationRecord, Statement, StatementKind};

/// Translates a delete into a single `DELETE` statement.
pub(super) fn translate_delete(record: &OperationRecord) -> OplogResult<Translation> {
    let Some(condition) = &record.condition else {
        bail!(
            ErrorKind::InvariantViolation,
            "Delete without condition",
            format!("delete from `{}` has no condition", record.namespace())
        );
    };

    let dml = Statement::new(
        StatementKind::Delete,
        &record.table,
        format!(
            "DELETE FROM {} WHERE {}",
            render_identifier(&record.table),
            render_assignment(condition)?
        ),
    );

    Ok(Translation::dml_only(dml))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeyValue, OperationKind};

    #[test]
    fn renders_delete() {
        let record = OperationRecord {
            kind: OperationKind::Delete,
            database: "test".to_owned(),
            table: "student".to_owned(),
            fields: Vec::new(),
            condition: Some(KeyValue::new("_id", "635b79e231d82a8ab1de863b")),
            update_kind: None,
        };

        let translation = translate_delete(&record).unwrap();

        assert!(translation.prelude.is_empty());
        assert_eq!(
            translation.dml.to_string(),
            "DELETE FROM student WHERE _id = '635b79e231d82a8ab1de863b';"
        );
    }
}
