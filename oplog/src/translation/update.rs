use crate::bail;
use crate::conversions::sql::{render_assignment, render_identifier};
use crate::error::{ErrorKind, OplogResult};
use crate::translation::Translation;
use crate::types::{OperationRecord, Statement, StatementKind, UpdateKind};

/// Translates an update into a single `UPDATE` statement.
///
/// Set diffs assign the new values, unset diffs assign `NULL` regardless of the payload.
pub(super) fn translate_update(record: &OperationRecord) -> OplogResult<Translation> {
    let (Some(update_kind), Some(condition)) = (record.update_kind, &record.condition) else {
        bail!(
            ErrorKind::InvariantViolation,
            "Update without diff or condition",
            format!("update of `{}` is missing its diff or condition", record.namespace())
        );
    };

    if record.fields.is_empty() {
        bail!(
            ErrorKind::InvariantViolation,
            "Update without fields",
            format!("update of `{}` carries no fields", record.namespace())
        );
    }

    let assignments = match update_kind {
        UpdateKind::Set => record
            .fields
            .iter()
            .map(render_assignment)
            .collect::<OplogResult<Vec<_>>>()?,
        UpdateKind::Unset => record
            .fields
            .iter()
            .map(|field| format!("{} = NULL", render_identifier(&field.key)))
            .collect(),
    };

    let dml = Statement::new(
        StatementKind::Update,
        &record.table,
        format!(
            "UPDATE {} SET {} WHERE {}",
            render_identifier(&record.table),
            assignments.join(", "),
            render_assignment(condition)?
        ),
    );

    Ok(Translation::dml_only(dml))
}
