//! Relational rendering of decoded values.
//!
//! Maps [`DynamicValue`]s to column type keywords for DDL and to SQL literals for DML.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ErrorKind, OplogError, OplogResult};
use crate::{bail, oplog_error};
use crate::types::{DynamicValue, KeyValue};

/// Column type for string values.
pub const VARCHAR_TYPE: &str = "VARCHAR(255)";
/// Column type for integer values.
pub const BIGINT_TYPE: &str = "BIGINT";
/// Column type for floating point values.
pub const FLOAT_TYPE: &str = "FLOAT";
/// Column type for boolean values.
pub const BOOLEAN_TYPE: &str = "BOOLEAN";

/// Name of the document identifier column, which becomes the primary key.
pub const PRIMARY_KEY_COLUMN: &str = "_id";

/// Identifiers matching this pattern are emitted without quoting.
static PLAIN_IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier regex is valid"));

/// Maps a decoded value to its relational column type.
///
/// Nulls, nested documents and arrays have no column type and fail with
/// [`ErrorKind::UnsupportedValueType`].
pub fn column_type(value: &DynamicValue) -> OplogResult<&'static str> {
    let column_type = match value {
        DynamicValue::String(_) => VARCHAR_TYPE,
        DynamicValue::Integer(_) => BIGINT_TYPE,
        DynamicValue::Float(_) => FLOAT_TYPE,
        DynamicValue::Boolean(_) => BOOLEAN_TYPE,
        DynamicValue::Null | DynamicValue::Other(_) => {
            bail!(
                ErrorKind::UnsupportedValueType,
                "Unsupported value type",
                format!("values of type {} have no column type", value.type_name())
            );
        }
    };

    Ok(column_type)
}

/// Renders the column definition of a field, e.g. `age BIGINT` or `_id VARCHAR(255) PRIMARY KEY`.
pub fn column_definition(field: &KeyValue) -> OplogResult<String> {
    let column_type = column_type(&field.value).map_err(|err| with_column(err, &field.key))?;
    let mut definition = format!("{} {column_type}", render_identifier(&field.key));
    if field.key == PRIMARY_KEY_COLUMN {
        definition.push_str(" PRIMARY KEY");
    }

    Ok(definition)
}

/// Renders a decoded value as a SQL literal.
pub fn render_literal(value: &DynamicValue) -> OplogResult<String> {
    let literal = match value {
        DynamicValue::String(value) => pg_escape::quote_literal(value).to_string(),
        DynamicValue::Integer(value) => value.to_string(),
        DynamicValue::Float(value) if value.is_finite() => format!("{value:?}"),
        DynamicValue::Boolean(value) => value.to_string(),
        DynamicValue::Null => "NULL".to_owned(),
        DynamicValue::Float(_) | DynamicValue::Other(_) => {
            bail!(
                ErrorKind::UnsupportedValueType,
                "Unsupported value type",
                format!("values of type {} cannot be rendered as SQL", value.type_name())
            );
        }
    };

    Ok(literal)
}

/// Renders `key = literal` for a field, as used in `SET` and `WHERE` clauses.
pub fn render_assignment(field: &KeyValue) -> OplogResult<String> {
    let literal = render_literal(&field.value).map_err(|err| with_column(err, &field.key))?;
    Ok(format!("{} = {literal}", render_identifier(&field.key)))
}

/// Renders an identifier, quoting it only when it is not a plain word.
pub fn render_identifier(identifier: &str) -> Cow<'_, str> {
    if PLAIN_IDENTIFIER_REGEX.is_match(identifier) {
        Cow::Borrowed(identifier)
    } else {
        Cow::Owned(pg_escape::quote_identifier(identifier).to_string())
    }
}

/// Prefixes the error detail with the column the error relates to.
fn with_column(err: OplogError, column: &str) -> OplogError {
    let detail = match err.detail() {
        Some(detail) => format!("column `{column}`: {detail}"),
        None => format!("column `{column}`"),
    };

    oplog_error!(err.kind(), "Unsupported value type", detail, source: err)
}
