//! Decoding of raw oplog entries into [`OperationRecord`]s.
//!
//! An oplog entry is a JSON object of the shape
//! `{"op": "i"|"u"|"d", "ns": "<db>.<collection>", "o": {...}, "o2": {...}}`. Decoding validates
//! the envelope, resolves the namespace and extracts the kind-specific payload, so every record
//! returned from here is ready for translation.

use serde_json::{Map, Value};

use crate::bail;
use crate::conversions::namespace::resolve_namespace;
use crate::error::{ErrorKind, OplogResult};
use crate::types::{KeyValue, OperationKind, OperationRecord, UpdateKind};

/// Minimum number of top-level keys of a well-formed oplog entry (`op`, `ns` and `o`).
const MIN_TOP_LEVEL_KEYS: usize = 3;

/// Key of the oplog v2 update diff.
const DIFF_KEY: &str = "diff";

/// Decodes a batch of oplog entries.
///
/// The input is a sequence of whitespace-separated JSON values, each one either a single oplog
/// entry or an array of entries. Malformed JSON fails the whole batch, while invalid entries are
/// reported one by one, in order of appearance, so the caller can decide whether to abort.
pub fn decode_batch(bytes: &[u8]) -> OplogResult<Vec<OplogResult<OperationRecord>>> {
    let mut records = Vec::new();
    for value in serde_json::Deserializer::from_slice(bytes).into_iter::<Value>() {
        match value? {
            Value::Array(entries) => records.extend(entries.into_iter().map(decode_value)),
            entry => records.push(decode_value(entry)),
        }
    }

    Ok(records)
}

/// Decodes a single JSON-encoded oplog entry.
pub fn decode_record(bytes: &[u8]) -> OplogResult<OperationRecord> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_value(value)
}

/// Decodes an already parsed oplog entry.
pub fn decode_value(value: Value) -> OplogResult<OperationRecord> {
    let mut entry = match value {
        Value::Object(entry) => entry,
        other => bail!(
            ErrorKind::DecodeError,
            "Wrong oplog structure",
            format!("expected a JSON object, received `{other}`")
        ),
    };

    if entry.len() < MIN_TOP_LEVEL_KEYS {
        bail!(
            ErrorKind::DecodeError,
            "Wrong oplog structure",
            format!(
                "expected at least {MIN_TOP_LEVEL_KEYS} top-level keys, found {}",
                entry.len()
            )
        );
    }

    let kind = decode_operation_kind(entry.get("op"))?;

    let (database, table) = match entry.get("ns") {
        Some(Value::String(ns)) => resolve_namespace(ns)?,
        Some(other) => bail!(
            ErrorKind::InvalidNamespace,
            "Invalid structure for namespace",
            format!("expected a string namespace, received `{other}`")
        ),
        None => bail!(
            ErrorKind::InvalidNamespace,
            "Invalid structure for namespace",
            "the oplog entry has no `ns` key"
        ),
    };

    let object = match entry.remove("o") {
        Some(Value::Object(object)) => object,
        Some(other) => bail!(
            ErrorKind::DecodeError,
            "Wrong oplog structure",
            format!("expected `o` to be a document, received `{other}`")
        ),
        None => bail!(
            ErrorKind::DecodeError,
            "Wrong oplog structure",
            "the oplog entry has no `o` key"
        ),
    };

    let mut record = OperationRecord {
        kind,
        database,
        table,
        fields: Vec::new(),
        condition: None,
        update_kind: None,
    };

    match kind {
        OperationKind::Insert => {
            if object.is_empty() {
                bail!(
                    ErrorKind::DecodeError,
                    "Wrong oplog structure",
                    format!("insert into `{}` has an empty document", record.namespace())
                );
            }

            record.fields = into_fields(object);
        }
        OperationKind::Update => {
            let (update_kind, fields) = decode_update_diff(object)?;
            record.update_kind = Some(update_kind);
            record.fields = fields;
            record.condition = Some(decode_condition(entry.remove("o2"))?);
        }
        OperationKind::Delete => {
            // Deletes carry their selector in `o`, unless an explicit `o2` is given.
            let condition = match entry.remove("o2") {
                Some(condition) => condition,
                None => Value::Object(object),
            };
            record.condition = Some(decode_condition(Some(condition))?);
        }
    }

    Ok(record)
}

/// Decodes the `op` code of an entry.
fn decode_operation_kind(op: Option<&Value>) -> OplogResult<OperationKind> {
    let code = match op {
        Some(Value::String(code)) => code,
        Some(other) => bail!(
            ErrorKind::UnknownOperation,
            "Unknown operation",
            other.to_string()
        ),
        None => bail!(
            ErrorKind::DecodeError,
            "Wrong oplog structure",
            "the oplog entry has no `op` key"
        ),
    };

    let kind = match code.as_str() {
        "i" => OperationKind::Insert,
        "u" => OperationKind::Update,
        "d" => OperationKind::Delete,
        other => bail!(ErrorKind::UnknownOperation, "Unknown operation", other),
    };

    Ok(kind)
}

/// Extracts the branch and fields of an update.
///
/// Oplog v2 entries carry `{"diff": {"u": {...}}}` (and `"i"` for newly added fields) for set
/// operations and `{"diff": {"d": {...}}}` for unset operations. Older entries use the
/// `{"$set": {...}}` and `{"$unset": {...}}` operators. The first non-empty branch in declaration
/// order wins.
fn decode_update_diff(
    mut object: Map<String, Value>,
) -> OplogResult<(UpdateKind, Vec<KeyValue>)> {
    let (branches, legacy) = match object.remove(DIFF_KEY) {
        Some(Value::Object(diff)) => (diff, false),
        Some(other) => bail!(
            ErrorKind::MissingDiff,
            "No update diff found",
            format!("expected `diff` to be a document, received `{other}`")
        ),
        None => (object, true),
    };

    for (branch, fields) in branches {
        let update_kind = match (branch.as_str(), legacy) {
            ("u" | "i", false) | ("$set", true) => UpdateKind::Set,
            ("d", false) | ("$unset", true) => UpdateKind::Unset,
            _ => continue,
        };

        if let Value::Object(fields) = fields
            && !fields.is_empty()
        {
            return Ok((update_kind, into_fields(fields)));
        }
    }

    bail!(
        ErrorKind::MissingDiff,
        "No update diff found",
        "the update has no non-empty set or unset branch"
    );
}

/// Extracts the row selector from a condition document.
///
/// When the document has several keys, the first one in declaration order is used.
fn decode_condition(condition: Option<Value>) -> OplogResult<KeyValue> {
    let condition = match condition {
        Some(Value::Object(condition)) => condition,
        Some(other) => bail!(
            ErrorKind::MissingCondition,
            "No query condition found",
            format!("expected the condition to be a document, received `{other}`")
        ),
        None => bail!(
            ErrorKind::MissingCondition,
            "No query condition found",
            "the oplog entry has no `o2` key"
        ),
    };

    match into_fields(condition).into_iter().next() {
        Some(condition) => Ok(condition),
        None => bail!(
            ErrorKind::MissingCondition,
            "No query condition found",
            "the condition document is empty"
        ),
    }
}

/// Converts a document into fields, keeping declaration order.
fn into_fields(document: Map<String, Value>) -> Vec<KeyValue> {
    document
        .into_iter()
        .map(|(key, value)| KeyValue::new(key, value))
        .collect()
}
