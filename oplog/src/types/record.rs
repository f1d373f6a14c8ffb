use std::fmt;

use crate::types::KeyValue;

/// The kind of mutation an oplog entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Insert => write!(f, "insert"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

/// Which branch of an update diff was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Fields receive new values.
    Set,
    /// Fields are removed; payload values are only removal markers.
    Unset,
}

/// A normalized oplog entry, ready for translation.
///
/// Records are only built by the decoder, which guarantees a non-empty namespace and a payload
/// matching the kind: inserts carry at least one field, updates carry at least one field, an
/// [`UpdateKind`] and a condition, and deletes carry a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub kind: OperationKind,
    pub database: String,
    pub table: String,
    /// Document fields in source declaration order.
    pub fields: Vec<KeyValue>,
    /// Row selector for updates and deletes.
    pub condition: Option<KeyValue>,
    /// Diff branch for updates.
    pub update_kind: Option<UpdateKind>,
}

impl OperationRecord {
    /// Returns the `database.table` namespace of this record.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }
}
