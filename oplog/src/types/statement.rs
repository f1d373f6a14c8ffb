use std::fmt;

/// The category of a rendered SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    CreateSchema,
    CreateTable,
    AlterTable,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Returns `true` for schema-changing statements.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            StatementKind::CreateSchema | StatementKind::CreateTable | StatementKind::AlterTable
        )
    }
}

/// A single rendered SQL statement.
///
/// The SQL text is stored without its terminating `;`, which is appended by [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    /// Schema name for [`StatementKind::CreateSchema`], table name otherwise.
    target: String,
    sql: String,
}

impl Statement {
    pub fn new(kind: StatementKind, target: impl Into<String>, sql: String) -> Self {
        Self {
            kind,
            target: target.into(),
            sql,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.sql)
    }
}
