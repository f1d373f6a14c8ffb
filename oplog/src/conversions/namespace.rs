use std::sync::LazyLock;

use regex::Regex;

use crate::bail;
use crate::error::{ErrorKind, OplogResult};

/// Matches a whole `database.collection` namespace of ASCII word segments, capturing both parts.
static NAMESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)\.([A-Za-z0-9_]+)$").expect("namespace regex is valid")
});

/// Splits a `database.collection` namespace into its `(database, table)` parts.
///
/// Anything that is not exactly two word segments joined by a single dot fails with
/// [`ErrorKind::InvalidNamespace`].
pub fn resolve_namespace(ns: &str) -> OplogResult<(String, String)> {
    let Some(captures) = NAMESPACE_REGEX.captures(ns) else {
        bail!(
            ErrorKind::InvalidNamespace,
            "Invalid structure for namespace",
            format!("expected `database.collection`, received `{ns}`")
        );
    };

    Ok((captures[1].to_owned(), captures[2].to_owned()))
}
