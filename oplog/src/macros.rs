//! Macros for oplog error handling.
//!
//! Provides convenience macros for creating and returning [`crate::error::OplogError`] instances
//! with reduced boilerplate.

/// Creates an [`crate::error::OplogError`] from error kind and description.
///
/// Accepts an optional dynamic detail (anything implementing [`ToString`]) and an optional
/// source error.
#[macro_export]
macro_rules! oplog_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::OplogError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::OplogError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::OplogError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::OplogError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Creates and returns an [`crate::error::OplogError`] from the current function.
///
/// Supports the same optional detail and source arguments as [`oplog_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::oplog_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::oplog_error!($kind, $desc, source: $source))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::oplog_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::oplog_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
