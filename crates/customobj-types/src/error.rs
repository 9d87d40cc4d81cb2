use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidSegment {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid JSON value: {0}")]
    InvalidValue(String),
}
