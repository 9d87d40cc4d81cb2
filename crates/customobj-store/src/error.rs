//! Error types for remote store operations.

use customobj_types::{IdentityKey, Version};
use thiserror::Error;

/// Errors a remote store call can produce.
///
/// `NotFound` is the only kind callers routinely treat as a non-fatal answer;
/// everything else is a failure of the call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live object exists at the identity.
    #[error("custom object not found: {identity}")]
    NotFound { identity: IdentityKey },

    /// An object already lives at the identity and no version was supplied.
    #[error("custom object already exists: {identity}")]
    AlreadyExists { identity: IdentityKey },

    /// The supplied version does not match the live object.
    #[error("version conflict on {identity}: expected {expected}, found {actual}")]
    VersionConflict {
        identity: IdentityKey,
        expected: Version,
        actual: Version,
    },

    /// Network, authentication, or protocol failure reaching the store.
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for the 404-equivalent answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns `true` for conflict-class errors (existing object or stale version).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::AlreadyExists { .. } | StoreError::VersionConflict { .. }
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
