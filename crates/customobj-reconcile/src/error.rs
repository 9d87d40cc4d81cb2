use std::fmt;

use customobj_store::StoreError;
use customobj_types::{IdentityKey, TypeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle operation a reconciler was performing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Fatal reconciliation failures.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A remote store call failed.
    #[error("could not {op} custom object {identity}: {source}")]
    Store {
        op: Operation,
        identity: IdentityKey,
        #[source]
        source: StoreError,
    },

    /// The declared container or key is not a valid identity.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[source] TypeError),

    /// The declared value was rejected by strict decoding.
    #[error("invalid value for {identity}: {source}")]
    InvalidValue {
        identity: IdentityKey,
        #[source]
        source: TypeError,
    },

    /// The local resource has no remote id yet.
    #[error("cannot {op}: resource has not been created")]
    NotCreated { op: Operation },

    /// An in-place update needs the last known version.
    #[error("cannot update {identity}: no known version, read the resource first")]
    MissingVersion { identity: IdentityKey },
}

impl ReconcileError {
    pub(crate) fn store(op: Operation, identity: &IdentityKey, source: StoreError) -> Self {
        ReconcileError::Store {
            op,
            identity: identity.clone(),
            source,
        }
    }

    /// The underlying store error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ReconcileError::Store { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_not_found)
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self.store_error(), Some(StoreError::VersionConflict { .. }))
    }

    /// Existing object on create, or stale version on write.
    pub fn is_conflict(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_conflict)
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
