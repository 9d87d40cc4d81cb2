//! The [`RemoteStore`] trait defining the remote custom object interface.
//!
//! A real deployment implements this over the store's HTTP API; the crate
//! ships in-memory and file-backed implementations.

use customobj_types::{IdentityKey, Version, VersionedObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// A write request as the remote store's single create endpoint accepts it.
///
/// Without a version the draft creates a new object. With a version it
/// updates the existing object at the same identity, provided the version
/// still matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDraft {
    #[serde(flatten)]
    pub identity: IdentityKey,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl ObjectDraft {
    pub fn new(identity: IdentityKey, value: Value) -> Self {
        Self {
            identity,
            value,
            version: None,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }
}

/// Client capability for a versioned custom object store.
///
/// Every method is a single blocking remote call. Implementations must be
/// thread-safe (`Send + Sync`) and enforce, per identity:
///
/// - at most one live object;
/// - `version` strictly increasing across successful writes;
/// - a stable `remote_id` for the lifetime of the object.
pub trait RemoteStore: Send + Sync {
    /// Create a new object at `identity`.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if an object already lives
    /// there; never overwrites.
    fn create(&self, identity: &IdentityKey, value: &Value) -> StoreResult<VersionedObject>;

    /// Replace the value of the object at `identity` if its live version is
    /// `expected`. Returns the object with its version incremented.
    ///
    /// Fails with [`StoreError::NotFound`] if no object exists and
    /// [`StoreError::VersionConflict`] if `expected` is stale.
    fn update(
        &self,
        identity: &IdentityKey,
        value: &Value,
        expected: Version,
    ) -> StoreResult<VersionedObject>;

    /// Fetch the live object at `identity`.
    ///
    /// Fails with [`StoreError::NotFound`] if there is none.
    fn fetch(&self, identity: &IdentityKey) -> StoreResult<VersionedObject>;

    /// Delete the object at `identity` and return it.
    ///
    /// Unless `force` is set, `version` must match the live version or the
    /// call fails with [`StoreError::VersionConflict`].
    fn delete(
        &self,
        identity: &IdentityKey,
        version: Version,
        force: bool,
    ) -> StoreResult<VersionedObject>;

    /// Submit a draft the way the remote create endpoint does: create when the
    /// draft carries no version, conditional update when it does.
    fn create_or_update(&self, draft: &ObjectDraft) -> StoreResult<VersionedObject> {
        match draft.version {
            None => self.create(&draft.identity, &draft.value),
            Some(expected) => self.update(&draft.identity, &draft.value, expected),
        }
    }

    /// Fetch, mapping [`StoreError::NotFound`] to `Ok(None)`.
    fn fetch_optional(&self, identity: &IdentityKey) -> StoreResult<Option<VersionedObject>> {
        match self.fetch(identity) {
            Ok(obj) => Ok(Some(obj)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for std::sync::Arc<T> {
    fn create(&self, identity: &IdentityKey, value: &Value) -> StoreResult<VersionedObject> {
        (**self).create(identity, value)
    }

    fn update(
        &self,
        identity: &IdentityKey,
        value: &Value,
        expected: Version,
    ) -> StoreResult<VersionedObject> {
        (**self).update(identity, value, expected)
    }

    fn fetch(&self, identity: &IdentityKey) -> StoreResult<VersionedObject> {
        (**self).fetch(identity)
    }

    fn delete(
        &self,
        identity: &IdentityKey,
        version: Version,
        force: bool,
    ) -> StoreResult<VersionedObject> {
        (**self).delete(identity, version, force)
    }
}
