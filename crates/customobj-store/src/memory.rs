//! In-memory remote store for testing and ephemeral use.
//!
//! [`InMemoryRemoteStore`] keeps all objects in a map protected by a
//! `RwLock`. It enforces the full [`RemoteStore`] contract and is what the
//! reconciler's tests run against.

use std::sync::RwLock;

use customobj_types::{IdentityKey, Version, VersionedObject};
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::table::ObjectTable;
use crate::traits::RemoteStore;

/// An in-memory implementation of [`RemoteStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    table: RwLock<ObjectTable>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Transport(format!("lock poisoned: {e}"))
}

impl InMemoryRemoteStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if an object lives at `identity`.
    pub fn contains(&self, identity: &IdentityKey) -> bool {
        self.table
            .read()
            .map(|t| t.contains(identity))
            .unwrap_or(false)
    }

    /// All live objects, ordered by identity.
    pub fn snapshot(&self) -> StoreResult<Vec<VersionedObject>> {
        Ok(self.table.read().map_err(poisoned)?.all())
    }

    /// Remove every object.
    pub fn clear(&self) -> StoreResult<()> {
        self.table.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl RemoteStore for InMemoryRemoteStore {
    fn create(&self, identity: &IdentityKey, value: &Value) -> StoreResult<VersionedObject> {
        debug!(%identity, "create custom object");
        self.table.write().map_err(poisoned)?.create(identity, value)
    }

    fn update(
        &self,
        identity: &IdentityKey,
        value: &Value,
        expected: Version,
    ) -> StoreResult<VersionedObject> {
        debug!(%identity, %expected, "update custom object");
        self.table
            .write()
            .map_err(poisoned)?
            .update(identity, value, expected)
    }

    fn fetch(&self, identity: &IdentityKey) -> StoreResult<VersionedObject> {
        self.table.read().map_err(poisoned)?.fetch(identity)
    }

    fn delete(
        &self,
        identity: &IdentityKey,
        version: Version,
        force: bool,
    ) -> StoreResult<VersionedObject> {
        debug!(%identity, %version, force, "delete custom object");
        self.table
            .write()
            .map_err(poisoned)?
            .delete(identity, version, force)
    }
}
