//! Store-side semantics shared by the local backends.
//!
//! [`ObjectTable`] is what a remote custom object service does on its end:
//! one live object per identity, versions assigned and checked here.

use std::collections::BTreeMap;

use customobj_types::{IdentityKey, Version, VersionedObject};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

#[derive(Clone, Debug, Default)]
pub(crate) struct ObjectTable {
    objects: BTreeMap<IdentityKey, VersionedObject>,
}

impl ObjectTable {
    pub(crate) fn from_objects(objects: Vec<VersionedObject>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|obj| (obj.identity.clone(), obj))
                .collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn contains(&self, identity: &IdentityKey) -> bool {
        self.objects.contains_key(identity)
    }

    /// All live objects, ordered by identity.
    pub(crate) fn all(&self) -> Vec<VersionedObject> {
        self.objects.values().cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.objects.clear();
    }

    pub(crate) fn create(
        &mut self,
        identity: &IdentityKey,
        value: &Value,
    ) -> StoreResult<VersionedObject> {
        if self.objects.contains_key(identity) {
            return Err(StoreError::AlreadyExists {
                identity: identity.clone(),
            });
        }
        let obj = VersionedObject::new(identity.clone(), value.clone());
        self.objects.insert(identity.clone(), obj.clone());
        Ok(obj)
    }

    pub(crate) fn update(
        &mut self,
        identity: &IdentityKey,
        value: &Value,
        expected: Version,
    ) -> StoreResult<VersionedObject> {
        let live = self
            .objects
            .get_mut(identity)
            .ok_or_else(|| StoreError::NotFound {
                identity: identity.clone(),
            })?;
        if live.version != expected {
            return Err(StoreError::VersionConflict {
                identity: identity.clone(),
                expected,
                actual: live.version,
            });
        }
        *live = live.revised(value.clone());
        Ok(live.clone())
    }

    pub(crate) fn fetch(&self, identity: &IdentityKey) -> StoreResult<VersionedObject> {
        self.objects
            .get(identity)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                identity: identity.clone(),
            })
    }

    pub(crate) fn delete(
        &mut self,
        identity: &IdentityKey,
        version: Version,
        force: bool,
    ) -> StoreResult<VersionedObject> {
        let live = self
            .objects
            .get(identity)
            .ok_or_else(|| StoreError::NotFound {
                identity: identity.clone(),
            })?;
        if !force && live.version != version {
            return Err(StoreError::VersionConflict {
                identity: identity.clone(),
                expected: version,
                actual: live.version,
            });
        }
        self.objects.remove(identity).ok_or_else(|| StoreError::NotFound {
            identity: identity.clone(),
        })
    }
}
