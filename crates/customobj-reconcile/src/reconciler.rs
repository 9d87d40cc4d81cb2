//! Create, read, update, and delete of custom objects against a
//! [`RemoteStore`].
//!
//! Lifecycle per local resource: `Absent -> Created -> (Updated)* -> Deleted`.
//!
//! Rules the reconciler keeps:
//!
//! - Read treats a missing remote object as absence, not failure, and takes
//!   every field from the remote object otherwise.
//! - An update that renames the container or key creates the new object
//!   first and removes the old one second. Failing to remove the old object
//!   is logged and never fails the update.
//! - Delete always works from the live version fetched under the resource
//!   lock, and fails if the object is already gone.
//! - Update and delete hold the resource lock for their whole duration.

use std::sync::Arc;

use customobj_store::{ObjectDraft, RemoteStore, StoreError};
use customobj_types::{
    decode_value, decode_value_strict, encode_value, IdentityKey, RemoteId, Version,
    VersionedObject,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Operation, ReconcileError, ReconcileResult};
use crate::guard::{self, LockTable};
use crate::state::{DesiredObject, LifecycleState, ResourceData};

/// How raw value text is turned into a JSON document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDecoding {
    /// Malformed text is stored as an empty object.
    #[default]
    Lenient,
    /// Malformed text fails the operation.
    Strict,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default)]
    pub value_decoding: ValueDecoding,
}

/// Drives local resources to match the remote store.
pub struct Reconciler<S> {
    store: S,
    locks: Arc<LockTable>,
    config: ReconcilerConfig,
}

impl<S: RemoteStore> Reconciler<S> {
    /// A reconciler using the process-wide lock table and lenient decoding.
    pub fn new(store: S) -> Self {
        Self::with_config(store, ReconcilerConfig::default(), guard::global())
    }

    pub fn with_config(store: S, config: ReconcilerConfig, locks: Arc<LockTable>) -> Self {
        Self {
            store,
            locks,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Create the declared object remotely.
    pub fn create(&self, data: &mut ResourceData) -> ReconcileResult<()> {
        let identity = data.identity().map_err(ReconcileError::InvalidIdentity)?;
        let value = self.decode(&identity, &data.value)?;

        let obj = self
            .store
            .create_or_update(&ObjectDraft::new(identity.clone(), value))
            .map_err(|e| ReconcileError::store(Operation::Create, &identity, e))?;

        data.record_write(&obj, LifecycleState::Created);
        info!(%identity, id = %obj.remote_id, version = %obj.version, "created custom object");
        Ok(())
    }

    /// Refresh local state from the remote object.
    ///
    /// A missing remote object clears the local id and returns `Ok`; the
    /// resource is then absent and will be created on the next apply.
    pub fn read(&self, data: &mut ResourceData) -> ReconcileResult<()> {
        let identity = data
            .known_identity()
            .map_err(ReconcileError::InvalidIdentity)?;
        debug!(%identity, "reading custom object");

        match self.store.fetch(&identity) {
            Ok(obj) => {
                debug!(?obj, "found custom object");
                adopt(data, &obj);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(%identity, "no custom object found");
                data.clear(LifecycleState::Absent);
                Ok(())
            }
            Err(e) => Err(ReconcileError::store(Operation::Read, &identity, e)),
        }
    }

    /// Push the declared state to the remote object.
    ///
    /// With the identity unchanged this is a conditional write against the
    /// last known version. With a renamed container or key the object is
    /// created at the new identity and the old one is force-deleted.
    pub fn update(&self, data: &mut ResourceData) -> ReconcileResult<()> {
        let id = data.id.clone().ok_or(ReconcileError::NotCreated {
            op: Operation::Update,
        })?;
        let _guard = self.locks.lock(id.as_str());

        let identity = data.identity().map_err(ReconcileError::InvalidIdentity)?;
        let value = self.decode(&identity, &data.value)?;

        match data.applied.clone().filter(|applied| *applied != identity) {
            Some(previous) => self.replace(data, previous, identity, value),
            None => {
                let expected = data.version.ok_or_else(|| ReconcileError::MissingVersion {
                    identity: identity.clone(),
                })?;
                let draft = ObjectDraft::new(identity.clone(), value).with_version(expected);
                let obj = self
                    .store
                    .create_or_update(&draft)
                    .map_err(|e| ReconcileError::store(Operation::Update, &identity, e))?;

                data.record_write(&obj, LifecycleState::Updated);
                info!(%identity, id = %obj.remote_id, version = %obj.version, "updated custom object");
                Ok(())
            }
        }
    }

    /// Delete the remote object using its live version.
    ///
    /// Fails if the object cannot be fetched, including when it no longer
    /// exists.
    pub fn delete(&self, data: &mut ResourceData) -> ReconcileResult<()> {
        let id = data.id.clone().ok_or(ReconcileError::NotCreated {
            op: Operation::Delete,
        })?;
        let identity = data
            .known_identity()
            .map_err(ReconcileError::InvalidIdentity)?;

        let _guard = self.locks.lock(id.as_str());

        // The cached version may be stale; delete against the live one.
        let live = self
            .store
            .fetch(&identity)
            .map_err(|e| ReconcileError::store(Operation::Delete, &identity, e))?;
        self.store
            .delete(&identity, live.version, false)
            .map_err(|e| ReconcileError::store(Operation::Delete, &identity, e))?;

        data.clear(LifecycleState::Deleted);
        info!(%identity, %id, version = %live.version, "deleted custom object");
        Ok(())
    }

    /// Adopt an existing remote object by id.
    ///
    /// `desired` supplies the identity to look the object up under; the
    /// returned state carries the remote object's fields. Fails if nothing
    /// lives at that identity.
    pub fn import(
        &self,
        id: impl Into<RemoteId>,
        desired: DesiredObject,
    ) -> ReconcileResult<ResourceData> {
        let mut data = ResourceData::imported(id);
        data.declare(desired);
        let identity = data.identity().map_err(ReconcileError::InvalidIdentity)?;

        self.read(&mut data)?;
        if data.is_absent() {
            return Err(ReconcileError::store(
                Operation::Read,
                &identity,
                StoreError::NotFound {
                    identity: identity.clone(),
                },
            ));
        }
        Ok(data)
    }

    /// Create at the new identity, adopt it, then remove the old object.
    fn replace(
        &self,
        data: &mut ResourceData,
        previous: IdentityKey,
        identity: IdentityKey,
        value: Value,
    ) -> ReconcileResult<()> {
        let previous_version = data.version;

        let obj = self
            .store
            .create_or_update(&ObjectDraft::new(identity.clone(), value))
            .map_err(|e| ReconcileError::store(Operation::Update, &identity, e))?;
        data.record_write(&obj, LifecycleState::Updated);
        info!(
            from = %previous,
            to = %identity,
            id = %obj.remote_id,
            "moved custom object to new identity"
        );

        // The new object is already recorded; cleanup errors end here.
        if let Err(e) = self.remove_superseded(&previous, previous_version) {
            warn!(identity = %previous, error = %e, "failed to remove old custom object");
        }
        Ok(())
    }

    fn remove_superseded(
        &self,
        previous: &IdentityKey,
        version: Option<Version>,
    ) -> ReconcileResult<()> {
        // Forced, so the version is informational only.
        let version = version.unwrap_or(Version::INITIAL);
        self.store
            .delete(previous, version, true)
            .map_err(|e| ReconcileError::store(Operation::Delete, previous, e))?;
        debug!(identity = %previous, "removed old custom object");
        Ok(())
    }

    fn decode(&self, identity: &IdentityKey, raw: &str) -> ReconcileResult<Value> {
        match self.config.value_decoding {
            // Deliberate fallback: malformed text is stored as `{}`.
            ValueDecoding::Lenient => Ok(decode_value(raw)),
            ValueDecoding::Strict => {
                decode_value_strict(raw).map_err(|source| ReconcileError::InvalidValue {
                    identity: identity.clone(),
                    source,
                })
            }
        }
    }
}

/// Overwrite local state with the remote object. The remote wins.
fn adopt(data: &mut ResourceData, obj: &VersionedObject) {
    if let Some(local) = &data.id {
        if *local != obj.remote_id {
            warn!(
                identity = %obj.identity,
                local = %local,
                remote = %obj.remote_id,
                "remote id differs from local state, adopting remote"
            );
        }
    }

    data.container = obj.identity.container().to_string();
    data.key = obj.identity.key().to_string();
    data.value = encode_value(&obj.value);
    if matches!(data.state, LifecycleState::Absent | LifecycleState::Deleted) {
        data.record_write(obj, LifecycleState::Created);
    } else {
        let state = data.state;
        data.record_write(obj, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Barrier, Mutex};
    use std::thread;

    use customobj_store::{InMemoryRemoteStore, StoreResult};
    use proptest::prelude::*;
    use serde_json::json;

    fn reconciler() -> Reconciler<InMemoryRemoteStore> {
        Reconciler::with_config(
            InMemoryRemoteStore::new(),
            ReconcilerConfig::default(),
            Arc::new(LockTable::new()),
        )
    }

    fn id(container: &str, key: &str) -> IdentityKey {
        IdentityKey::new(container, key).unwrap()
    }

    fn resource(container: &str, key: &str, value: &str) -> ResourceData {
        ResourceData::new(DesiredObject::new(container, key, value))
    }

    /// Wraps a store, records call order, and can fail deletes or fetches.
    #[derive(Default)]
    struct ScriptedStore {
        inner: InMemoryRemoteStore,
        calls: Mutex<Vec<String>>,
        fail_deletes: bool,
        fail_fetches: bool,
        locks: Option<(Arc<LockTable>, String)>,
        lock_held: Mutex<Vec<bool>>,
    }

    impl ScriptedStore {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
            if let Some((locks, resource)) = &self.locks {
                self.lock_held.lock().unwrap().push(locks.is_locked(resource));
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RemoteStore for ScriptedStore {
        fn create(&self, identity: &IdentityKey, value: &Value) -> StoreResult<VersionedObject> {
            self.record(format!("create {identity}"));
            self.inner.create(identity, value)
        }

        fn update(
            &self,
            identity: &IdentityKey,
            value: &Value,
            expected: Version,
        ) -> StoreResult<VersionedObject> {
            self.record(format!("update {identity}@{expected}"));
            self.inner.update(identity, value, expected)
        }

        fn fetch(&self, identity: &IdentityKey) -> StoreResult<VersionedObject> {
            self.record(format!("fetch {identity}"));
            if self.fail_fetches {
                return Err(StoreError::Transport("connection reset".into()));
            }
            self.inner.fetch(identity)
        }

        fn delete(
            &self,
            identity: &IdentityKey,
            version: Version,
            force: bool,
        ) -> StoreResult<VersionedObject> {
            self.record(format!("delete {identity}@{version} force={force}"));
            if self.fail_deletes {
                return Err(StoreError::Transport("503 service unavailable".into()));
            }
            self.inner.delete(identity, version, force)
        }
    }

    fn scripted(store: ScriptedStore) -> Reconciler<ScriptedStore> {
        Reconciler::with_config(store, ReconcilerConfig::default(), Arc::new(LockTable::new()))
    }

    // ---- Create ----

    #[test]
    fn create_records_id_and_version() {
        let r = reconciler();
        let mut data = resource("test", "k1", r#"{"a":1}"#);
        r.create(&mut data).unwrap();

        assert!(data.id.is_some());
        assert_eq!(data.version, Some(Version::INITIAL));
        assert_eq!(data.state, LifecycleState::Created);
        assert_eq!(data.applied, Some(id("test", "k1")));
        assert_eq!(r.store().fetch(&id("test", "k1")).unwrap().value, json!({"a": 1}));
    }

    #[test]
    fn create_over_live_object_conflicts() {
        let r = reconciler();
        r.create(&mut resource("test", "k1", r#"{"a":1}"#)).unwrap();

        let mut second = resource("test", "k1", r#"{"a":2}"#);
        let err = r.create(&mut second).unwrap_err();
        assert!(err.is_conflict(), "expected conflict, got: {err}");
        assert!(second.is_absent());
        assert_eq!(r.store().fetch(&id("test", "k1")).unwrap().value, json!({"a": 1}));
    }

    #[test]
    fn create_with_malformed_value_stores_empty_object() {
        let r = reconciler();
        let mut data = resource("test", "k1", "{oops");
        r.create(&mut data).unwrap();
        assert_eq!(r.store().fetch(&id("test", "k1")).unwrap().value, json!({}));
    }

    #[test]
    fn strict_decoding_rejects_malformed_value() {
        let r = Reconciler::with_config(
            InMemoryRemoteStore::new(),
            ReconcilerConfig {
                value_decoding: ValueDecoding::Strict,
            },
            Arc::new(LockTable::new()),
        );
        let mut data = resource("test", "k1", "{oops");
        let err = r.create(&mut data).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidValue { .. }));
        assert!(r.store().is_empty());
    }

    #[test]
    fn create_with_invalid_identity_fails_before_remote_call() {
        let r = scripted(ScriptedStore::default());
        let err = r.create(&mut resource("test", "no/slash", "{}")).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidIdentity(_)));
        assert!(r.store().calls().is_empty());
    }

    // ---- Read ----

    #[test]
    fn read_missing_object_marks_absent() {
        let r = reconciler();
        let mut data = ResourceData::imported("stale-id");
        data.declare(DesiredObject::new("test", "gone", "{}"));

        r.read(&mut data).unwrap();
        assert!(data.is_absent());
        assert!(data.version.is_none());
        assert_eq!(data.state, LifecycleState::Absent);
    }

    #[test]
    fn read_takes_every_field_from_remote() {
        let r = reconciler();
        let mut data = resource("test", "k1", r#"{"a":1}"#);
        r.create(&mut data).unwrap();

        // Another writer moves the object forward.
        r.store()
            .update(&id("test", "k1"), &json!({"a": 5, "b": [1]}), Version::INITIAL)
            .unwrap();

        r.read(&mut data).unwrap();
        assert_eq!(data.version, Some(Version::new(2)));
        assert_eq!(data.value, r#"{"a":5,"b":[1]}"#);
        assert_eq!(data.container, "test");
        assert_eq!(data.key, "k1");
        assert_eq!(data.state, LifecycleState::Created);
    }

    #[test]
    fn read_propagates_transport_errors() {
        let r = scripted(ScriptedStore {
            fail_fetches: true,
            ..ScriptedStore::default()
        });
        let mut data = resource("test", "k1", "{}");
        let err = r.read(&mut data).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Store {
                op: Operation::Read,
                source: StoreError::Transport(_),
                ..
            }
        ));
    }

    #[test]
    fn read_adopts_remote_id() {
        let r = reconciler();
        let created = r.store().create(&id("test", "k1"), &json!(1)).unwrap();

        let mut data = ResourceData::imported("some-other-id");
        data.declare(DesiredObject::new("test", "k1", "1"));
        r.read(&mut data).unwrap();
        assert_eq!(data.id, Some(created.remote_id));
    }

    // ---- Update ----

    #[test]
    fn update_in_place_bumps_version_and_keeps_id() {
        let r = reconciler();
        let mut data = resource("test", "k1", r#"{"a":1}"#);
        r.create(&mut data).unwrap();
        let original_id = data.id.clone();

        data.declare(DesiredObject::new("test", "k1", r#"{"a":2}"#));
        r.update(&mut data).unwrap();

        assert_eq!(data.id, original_id);
        assert_eq!(data.version, Some(Version::new(2)));
        assert_eq!(data.state, LifecycleState::Updated);
        assert_eq!(r.store().fetch(&id("test", "k1")).unwrap().value, json!({"a": 2}));
    }

    #[test]
    fn update_with_stale_version_is_fatal() {
        let r = reconciler();
        let mut data = resource("test", "k1", r#"{"a":1}"#);
        r.create(&mut data).unwrap();
        r.store()
            .update(&id("test", "k1"), &json!({"other": true}), Version::INITIAL)
            .unwrap();

        data.declare(DesiredObject::new("test", "k1", r#"{"a":2}"#));
        let err = r.update(&mut data).unwrap_err();
        assert!(err.is_version_conflict(), "got: {err}");
        assert_eq!(data.version, Some(Version::INITIAL));
        assert_eq!(
            r.store().fetch(&id("test", "k1")).unwrap().value,
            json!({"other": true})
        );
    }

    #[test]
    fn update_requires_created_resource_and_version() {
        let r = reconciler();
        let err = r.update(&mut resource("test", "k1", "{}")).unwrap_err();
        assert!(matches!(err, ReconcileError::NotCreated { op: Operation::Update }));

        let mut imported = ResourceData::imported("abc");
        imported.declare(DesiredObject::new("test", "k1", "{}"));
        let err = r.update(&mut imported).unwrap_err();
        assert!(matches!(err, ReconcileError::MissingVersion { .. }));
    }

    #[test]
    fn rename_creates_new_object_before_deleting_old() {
        let r = scripted(ScriptedStore::default());
        let mut data = resource("c1", "a", r#"{"a":1}"#);
        r.create(&mut data).unwrap();
        let old_id = data.id.clone();

        data.declare(DesiredObject::new("c1", "b", r#"{"a":1}"#));
        r.update(&mut data).unwrap();

        assert_ne!(data.id, old_id);
        assert_eq!(data.version, Some(Version::INITIAL));
        assert_eq!(data.applied, Some(id("c1", "b")));
        assert!(r.store().inner.contains(&id("c1", "b")));
        assert!(!r.store().inner.contains(&id("c1", "a")));
        assert_eq!(
            r.store().calls(),
            vec![
                "create c1/a".to_string(),
                "create c1/b".to_string(),
                "delete c1/a@1 force=true".to_string(),
            ]
        );
    }

    #[test]
    fn rename_survives_failed_cleanup() {
        let r = scripted(ScriptedStore {
            fail_deletes: true,
            ..ScriptedStore::default()
        });
        let mut data = resource("c1", "a", r#"{"a":1}"#);
        r.create(&mut data).unwrap();

        data.declare(DesiredObject::new("c1", "b", r#"{"a":1}"#));
        r.update(&mut data).unwrap();

        let new_obj = r.store().inner.fetch(&id("c1", "b")).unwrap();
        assert_eq!(data.id, Some(new_obj.remote_id));
        assert_eq!(data.version, Some(new_obj.version));
        // The old object leaks rather than the update failing.
        assert!(r.store().inner.contains(&id("c1", "a")));
    }

    #[test]
    fn rename_onto_live_identity_fails_and_keeps_local_state() {
        let r = reconciler();
        let mut data = resource("c1", "a", "1");
        r.create(&mut data).unwrap();
        r.create(&mut resource("c1", "b", "2")).unwrap();
        let before = data.clone();

        data.declare(DesiredObject::new("c1", "b", "1"));
        let err = r.update(&mut data).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(data.id, before.id);
        assert_eq!(data.applied, before.applied);
        assert!(r.store().contains(&id("c1", "a")));
    }

    #[test]
    fn container_rename_is_an_identity_change() {
        let r = reconciler();
        let mut data = resource("c1", "a", "1");
        r.create(&mut data).unwrap();

        data.declare(DesiredObject::new("c2", "a", "1"));
        r.update(&mut data).unwrap();
        assert!(r.store().contains(&id("c2", "a")));
        assert!(!r.store().contains(&id("c1", "a")));
    }

    #[test]
    fn update_holds_resource_lock() {
        let locks = Arc::new(LockTable::new());
        let store = ScriptedStore {
            locks: Some((Arc::clone(&locks), "rid".into())),
            ..ScriptedStore::default()
        };
        let created = store.inner.create(&id("test", "k1"), &json!(1)).unwrap();
        let r = Reconciler::with_config(store, ReconcilerConfig::default(), Arc::clone(&locks));

        let mut data = ResourceData::imported("rid");
        data.declare(DesiredObject::new("test", "k1", "2"));
        data.version = Some(created.version);
        r.update(&mut data).unwrap();

        assert_eq!(*r.store().lock_held.lock().unwrap(), vec![true]);
        assert!(!locks.is_locked("rid"));
    }

    // ---- Delete ----

    #[test]
    fn delete_then_read_is_absent() {
        let r = reconciler();
        let mut data = resource("test", "k1", "{}");
        r.create(&mut data).unwrap();

        r.delete(&mut data).unwrap();
        assert!(data.is_absent());
        assert_eq!(data.state, LifecycleState::Deleted);
        assert!(r.store().is_empty());

        let mut probe = resource("test", "k1", "{}");
        r.read(&mut probe).unwrap();
        assert!(probe.is_absent());
    }

    #[test]
    fn delete_uses_live_version_not_cached() {
        let r = scripted(ScriptedStore::default());
        let mut data = resource("test", "k1", "1");
        r.create(&mut data).unwrap();
        r.store()
            .inner
            .update(&id("test", "k1"), &json!(2), Version::INITIAL)
            .unwrap();
        assert_eq!(data.version, Some(Version::INITIAL));

        r.delete(&mut data).unwrap();
        assert!(r.store().inner.is_empty());
        assert!(r
            .store()
            .calls()
            .contains(&"delete test/k1@2 force=false".to_string()));
    }

    #[test]
    fn delete_of_vanished_object_is_fatal() {
        let r = reconciler();
        let mut data = resource("test", "k1", "1");
        r.create(&mut data).unwrap();
        r.store().clear().unwrap();

        let err = r.delete(&mut data).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, ReconcileError::Store { op: Operation::Delete, .. }));
        assert!(data.id.is_some());
    }

    #[test]
    fn delete_requires_created_resource() {
        let r = reconciler();
        let err = r.delete(&mut resource("test", "k1", "1")).unwrap_err();
        assert!(matches!(err, ReconcileError::NotCreated { op: Operation::Delete }));
    }

    #[test]
    fn delete_holds_resource_lock_and_releases_on_error() {
        let locks = Arc::new(LockTable::new());
        let r = Reconciler::with_config(
            ScriptedStore {
                fail_fetches: true,
                locks: Some((Arc::clone(&locks), "rid".into())),
                ..ScriptedStore::default()
            },
            ReconcilerConfig::default(),
            Arc::clone(&locks),
        );
        let mut data = ResourceData::imported("rid");
        data.declare(DesiredObject::new("test", "k1", "1"));

        assert!(r.delete(&mut data).is_err());
        assert_eq!(*r.store().lock_held.lock().unwrap(), vec![true]);
        assert!(!locks.is_locked("rid"));
    }

    #[test]
    fn concurrent_deletes_of_same_resource_succeed_once() {
        let r = Arc::new(reconciler());
        let mut data = resource("test", "k1", "1");
        r.create(&mut data).unwrap();

        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = Arc::clone(&r);
                let barrier = Arc::clone(&barrier);
                let mut local = data.clone();
                thread::spawn(move || {
                    barrier.wait();
                    r.delete(&mut local)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|res| res.is_ok()).count();
        assert_eq!(ok, 1);
        for err in results.iter().filter_map(|res| res.as_ref().err()) {
            assert!(err.is_not_found() || err.is_version_conflict(), "got: {err}");
        }
        assert!(r.store().is_empty());
    }

    // ---- Import ----

    #[test]
    fn import_populates_from_remote() {
        let r = reconciler();
        let created = r.store().create(&id("test", "k1"), &json!({"x": 1})).unwrap();

        let data = r
            .import(created.remote_id.clone(), DesiredObject::new("test", "k1", "{}"))
            .unwrap();
        assert_eq!(data.id, Some(created.remote_id));
        assert_eq!(data.version, Some(Version::INITIAL));
        assert_eq!(data.value, r#"{"x":1}"#);
        assert_eq!(data.state, LifecycleState::Created);
    }

    #[test]
    fn import_of_missing_object_fails() {
        let r = reconciler();
        let err = r
            .import("nope", DesiredObject::new("test", "k1", "{}"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    // ---- End to end ----

    #[test]
    fn full_lifecycle() {
        let r = reconciler();

        let mut data = resource("test", "k1", r#"{"a":1}"#);
        r.create(&mut data).unwrap();
        assert_eq!(data.version, Some(Version::new(1)));
        let first_id = data.id.clone().unwrap();

        let mut read_back = data.clone();
        r.read(&mut read_back).unwrap();
        assert_eq!(read_back.value, r#"{"a":1}"#);
        assert_eq!(read_back.version, Some(Version::new(1)));

        data.declare(DesiredObject::new("test", "k1", r#"{"a":2}"#));
        r.update(&mut data).unwrap();
        assert_eq!(data.version, Some(Version::new(2)));
        assert_eq!(data.id.as_ref(), Some(&first_id));

        data.declare(DesiredObject::new("test", "k2", r#"{"a":2}"#));
        r.update(&mut data).unwrap();
        assert_ne!(data.id.as_ref(), Some(&first_id));
        assert_eq!(data.version, Some(Version::new(1)));
        assert!(!r.store().contains(&id("test", "k1")));

        r.delete(&mut data).unwrap();
        let mut probe = resource("test", "k2", r#"{"a":2}"#);
        r.read(&mut probe).unwrap();
        assert!(probe.is_absent());
    }

    proptest! {
        #[test]
        fn reconciled_versions_strictly_increase(values in proptest::collection::vec(0u32..1000, 1..15)) {
            let r = reconciler();
            let mut data = resource("test", "k1", "0");
            r.create(&mut data).unwrap();
            let mut last = data.version.unwrap();
            for v in values {
                data.declare(DesiredObject::new("test", "k1", v.to_string()));
                r.update(&mut data).unwrap();
                let next = data.version.unwrap();
                prop_assert!(next > last);
                last = next;
            }
        }
    }
}
