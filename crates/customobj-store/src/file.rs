//! File-backed remote store.
//!
//! [`FileRemoteStore`] keeps the same semantics as the in-memory store but
//! persists every object to a single JSON document so state survives across
//! processes. Each mutation rewrites the document through a temporary file in
//! the same directory followed by a rename, so readers never observe a torn
//! file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use customobj_types::{IdentityKey, Version, VersionedObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::table::ObjectTable;
use crate::traits::RemoteStore;

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    objects: Vec<VersionedObject>,
}

/// A [`RemoteStore`] persisted as a JSON file.
pub struct FileRemoteStore {
    path: PathBuf,
    table: Mutex<ObjectTable>,
}

impl FileRemoteStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&text)?;
            ObjectTable::from_objects(file.objects)
        } else {
            ObjectTable::default()
        };
        debug!(path = %path.display(), objects = table.len(), "opened file store");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All live objects, ordered by identity.
    pub fn snapshot(&self) -> StoreResult<Vec<VersionedObject>> {
        let table = self
            .table
            .lock()
            .map_err(|e| StoreError::Transport(format!("lock poisoned: {e}")))?;
        Ok(table.all())
    }

    /// Apply a mutation and persist the result. The file is only rewritten
    /// when the mutation succeeds.
    fn mutate<F>(&self, op: F) -> StoreResult<VersionedObject>
    where
        F: FnOnce(&mut ObjectTable) -> StoreResult<VersionedObject>,
    {
        let mut table = self
            .table
            .lock()
            .map_err(|e| StoreError::Transport(format!("lock poisoned: {e}")))?;
        let mut staged = table.clone();
        let result = op(&mut staged)?;
        self.persist(&staged)?;
        *table = staged;
        Ok(result)
    }

    fn persist(&self, table: &ObjectTable) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let file = StoreFile {
            objects: table.all(),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, &file)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl std::fmt::Debug for FileRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRemoteStore")
            .field("path", &self.path)
            .finish()
    }
}

impl RemoteStore for FileRemoteStore {
    fn create(&self, identity: &IdentityKey, value: &Value) -> StoreResult<VersionedObject> {
        debug!(%identity, "create custom object");
        self.mutate(|t| t.create(identity, value))
    }

    fn update(
        &self,
        identity: &IdentityKey,
        value: &Value,
        expected: Version,
    ) -> StoreResult<VersionedObject> {
        debug!(%identity, %expected, "update custom object");
        self.mutate(|t| t.update(identity, value, expected))
    }

    fn fetch(&self, identity: &IdentityKey) -> StoreResult<VersionedObject> {
        let table = self
            .table
            .lock()
            .map_err(|e| StoreError::Transport(format!("lock poisoned: {e}")))?;
        table.fetch(identity)
    }

    fn delete(
        &self,
        identity: &IdentityKey,
        version: Version,
        force: bool,
    ) -> StoreResult<VersionedObject> {
        debug!(%identity, %version, force, "delete custom object");
        self.mutate(|t| t.delete(identity, version, force))
    }
}
