use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::IdentityKey;

/// Opaque identifier assigned by the remote store on first creation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    /// Generate a new time-ordered id (UUID v7). Used by local backends.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Debug for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemoteId({})", self.0)
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned optimistic concurrency counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly created object.
    pub const INITIAL: Version = Version(1);

    pub fn new(v: u64) -> Self {
        Self(v)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The version a successful write produces.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A custom object as held by the remote store.
///
/// `version` increases with every successful write to the same identity and
/// `remote_id` stays stable across those writes. The value is opaque.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedObject {
    #[serde(rename = "id")]
    pub remote_id: RemoteId,
    #[serde(flatten)]
    pub identity: IdentityKey,
    pub value: Value,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl VersionedObject {
    /// A newly created object at [`Version::INITIAL`] with a fresh remote id.
    pub fn new(identity: IdentityKey, value: Value) -> Self {
        let now = Utc::now();
        Self {
            remote_id: RemoteId::generate(),
            identity,
            value,
            version: Version::INITIAL,
            created_at: now,
            last_modified_at: now,
        }
    }

    /// The object after a successful write of `value`.
    pub fn revised(&self, value: Value) -> Self {
        Self {
            remote_id: self.remote_id.clone(),
            identity: self.identity.clone(),
            value,
            version: self.version.next(),
            created_at: self.created_at,
            last_modified_at: Utc::now(),
        }
    }
}
