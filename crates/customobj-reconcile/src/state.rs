//! Local representation of a custom object resource.
//!
//! [`ResourceData`] is what a host orchestrator persists between runs. It
//! holds the declared fields (`container`, `key`, raw `value` text), the
//! computed fields learned from the remote store (`id`, `version`), and the
//! identity of the remote object it was last reconciled with. That last
//! piece is what lets an update tell a value change from a rename.

use customobj_types::{IdentityKey, RemoteId, TypeError, Version, VersionedObject};
use serde::{Deserialize, Serialize};

use crate::schema;

/// Where a local resource is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No remote object is known for this resource.
    #[default]
    Absent,
    Created,
    Updated,
    Deleted,
}

/// User-declared desired state. `version` is never declared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredObject {
    pub container: String,
    pub key: String,
    /// Raw JSON text.
    pub value: String,
}

impl DesiredObject {
    pub fn new(
        container: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Check every required field is present and the identity is valid.
    pub fn validate(&self) -> Result<IdentityKey, TypeError> {
        for field in schema::required_fields() {
            let present = match field.name {
                "container" => !self.container.is_empty(),
                "key" => !self.key.is_empty(),
                "value" => !self.value.trim().is_empty(),
                _ => true,
            };
            if !present {
                return Err(TypeError::InvalidSegment {
                    field: field.name,
                    value: String::new(),
                    reason: "required field is missing".into(),
                });
            }
        }
        IdentityKey::new(&self.container, &self.key)
    }
}

/// Local state of one custom object resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Remote id of the object this resource manages; `None` means absent.
    pub id: Option<RemoteId>,
    pub container: String,
    pub key: String,
    /// Raw JSON text.
    pub value: String,
    pub version: Option<Version>,
    /// Identity of the remote object last reconciled with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<IdentityKey>,
    #[serde(default)]
    pub state: LifecycleState,
}

impl ResourceData {
    /// A resource that has not been created yet.
    pub fn new(desired: DesiredObject) -> Self {
        Self {
            container: desired.container,
            key: desired.key,
            value: desired.value,
            ..Self::default()
        }
    }

    /// Adopt an existing remote object knowing only its id.
    ///
    /// The declared identity must be supplied (see [`ResourceData::declare`])
    /// before the next read fills in everything else.
    pub fn imported(id: impl Into<RemoteId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Overlay a new declaration, keeping what is known about the remote
    /// object so the next update can detect an identity change.
    pub fn declare(&mut self, desired: DesiredObject) {
        self.container = desired.container;
        self.key = desired.key;
        self.value = desired.value;
    }

    /// The declared identity.
    pub fn identity(&self) -> Result<IdentityKey, TypeError> {
        IdentityKey::new(&self.container, &self.key)
    }

    /// The declared fields as a [`DesiredObject`].
    pub fn desired(&self) -> DesiredObject {
        DesiredObject::new(&self.container, &self.key, &self.value)
    }

    /// The identity the remote object is known under: the last reconciled
    /// identity if there is one, otherwise the declared one.
    pub fn known_identity(&self) -> Result<IdentityKey, TypeError> {
        match &self.applied {
            Some(applied) => Ok(applied.clone()),
            None => self.identity(),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_none()
    }

    /// Returns `true` if the declared container or key differs from the
    /// identity of the last reconciled remote object.
    pub fn identity_changed(&self) -> bool {
        match &self.applied {
            Some(applied) => applied.container() != self.container || applied.key() != self.key,
            None => false,
        }
    }

    /// Record the result of a successful write.
    pub(crate) fn record_write(&mut self, obj: &VersionedObject, state: LifecycleState) {
        self.id = Some(obj.remote_id.clone());
        self.version = Some(obj.version);
        self.applied = Some(obj.identity.clone());
        self.state = state;
    }

    /// Forget the remote object.
    pub(crate) fn clear(&mut self, state: LifecycleState) {
        self.id = None;
        self.version = None;
        self.applied = None;
        self.state = state;
    }
}
