//! Field schema of the custom object resource.
//!
//! Describes what a host declares and what it reads back. The descriptions
//! are user facing.

use serde::Serialize;

/// Resource-level description.
pub const RESOURCE_DESCRIPTION: &str = "Custom objects store arbitrary JSON-formatted data \
    on the remote platform. They persist data that does not fit the standard data model, \
    so no third-party persistence is needed.";

/// How a field gets its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Declared by the user.
    Required,
    /// Reported by the remote store.
    Computed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub ty: FieldType,
    pub description: &'static str,
}

/// All resource fields in declaration order.
pub const FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "container",
        kind: FieldKind::Required,
        ty: FieldType::String,
        description: "A namespace to group custom objects matching the pattern '[-_~.a-zA-Z0-9]+'",
    },
    FieldSchema {
        name: "key",
        kind: FieldKind::Required,
        ty: FieldType::String,
        description: "String matching the pattern '[-_~.a-zA-Z0-9]+'",
    },
    FieldSchema {
        name: "value",
        kind: FieldKind::Required,
        ty: FieldType::String,
        description: "JSON types Number, String, Boolean, Array, Object",
    },
    FieldSchema {
        name: "version",
        kind: FieldKind::Computed,
        ty: FieldType::Int,
        description: "Current version of the object, assigned by the remote store",
    },
];

/// Fields the user must declare.
pub fn required_fields() -> impl Iterator<Item = &'static FieldSchema> {
    FIELDS.iter().filter(|f| f.kind == FieldKind::Required)
}
