//! Foundation types for custom objects.
//!
//! A custom object is an arbitrary JSON document stored remotely under a
//! `(container, key)` identity and guarded by a store-assigned version.
//! Every other `customobj` crate depends on `customobj-types`.
//!
//! # Key Types
//!
//! - [`IdentityKey`]: Validated `(container, key)` address
//! - [`RemoteId`]: Opaque id assigned by the remote store
//! - [`Version`]: Optimistic concurrency counter
//! - [`VersionedObject`]: A custom object as the remote store holds it
//!
//! The [`value`] module converts between raw JSON text and documents.

pub mod error;
pub mod identity;
pub mod object;
pub mod value;

pub use error::TypeError;
pub use identity::{validate_segment, IdentityKey};
pub use object::{RemoteId, Version, VersionedObject};
pub use value::{decode_value, decode_value_strict, encode_value, values_equivalent};
