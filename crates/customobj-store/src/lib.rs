//! Remote store capability for custom objects.
//!
//! The reconciler never talks to a concrete backend. It drives the
//! [`RemoteStore`] trait, whose four calls mirror what a versioned custom
//! object service exposes: create, conditional update, fetch by identity,
//! and delete by identity and version.
//!
//! # Storage Backends
//!
//! - [`InMemoryRemoteStore`]: map-based store for tests and embedding
//! - [`FileRemoteStore`]: JSON-file store used by the command-line host
//!
//! # Store Rules
//!
//! 1. At most one live object per `(container, key)`.
//! 2. Versions are assigned by the store and strictly increase per identity.
//! 3. Creating over a live object fails; it never overwrites.
//! 4. Updates and non-forced deletes require the live version.
//! 5. `NotFound` is reported as its own error kind.

pub mod error;
pub mod file;
pub mod memory;
mod table;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileRemoteStore;
pub use memory::InMemoryRemoteStore;
pub use traits::{ObjectDraft, RemoteStore};
