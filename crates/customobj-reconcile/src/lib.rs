//! Reconciliation of declared custom objects against a versioned remote store.
//!
//! A host orchestrator keeps one [`ResourceData`] per declared object and
//! hands it to a [`Reconciler`] for create, read, update, and delete. The
//! reconciler talks to any [`customobj_store::RemoteStore`] and keeps the
//! store's optimistic concurrency intact:
//!
//! - writes always carry the last known version;
//! - renames create the new object before removing the old one;
//! - update and delete are serialized per local resource through the
//!   process-wide [`guard`] table.
//!
//! # Modules
//!
//! - [`error`]: [`ReconcileError`] and the [`Operation`] it failed in
//! - [`guard`]: per-resource lock table
//! - [`state`]: [`ResourceData`], [`DesiredObject`], [`LifecycleState`]
//! - [`schema`]: field descriptions of the resource
//! - [`reconciler`]: the [`Reconciler`] itself

pub mod error;
pub mod guard;
pub mod reconciler;
pub mod schema;
pub mod state;

pub use error::{Operation, ReconcileError, ReconcileResult};
pub use guard::{LockTable, ResourceGuard};
pub use reconciler::{Reconciler, ReconcilerConfig, ValueDecoding};
pub use state::{DesiredObject, LifecycleState, ResourceData};
