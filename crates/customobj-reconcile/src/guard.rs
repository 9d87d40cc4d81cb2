//! Per-resource mutual exclusion.
//!
//! Operations that read a version and then write with it must not overlap
//! for the same local resource, or the client defeats the store's optimistic
//! concurrency on its own. [`LockTable`] maps a local resource identifier to
//! a lock that is created on first use. Different identifiers never contend.
//!
//! A process-wide table is available through [`init`] and [`global`]. It
//! lives for the rest of the process once created.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

/// State of one resource lock.
#[derive(Debug, Default)]
struct KeyLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl KeyLock {
    fn state(&self) -> MutexGuard<'_, bool> {
        // `held` is a plain flag, so a poisoned mutex still holds a valid value.
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Table of per-resource locks keyed by local resource id.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<HashMap<String, Arc<KeyLock>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: &str) -> Arc<KeyLock> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    /// Acquire the lock for `id`, blocking until it is free.
    ///
    /// The lock is held until the returned guard is dropped.
    pub fn lock(&self, id: &str) -> ResourceGuard {
        let key = self.entry(id);
        {
            let mut held = key.state();
            while *held {
                debug!(resource = id, "waiting for resource lock");
                held = key
                    .released
                    .wait(held)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            *held = true;
        }
        ResourceGuard {
            id: id.to_string(),
            key,
        }
    }

    /// Returns `true` if some caller currently holds the lock for `id`.
    pub fn is_locked(&self, id: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.get(id).is_some_and(|key| *key.state())
    }
}

/// Holds a resource lock; releases it on drop.
#[derive(Debug)]
#[must_use = "the resource lock is released as soon as the guard is dropped"]
pub struct ResourceGuard {
    id: String,
    key: Arc<KeyLock>,
}

impl ResourceGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        *self.key.state() = false;
        self.key.released.notify_one();
    }
}

static GLOBAL: OnceLock<Arc<LockTable>> = OnceLock::new();

/// Initialize the process-wide lock table. Calling it again is a no-op.
pub fn init() {
    let _ = global();
}

/// The process-wide lock table, created on first use if [`init`] was not
/// called.
pub fn global() -> Arc<LockTable> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(LockTable::new())))
}
