//! Per-workspace serialization

use docket_domain::WorkspaceId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Registry of one mutex per workspace
///
/// Operations on the same workspace run one at a time; operations on
/// different workspaces never wait on each other. Entries are created on
/// first use and kept for the registry's lifetime.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<WorkspaceId, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `id`
    ///
    /// A poisoned registry is recovered: the map holds no invariant a panic
    /// could break.
    pub fn slot(&self, id: WorkspaceId) -> Arc<Mutex<()>> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slots.entry(id).or_default())
    }

    /// Run `f` while holding the lock of `id`
    pub fn with<T>(&self, id: WorkspaceId, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(id);
        let _guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f()
    }
}
