//! External process-registry contract.
//!
//! Floating components are owned by host processes the engine does not manage. The host
//! supplies liveness checks through [`ProcessRegistry`] and is expected to call back
//! into the engine when an owner terminates so its non-persistent components are
//! purged.

use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use serde::{Deserialize, Serialize};

/// Identifier of a host-managed process that can own components.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProcessId(pub u32);

/// Liveness oracle for component owners.
pub trait ProcessRegistry {
    /// Returns whether `pid` refers to a currently running process.
    fn is_live(&self, pid: ProcessId) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
/// Registry that treats every process id as live; for hosts without process tracking.
pub struct PermissiveProcessRegistry;

impl ProcessRegistry for PermissiveProcessRegistry {
    fn is_live(&self, _pid: ProcessId) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
/// Registry backed by an explicit live set; for tests and headless embeddings.
pub struct StaticProcessRegistry {
    live: Rc<RefCell<BTreeSet<ProcessId>>>,
}

impl StaticProcessRegistry {
    /// Creates an empty registry (no process is live).
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `pid` live.
    pub fn spawn(&self, pid: ProcessId) {
        self.live.borrow_mut().insert(pid);
    }

    /// Marks `pid` terminated.
    pub fn terminate(&self, pid: ProcessId) {
        self.live.borrow_mut().remove(&pid);
    }
}

impl ProcessRegistry for StaticProcessRegistry {
    fn is_live(&self, pid: ProcessId) -> bool {
        self.live.borrow().contains(&pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_registry_tracks_spawn_and_terminate() {
        let registry = StaticProcessRegistry::new();
        assert!(!registry.is_live(ProcessId(7)));

        registry.spawn(ProcessId(7));
        assert!(registry.is_live(ProcessId(7)));

        registry.terminate(ProcessId(7));
        assert!(!registry.is_live(ProcessId(7)));
    }
}
