//! Host service bundle injected into the desktop engine.

use std::rc::Rc;

use crate::{
    ImmediateSpawner, KeyValueStore, LocalSpawner, ManualScheduler, MemoryKeyValueStore,
    PermissiveProcessRegistry, ProcessRegistry, Scheduler,
};

/// Host-selected service bundle handed to the engine at construction time.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `desktop_engine`, which keeps the engine decoupled from concrete storage, timer, and
/// process-tracking adapters.
#[derive(Clone)]
pub struct HostServices {
    /// Durable layout store the persistence coordinator writes through.
    pub store: Rc<dyn KeyValueStore>,
    /// Timer/clock service for debounce, cooldowns, and retry backoff.
    pub scheduler: Rc<dyn Scheduler>,
    /// Executor for store futures on the single logical thread.
    pub spawner: Rc<dyn LocalSpawner>,
    /// Liveness oracle for component owners.
    pub processes: Rc<dyn ProcessRegistry>,
}

impl HostServices {
    /// Memory-backed bundle with a manual clock; for tests and headless embeddings.
    ///
    /// Returns the bundle together with the concrete store and scheduler handles so
    /// harnesses can drive readiness and time directly.
    pub fn in_memory() -> (Self, MemoryKeyValueStore, ManualScheduler) {
        let store = MemoryKeyValueStore::default();
        let scheduler = ManualScheduler::new();
        let services = Self {
            store: Rc::new(store.clone()),
            scheduler: Rc::new(scheduler.clone()),
            spawner: Rc::new(ImmediateSpawner),
            processes: Rc::new(PermissiveProcessRegistry),
        };
        (services, store, scheduler)
    }
}
