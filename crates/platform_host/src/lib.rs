//! Typed host-service contracts and baseline implementations for the desktop engine.
//!
//! This crate is the API-first boundary between the layout engine and whatever host
//! embeds it. It exposes the asynchronous key-value layout store (with a readiness
//! predicate persistence must poll), the injectable scheduler/clock used for debounce
//! and retry timers, the local task spawner that drives store futures, and the external
//! process registry consulted when floating components are created. Concrete hosts
//! supply their own adapters; the in-memory implementations here back tests and
//! headless embeddings.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod process;
pub mod schedule;
pub mod storage;
pub mod time;

pub use host::HostServices;
pub use process::{PermissiveProcessRegistry, ProcessId, ProcessRegistry, StaticProcessRegistry};
pub use schedule::{
    ImmediateSpawner, LocalSpawner, ManualScheduler, NoopScheduler, Scheduler, TimerId,
};
pub use storage::{
    build_envelope, decode_envelope_payload, KeyValueStore, LayoutEnvelope, MemoryKeyValueStore,
    NoopKeyValueStore, StoreError, StoreFuture, LAYOUT_ENVELOPE_VERSION,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
