//! Layout persistence contracts, envelope types, and baseline store implementations.
//!
//! The store is a plain asynchronous key-value surface: `get`/`set` over versioned
//! envelopes, plus a synchronous readiness predicate. Backing stores may come up late
//! (or flake); callers are expected to poll [`KeyValueStore::is_ready`] before writing
//! and to recover from [`StoreError::Backend`] with their own retry policy rather than
//! blocking.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Version for [`LayoutEnvelope`] metadata serialization.
pub const LAYOUT_ENVELOPE_VERSION: u32 = 1;

/// Object-safe boxed future used by [`KeyValueStore`] async methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Typed failure describing why a store operation did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store is not mounted/ready yet; retry later.
    NotReady,
    /// A payload could not be encoded or decoded.
    Codec {
        /// Human-readable serializer diagnostic.
        message: String,
    },
    /// The backing store rejected or failed the operation.
    Backend {
        /// Human-readable backend diagnostic.
        message: String,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "store not ready"),
            Self::Codec { message } => write!(f, "store codec failure: {message}"),
            Self::Backend { message } => write!(f, "store backend failure: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned envelope for persisted layout payloads.
pub struct LayoutEnvelope {
    /// Envelope schema version.
    pub envelope_version: u32,
    /// Store key the envelope is filed under.
    pub key: String,
    /// Owner-defined schema version for the payload.
    pub schema_version: u32,
    /// Last update time in unix milliseconds.
    pub updated_at_unix_ms: u64,
    /// Serialized payload.
    pub payload: Value,
}

impl LayoutEnvelope {
    /// Creates a new envelope and stamps it with a monotonic timestamp.
    pub fn new(key: impl Into<String>, schema_version: u32, payload: Value) -> Self {
        Self {
            envelope_version: LAYOUT_ENVELOPE_VERSION,
            key: key.into(),
            schema_version,
            updated_at_unix_ms: crate::time::next_monotonic_timestamp_ms(),
            payload,
        }
    }
}

/// Storage service for loading and saving layout envelopes by key.
pub trait KeyValueStore {
    /// Returns whether the backing store is mounted and accepting operations.
    ///
    /// Cheap and synchronous; persistence polls this before every write.
    fn is_ready(&self) -> bool;

    /// Loads a persisted envelope by key.
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> StoreFuture<'a, Result<Option<LayoutEnvelope>, StoreError>>;

    /// Saves a full envelope under its key.
    fn set<'a>(&'a self, envelope: &'a LayoutEnvelope) -> StoreFuture<'a, Result<(), StoreError>>;

    /// Deletes a persisted envelope.
    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Result<(), StoreError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for hosts without durable storage; always ready, never retains.
pub struct NoopKeyValueStore;

impl KeyValueStore for NoopKeyValueStore {
    fn is_ready(&self) -> bool {
        true
    }

    fn get<'a>(
        &'a self,
        _key: &'a str,
    ) -> StoreFuture<'a, Result<Option<LayoutEnvelope>, StoreError>> {
        Box::pin(async { Ok(None) })
    }

    fn set<'a>(&'a self, _envelope: &'a LayoutEnvelope) -> StoreFuture<'a, Result<(), StoreError>> {
        Box::pin(async { Ok(()) })
    }

    fn remove<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, Result<(), StoreError>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Default)]
struct MemoryStoreState {
    entries: HashMap<String, LayoutEnvelope>,
    ready: bool,
    reject_writes: bool,
}

#[derive(Debug, Clone)]
/// In-memory store keyed by envelope key, with readiness and write-failure controls
/// so harnesses can exercise the not-ready and backend-failure paths.
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<MemoryStoreState>>,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryStoreState {
                entries: HashMap::new(),
                ready: true,
                reject_writes: false,
            })),
        }
    }
}

impl MemoryKeyValueStore {
    /// Creates a store that reports not-ready until [`Self::set_ready`] flips it.
    pub fn unmounted() -> Self {
        let store = Self::default();
        store.inner.borrow_mut().ready = false;
        store
    }

    /// Flips the readiness predicate.
    pub fn set_ready(&self, ready: bool) {
        self.inner.borrow_mut().ready = ready;
    }

    /// Makes subsequent `set` calls fail with [`StoreError::Backend`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.inner.borrow_mut().reject_writes = reject;
    }

    /// Number of envelopes currently held.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns whether the store holds no envelopes.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn is_ready(&self) -> bool {
        self.inner.borrow().ready
    }

    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> StoreFuture<'a, Result<Option<LayoutEnvelope>, StoreError>> {
        Box::pin(async move {
            let state = self.inner.borrow();
            if !state.ready {
                return Err(StoreError::NotReady);
            }
            Ok(state.entries.get(key).cloned())
        })
    }

    fn set<'a>(&'a self, envelope: &'a LayoutEnvelope) -> StoreFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if !state.ready {
                return Err(StoreError::NotReady);
            }
            if state.reject_writes {
                return Err(StoreError::Backend {
                    message: "write rejected".to_string(),
                });
            }
            state
                .entries
                .insert(envelope.key.clone(), envelope.clone());
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if !state.ready {
                return Err(StoreError::NotReady);
            }
            state.entries.remove(key);
            Ok(())
        })
    }
}

/// Builds a versioned [`LayoutEnvelope`] from a serializable payload.
///
/// # Errors
///
/// Returns [`StoreError::Codec`] when `payload` cannot be converted to JSON.
pub fn build_envelope<T: Serialize>(
    key: &str,
    schema_version: u32,
    payload: &T,
) -> Result<LayoutEnvelope, StoreError> {
    let payload = serde_json::to_value(payload).map_err(|e| StoreError::Codec {
        message: e.to_string(),
    })?;
    Ok(LayoutEnvelope::new(key.to_string(), schema_version, payload))
}

/// Deserializes an envelope payload into a target type.
///
/// # Errors
///
/// Returns [`StoreError::Codec`] when deserialization fails.
pub fn decode_envelope_payload<T: DeserializeOwned>(
    envelope: &LayoutEnvelope,
) -> Result<T, StoreError> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| StoreError::Codec {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_serialization_shape_is_stable() {
        let envelope = LayoutEnvelope {
            envelope_version: LAYOUT_ENVELOPE_VERSION,
            key: "desktop.icons.v1".to_string(),
            schema_version: 3,
            updated_at_unix_ms: 1234,
            payload: json!({"ok": true}),
        };

        let value = serde_json::to_value(&envelope).expect("serialize envelope");
        let object = value.as_object().expect("object");
        assert_eq!(object.get("envelope_version"), Some(&json!(1)));
        assert_eq!(object.get("key"), Some(&json!("desktop.icons.v1")));
        assert_eq!(object.get("schema_version"), Some(&json!(3)));
        assert_eq!(object.get("payload"), Some(&json!({"ok": true})));
    }

    #[test]
    fn memory_store_round_trips_envelopes() {
        let store = MemoryKeyValueStore::default();
        let envelope = build_envelope("k", 1, &json!([1, 2, 3])).expect("build");

        block_on(store.set(&envelope)).expect("set");
        let loaded = block_on(store.get("k")).expect("get").expect("present");

        assert_eq!(loaded.payload, json!([1, 2, 3]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unmounted_store_rejects_io_until_ready() {
        let store = MemoryKeyValueStore::unmounted();
        assert!(!store.is_ready());
        assert_eq!(block_on(store.get("k")), Err(StoreError::NotReady));

        store.set_ready(true);
        assert!(store.is_ready());
        assert_eq!(block_on(store.get("k")), Ok(None));
    }

    #[test]
    fn write_rejection_surfaces_backend_error() {
        let store = MemoryKeyValueStore::default();
        store.set_reject_writes(true);
        let envelope = build_envelope("k", 1, &json!(null)).expect("build");

        assert!(matches!(
            block_on(store.set(&envelope)),
            Err(StoreError::Backend { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn envelope_payload_decodes_into_typed_value() {
        let envelope = build_envelope("k", 1, &vec![10u32, 20, 30]).expect("build");
        let decoded: Vec<u32> = decode_envelope_payload(&envelope).expect("decode");
        assert_eq!(decoded, vec![10, 20, 30]);
    }
}
