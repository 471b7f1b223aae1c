//! Debounce-free save coordinator with readiness gating and capped linear retry.
//!
//! Every save snapshots the registries, writes both envelopes, then verifies the
//! icon write by reading it back. A save that cannot run (store not mounted) or
//! did not stick schedules a retry with a linearly growing, capped delay; after
//! [`MAX_SAVE_ATTEMPTS`] consecutive failures the coordinator logs once and goes
//! quiet until the next explicit save request.

use std::{cell::RefCell, rc::Rc};

use platform_host::{KeyValueStore, LocalSpawner, Scheduler, StoreError, TimerId};

use crate::{
    model::DesktopState,
    persistence::{self, ICONS_STORE_KEY},
};

/// Consecutive failed attempts before the coordinator gives up.
pub const MAX_SAVE_ATTEMPTS: u32 = 30;
/// Base retry delay; attempt `n` waits `n * RETRY_BASE_DELAY_MS`.
pub const RETRY_BASE_DELAY_MS: u64 = 1_000;
/// Ceiling on the retry delay.
pub const RETRY_MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Default)]
struct RetryState {
    attempts: u32,
    pending_retry: Option<TimerId>,
}

struct CoordinatorInner {
    store: Rc<dyn KeyValueStore>,
    scheduler: Rc<dyn Scheduler>,
    spawner: Rc<dyn LocalSpawner>,
    state: Rc<RefCell<DesktopState>>,
    retry: RefCell<RetryState>,
}

/// Drives icon/arrangement persistence for a shared [`DesktopState`].
#[derive(Clone)]
pub struct PersistenceCoordinator {
    inner: Rc<CoordinatorInner>,
}

impl PersistenceCoordinator {
    /// Creates a coordinator over the shared engine state.
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
        spawner: Rc<dyn LocalSpawner>,
        state: Rc<RefCell<DesktopState>>,
    ) -> Self {
        Self {
            inner: Rc::new(CoordinatorInner {
                store,
                scheduler,
                spawner,
                state,
                retry: RefCell::new(RetryState::default()),
            }),
        }
    }

    /// Requests a save of both registries.
    ///
    /// Returns immediately; the write itself runs on the spawner. If the store
    /// is not ready the save is deferred through the retry schedule instead.
    pub fn save(&self) {
        if !self.inner.store.is_ready() {
            self.schedule_retry();
            return;
        }
        let this = self.clone();
        self.inner.spawner.spawn_local(Box::pin(async move {
            match this.write_once().await {
                Ok(()) => {
                    // A stale retry timer from an earlier failure would only
                    // repeat the write; disarm it along with the counter.
                    let pending = {
                        let mut retry = this.inner.retry.borrow_mut();
                        retry.attempts = 0;
                        retry.pending_retry.take()
                    };
                    if let Some(timer) = pending {
                        this.inner.scheduler.cancel(timer);
                    }
                }
                Err(err) => {
                    log::warn!("layout save failed: {err}");
                    this.schedule_retry();
                }
            }
        }));
    }

    /// Cancels any pending retry and saves right now (shutdown path).
    pub fn force_save(&self) {
        let pending = self.inner.retry.borrow_mut().pending_retry.take();
        if let Some(timer) = pending {
            self.inner.scheduler.cancel(timer);
        }
        self.save();
    }

    /// Consecutive failures recorded so far.
    pub fn failed_attempts(&self) -> u32 {
        self.inner.retry.borrow().attempts
    }

    /// Whether a retry timer is armed.
    pub fn retry_pending(&self) -> bool {
        self.inner.retry.borrow().pending_retry.is_some()
    }

    async fn write_once(&self) -> Result<(), StoreError> {
        // Snapshot under a short borrow; the awaits below must not hold it.
        let (icons, arrangement, expected) = {
            let state = self.inner.state.borrow();
            (
                persistence::encode_icons(&state)?,
                persistence::encode_arrangement(&state)?,
                persistence::persistable_icon_count(&state),
            )
        };
        self.inner.store.set(&icons).await?;
        self.inner.store.set(&arrangement).await?;

        // Read-back check: the snapshot we just wrote must decode to the same
        // number of records, otherwise the write did not stick.
        let stored = self
            .inner
            .store
            .get(ICONS_STORE_KEY)
            .await?
            .and_then(|envelope| persistence::decode_icons(&envelope));
        match stored {
            Some(records) if records.len() == expected => Ok(()),
            _ => Err(StoreError::Backend {
                message: "icon snapshot failed read-back verification".to_string(),
            }),
        }
    }

    fn schedule_retry(&self) {
        let mut retry = self.inner.retry.borrow_mut();
        if let Some(timer) = retry.pending_retry.take() {
            self.inner.scheduler.cancel(timer);
        }
        if retry.attempts >= MAX_SAVE_ATTEMPTS {
            log::error!("abandoning layout save after {MAX_SAVE_ATTEMPTS} failed attempts");
            retry.attempts = 0;
            return;
        }
        retry.attempts += 1;
        let delay = (RETRY_BASE_DELAY_MS * u64::from(retry.attempts)).min(RETRY_MAX_DELAY_MS);
        let this = self.clone();
        let timer = self.inner.scheduler.schedule(
            delay,
            Box::new(move || {
                this.inner.retry.borrow_mut().pending_retry = None;
                this.save();
            }),
        );
        retry.pending_retry = Some(timer);
    }
}
