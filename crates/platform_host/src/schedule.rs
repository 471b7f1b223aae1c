//! Injectable clock/scheduler and local task-spawner contracts.
//!
//! All deferred work in the engine (resize debounce, drag-click cooldowns, persistence
//! backoff) goes through [`Scheduler`] so hosts decide how timers are realized and tests
//! can simulate time deterministically. Cancellation is explicit and idempotent:
//! cancelling an already-fired or unknown timer is a no-op. Timers due at the same
//! instant fire in the order they were scheduled.

use std::{cell::RefCell, rc::Rc};

use futures::future::LocalBoxFuture;

/// Opaque handle for one scheduled timer.
pub type TimerId = u64;

/// Deferred-callback scheduling and monotonic time for the engine.
pub trait Scheduler {
    /// Current monotonic time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Schedules `callback` to run once after `delay_ms`.
    fn schedule(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancels a scheduled timer. No-op for fired, cancelled, or unknown ids.
    fn cancel(&self, timer: TimerId);
}

/// Spawns a `!Send` future onto the host's single-threaded executor.
pub trait LocalSpawner {
    /// Queues `future` for execution on the current logical thread.
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

#[derive(Debug, Clone, Copy, Default)]
/// Spawner that drives each future to completion inline.
///
/// Suitable when store adapters complete immediately (memory-backed hosts, tests).
pub struct ImmediateSpawner;

impl LocalSpawner for ImmediateSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        futures::executor::block_on(future);
    }
}

struct ScheduledTimer {
    id: TimerId,
    due_at_ms: u64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualSchedulerState {
    now_ms: u64,
    next_id: TimerId,
    next_seq: u64,
    timers: Vec<ScheduledTimer>,
}

#[derive(Clone, Default)]
/// Deterministic scheduler advanced explicitly by the host or a test harness.
///
/// Time only moves inside [`ManualScheduler::advance`]; due timers fire in
/// `(due_at, schedule order)` order, and callbacks may schedule or cancel further
/// timers while the clock advances.
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualSchedulerState>>,
}

impl ManualScheduler {
    /// Creates a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by `ms`, firing every timer that comes due.
    pub fn advance(&self, ms: u64) {
        let target = self.inner.borrow().now_ms.saturating_add(ms);
        loop {
            // Take the earliest due timer without holding the borrow across the
            // callback, which may itself schedule or cancel.
            let next = {
                let mut state = self.inner.borrow_mut();
                let due_index = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_at_ms <= target)
                    .min_by_key(|(_, t)| (t.due_at_ms, t.seq))
                    .map(|(i, _)| i);
                match due_index {
                    Some(i) => {
                        let timer = state.timers.remove(i);
                        state.now_ms = state.now_ms.max(timer.due_at_ms);
                        Some(timer)
                    }
                    None => None,
                }
            };
            match next {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }
        self.inner.borrow_mut().now_ms = target;
    }

    /// Number of timers still pending.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Remaining delays of pending timers, in firing order.
    pub fn pending_delays(&self) -> Vec<u64> {
        let state = self.inner.borrow();
        let mut timers: Vec<_> = state
            .timers
            .iter()
            .map(|t| (t.due_at_ms, t.seq))
            .collect();
        timers.sort_unstable();
        timers
            .into_iter()
            .map(|(due, _)| due.saturating_sub(state.now_ms))
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    fn schedule(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut state = self.inner.borrow_mut();
        state.next_id += 1;
        state.next_seq += 1;
        let id = state.next_id;
        let timer = ScheduledTimer {
            id,
            due_at_ms: state.now_ms.saturating_add(delay_ms),
            seq: state.next_seq,
            callback,
        };
        state.timers.push(timer);
        id
    }

    fn cancel(&self, timer: TimerId) {
        self.inner.borrow_mut().timers.retain(|t| t.id != timer);
    }
}

#[derive(Debug, Default)]
/// Scheduler that drops every callback; for hosts that never defer work.
pub struct NoopScheduler {
    next_id: RefCell<TimerId>,
}

impl Scheduler for NoopScheduler {
    fn now_ms(&self) -> u64 {
        crate::time::unix_time_ms_now()
    }

    fn schedule(&self, _delay_ms: u64, _callback: Box<dyn FnOnce()>) -> TimerId {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        *next
    }

    fn cancel(&self, _timer: TimerId) {}
}
