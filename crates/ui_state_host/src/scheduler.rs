//! Expiry timer abstraction with manual and no-op adapters.
//!
//! Each live notification owns exactly one scheduled callback. Handles make
//! the timers explicitly cancellable; a stale timer that fires anyway is
//! harmless because the fire path is an idempotent remove.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Handle to one scheduled expiry callback.
pub struct TimerHandle(pub u64);

/// One-shot deferred callback scheduling used for notification expiry.
pub trait ExpiryScheduler {
    /// Schedules `callback` to run once after `delay_ms`.
    fn schedule(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerHandle;

    /// Cancels a pending timer. Cancelling a fired or unknown handle is a
    /// no-op.
    fn cancel(&self, handle: TimerHandle);
}

#[derive(Debug, Default)]
/// Scheduler that drops callbacks, for targets without a timer surface.
pub struct NoopScheduler {
    next_handle: Cell<u64>,
}

impl ExpiryScheduler for NoopScheduler {
    fn schedule(&self, _delay_ms: u64, _callback: Box<dyn FnOnce()>) -> TimerHandle {
        self.next_handle.set(self.next_handle.get() + 1);
        TimerHandle(self.next_handle.get())
    }

    fn cancel(&self, _handle: TimerHandle) {}
}

struct PendingTimer {
    handle: TimerHandle,
    due_ms: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualState {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

#[derive(Clone, Default)]
/// Virtual-time scheduler for deterministic tests.
///
/// Timers fire during [`ManualScheduler::advance`] and
/// [`ManualScheduler::advance_to`], in due order, on the calling thread.
/// Clones share the same timeline.
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler whose timeline starts at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        let scheduler = Self::default();
        scheduler.inner.borrow_mut().now_ms = now_ms;
        scheduler
    }

    /// Returns the current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Returns the number of pending timers.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Advances virtual time by `delta_ms`, firing timers that come due.
    pub fn advance(&self, delta_ms: u64) {
        let target = self.inner.borrow().now_ms.saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Advances virtual time to `now_ms`, firing due timers in due order.
    ///
    /// Callbacks run with the interior borrow released, so they may schedule
    /// or cancel further timers.
    pub fn advance_to(&self, now_ms: u64) {
        loop {
            let next = {
                let mut state = self.inner.borrow_mut();
                let due_index = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due_ms <= now_ms)
                    .min_by_key(|(_, timer)| timer.due_ms)
                    .map(|(index, _)| index);
                match due_index {
                    Some(index) => {
                        let timer = state.pending.remove(index);
                        state.now_ms = state.now_ms.max(timer.due_ms);
                        Some(timer.callback)
                    }
                    None => {
                        state.now_ms = state.now_ms.max(now_ms);
                        None
                    }
                }
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
    }
}

impl ExpiryScheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let mut state = self.inner.borrow_mut();
        state.next_handle += 1;
        let handle = TimerHandle(state.next_handle);
        let due_ms = state.now_ms.saturating_add(delay_ms);
        state.pending.push(PendingTimer {
            handle,
            due_ms,
            callback,
        });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.inner
            .borrow_mut()
            .pending
            .retain(|timer| timer.handle != handle);
    }
}
