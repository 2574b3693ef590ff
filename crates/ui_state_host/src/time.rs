//! Time helpers and the clock abstraction used by expiry bookkeeping.

use std::{cell::Cell, rc::Rc};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Millisecond clock used by notification timestamps and expiry checks.
///
/// All time reads flow through this trait so tests can substitute virtual
/// time for wall-clock waits.
pub trait Clock {
    /// Returns the current unix timestamp in milliseconds.
    fn now_unix_ms(&self) -> u64;
}

/// Shared single-threaded clock handle.
pub type SharedClock = Rc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
/// Wall-clock implementation backed by [`unix_time_ms_now`].
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ms(&self) -> u64 {
        unix_time_ms_now()
    }
}

#[derive(Debug, Clone, Default)]
/// Settable virtual clock for deterministic tests.
///
/// Clones share the same underlying time.
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a virtual clock reading `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(now_ms)),
        }
    }

    /// Sets the virtual time.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    /// Advances the virtual time by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_unix_ms(&self) -> u64 {
        self.now_ms.get()
    }
}
