//! `setTimeout`-backed expiry scheduler.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use ui_state_host::{ExpiryScheduler, TimerHandle};

#[derive(Default)]
struct WebTimerState {
    next_handle: u64,
    // Scheduler handle to the browser's own timeout id.
    active: HashMap<u64, i32>,
}

#[derive(Clone, Default)]
/// Browser scheduler backed by `window.setTimeout`.
///
/// Clones share the same handle table. Without a `window` (or on non-wasm
/// targets) scheduling is inert: a handle is still returned so callers can
/// cancel it uniformly, but the callback never fires.
pub struct WebScheduler {
    inner: Rc<RefCell<WebTimerState>>,
}

impl WebScheduler {
    /// Creates a scheduler with no active timers.
    pub fn new() -> Self {
        Self::default()
    }

    fn mint_handle(&self) -> TimerHandle {
        let mut state = self.inner.borrow_mut();
        state.next_handle += 1;
        TimerHandle(state.next_handle)
    }
}

impl ExpiryScheduler for WebScheduler {
    fn schedule(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = self.mint_handle();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{prelude::Closure, JsCast};

            let Some(window) = web_sys::window() else {
                return handle;
            };
            let inner = Rc::clone(&self.inner);
            let fired = handle.0;
            let closure = Closure::once_into_js(move || {
                inner.borrow_mut().active.remove(&fired);
                callback();
            });
            // setTimeout takes an i32 delay; longer lifetimes clamp.
            let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
            if let Ok(timeout_id) = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), delay)
            {
                self.inner.borrow_mut().active.insert(handle.0, timeout_id);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (delay_ms, callback);
        }

        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        let timeout_id = self.inner.borrow_mut().active.remove(&handle.0);

        #[cfg(target_arch = "wasm32")]
        if let Some(timeout_id) = timeout_id {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(timeout_id);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = timeout_id;
    }
}
