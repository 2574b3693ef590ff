//! Name-keyed registry of notification action callbacks.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::notification::{Action, Notification};

/// Handler run when a notification action is taken.
///
/// Returning `true` asks for the owning notification to be dismissed.
pub type ActionCallback = Rc<dyn Fn(&Action, &Notification) -> bool>;

#[derive(Clone, Default)]
/// Callback registry with idempotent overwrite-by-name semantics.
///
/// Clones share the same underlying map.
pub struct CallbackRegistry {
    inner: Rc<RefCell<HashMap<String, ActionCallback>>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `name`, replacing any previous handler.
    ///
    /// Returns the name so call sites can hand it straight to an
    /// [`Action`](crate::notification::Action).
    pub fn register(
        &self,
        name: impl Into<String>,
        callback: impl Fn(&Action, &Notification) -> bool + 'static,
    ) -> String {
        let name = name.into();
        self.inner.borrow_mut().insert(name.clone(), Rc::new(callback));
        name
    }

    /// Whether a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.borrow().contains_key(name)
    }

    /// Runs the handler registered under `name`, if any.
    ///
    /// Returns `Some(dismiss)` when a handler ran, `None` otherwise.
    pub fn invoke(&self, name: &str, action: &Action, notification: &Notification) -> Option<bool> {
        let callback = self.inner.borrow().get(name).cloned()?;
        Some(callback(action, notification))
    }
}

thread_local! {
    static GLOBAL_CALLBACK_REGISTRY: CallbackRegistry = CallbackRegistry::default();
}

/// Returns the process-local callback registry shared by UI call sites.
pub fn callback_registry() -> CallbackRegistry {
    GLOBAL_CALLBACK_REGISTRY.with(CallbackRegistry::clone)
}
