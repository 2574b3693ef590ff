//! Session-scoped key/value storage contracts and baseline adapters.
//!
//! Browser storage is synchronous at the API edge, so these contracts are
//! synchronous as well. Concrete browser adapters live in
//! `ui_state_host_web`; the adapters here cover unsupported targets and
//! tests.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Keyed text storage with best-effort availability.
pub trait SessionStore {
    /// Loads the raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when a storage surface exists but the read fails.
    fn load(&self, key: &str) -> Result<Option<String>, String>;

    /// Stores raw text under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when a storage surface exists but the write fails.
    fn save(&self, key: &str, raw: &str) -> Result<(), String>;

    /// Deletes `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when a storage surface exists but the delete fails.
    fn delete(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for targets without a storage surface.
///
/// Loads nothing and accepts writes silently, which turns persistence into a
/// soft skip rather than an error.
pub struct NoopSessionStore;

impl SessionStore for NoopSessionStore {
    fn load(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn save(&self, _key: &str, _raw: &str) -> Result<(), String> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory store for tests and native baselines.
///
/// Clones share the same underlying map.
pub struct MemorySessionStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Returns the stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, raw: &str) -> Result<(), String> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), String> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}
