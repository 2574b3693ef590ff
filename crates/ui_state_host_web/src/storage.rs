//! Browser key/value storage adapter.
//!
//! Intentionally small and synchronous at the browser API boundary. An absent
//! storage surface (no `window`, storage disabled) reads as empty and accepts
//! writes silently, so persistence degrades to a soft skip; an available
//! surface that fails mid-operation surfaces an error.

use ui_state_host::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which browser storage surface backs a [`WebStorageStore`].
pub enum StorageArea {
    /// `window.sessionStorage`: cleared when the tab closes.
    Session,
    /// `window.localStorage`: survives across sessions.
    Local,
}

#[derive(Debug, Clone, Copy)]
/// Browser storage adapter over `sessionStorage` or `localStorage`.
pub struct WebStorageStore {
    area: StorageArea,
}

impl WebStorageStore {
    /// Adapter over `window.sessionStorage`.
    pub fn session() -> Self {
        Self {
            area: StorageArea::Session,
        }
    }

    /// Adapter over `window.localStorage`.
    pub fn local() -> Self {
        Self {
            area: StorageArea::Local,
        }
    }

    /// Returns the backing storage area.
    pub fn area(&self) -> StorageArea {
        self.area
    }

    #[cfg(target_arch = "wasm32")]
    fn surface(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        match self.area {
            StorageArea::Session => window.session_storage().ok().flatten(),
            StorageArea::Local => window.local_storage().ok().flatten(),
        }
    }
}

impl SessionStore for WebStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(storage) = self.surface() else {
                return Ok(None);
            };
            storage
                .get_item(key)
                .map_err(|e| format!("storage get_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn save(&self, key: &str, raw: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(storage) = self.surface() else {
                return Ok(());
            };
            storage
                .set_item(key, raw)
                .map_err(|e| format!("storage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw);
            Ok(())
        }
    }

    fn delete(&self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(storage) = self.surface() else {
                return Ok(());
            };
            storage
                .remove_item(key)
                .map_err(|e| format!("storage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}
