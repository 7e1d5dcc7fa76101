//! `localStorage`/`sessionStorage`-backed key-value store.
//!
//! The Web Storage API is synchronous, so this adapter maps straight onto
//! [`platform_host::KeyValueStore`] without any future plumbing.

use platform_host::{KeyValueStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which Web Storage area a [`WebKeyValueStore`] targets.
pub enum StorageArea {
    /// `window.localStorage`: durable, shared by every tab of the origin.
    Local,
    /// `window.sessionStorage`: scoped to the current browsing session.
    Session,
}

impl StorageArea {
    /// Returns the browser API name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Local => "localStorage",
            Self::Session => "sessionStorage",
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Browser key-value store backed by one Web Storage area.
pub struct WebKeyValueStore {
    area: StorageArea,
}

impl Default for WebKeyValueStore {
    fn default() -> Self {
        Self::local()
    }
}

impl WebKeyValueStore {
    /// Store over `window.localStorage`.
    pub const fn local() -> Self {
        Self {
            area: StorageArea::Local,
        }
    }

    /// Store over `window.sessionStorage`.
    pub const fn session() -> Self {
        Self {
            area: StorageArea::Session,
        }
    }

    /// Returns the targeted storage area.
    pub fn area(self) -> StorageArea {
        self.area
    }

    #[cfg(target_arch = "wasm32")]
    fn storage(self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("window unavailable".into()))?;
        let storage = match self.area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        storage
            .ok()
            .flatten()
            .ok_or_else(|| StorageError::Unavailable(format!("{} unavailable", self.area.name())))
    }
}

#[cfg(target_arch = "wasm32")]
fn map_write_error(area: StorageArea, err: wasm_bindgen::JsValue) -> StorageError {
    use wasm_bindgen::JsCast;

    match err.dyn_ref::<web_sys::DomException>() {
        // 22 is the legacy QUOTA_EXCEEDED_ERR code still reported by some engines.
        Some(dom) if dom.name() == "QuotaExceededError" || dom.code() == 22 => {
            StorageError::QuotaExceeded(dom.message())
        }
        _ => StorageError::Backend(format!("{} set_item failed: {err:?}", area.name())),
    }
}

impl KeyValueStore for WebKeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = self.storage()?;
            storage.get_item(key).map_err(|err| {
                StorageError::Backend(format!("{} get_item failed: {err:?}", self.area.name()))
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn write(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = self.storage()?;
            storage
                .set_item(key, raw_json)
                .map_err(|err| map_write_error(self.area, err))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Ok(())
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = self.storage()?;
            storage.remove_item(key).map_err(|err| {
                StorageError::Backend(format!("{} remove_item failed: {err:?}", self.area.name()))
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_build_behaves_as_empty_store() {
        let store = WebKeyValueStore::session();
        assert_eq!(store.area(), StorageArea::Session);
        store.write("k", "1").expect("write");
        assert_eq!(store.read("k").expect("read"), None);
        store.remove("k").expect("remove");
    }
}
