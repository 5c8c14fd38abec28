//! Browser adapters over `sessionStorage` and the History API.

use wasm_bindgen::JsValue;

use crate::kernel::services::ports::{PageLocation, SessionStorage, StorageError};

fn rejected(key: &str, err: JsValue) -> StorageError {
    StorageError::Rejected {
        key: key.to_string(),
        reason: format!("{err:?}"),
    }
}

/// Tab-scoped storage of the current window.
#[derive(Debug, Default)]
pub struct WebStorage {
    storage: Option<web_sys::Storage>,
}

impl WebStorage {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| match window.session_storage() {
            Ok(storage) => storage,
            Err(err) => {
                tracing::debug!(error = ?err, "session storage unavailable");
                None
            }
        });
        Self { storage }
    }
}

impl SessionStorage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(storage) = &self.storage else {
            return Err(StorageError::Unavailable);
        };
        storage.get_item(key).map_err(|err| rejected(key, err))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let Some(storage) = &self.storage else {
            return Err(StorageError::Unavailable);
        };
        storage.set_item(key, value).map_err(|err| rejected(key, err))
    }
}

#[derive(Debug, Default)]
pub struct WebLocation;

impl WebLocation {
    pub fn new() -> Self {
        Self
    }
}

impl PageLocation for WebLocation {
    fn search(&self) -> String {
        let Some(window) = web_sys::window() else {
            return String::new();
        };
        window.location().search().unwrap_or_default()
    }

    fn push_search(&mut self, search: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let pushed = window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(search)));
        if let Err(err) = pushed {
            tracing::warn!(error = ?err, "history push rejected");
        }
    }
}
