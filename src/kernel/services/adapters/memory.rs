//! In-process adapters: storage, location history, page controls and the
//! code preview sink. Handles are cheap clones sharing one state so the
//! embedder can keep a copy for inspection.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::kernel::services::ports::{
    CodePreview, ConfigField, ControlPanel, PageLocation, SessionDefaults, SessionStorage,
    StorageError,
};

#[derive(Debug, Default)]
struct StorageInner {
    items: FxHashMap<String, String>,
    writes: FxHashMap<String, usize>,
    unavailable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<StorageInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every access, like a browser with storage
    /// disabled by policy.
    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.inner.borrow_mut().unavailable = true;
        storage
    }

    /// Seeds a value without counting it as a write.
    pub fn seed(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .items
            .insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }

    pub fn write_count(&self, key: &str) -> usize {
        self.inner.borrow().writes.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        if inner.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.unavailable {
            return Err(StorageError::Unavailable);
        }
        inner.items.insert(key.to_string(), value.to_string());
        *inner.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

#[derive(Debug)]
struct LocationInner {
    entries: Vec<String>,
    index: usize,
}

/// Query string plus a browser-like history stack.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    inner: Rc<RefCell<LocationInner>>,
}

impl MemoryLocation {
    pub fn new(search: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LocationInner {
                entries: vec![search.to_string()],
                index: 0,
            })),
        }
    }

    pub fn current(&self) -> String {
        let inner = self.inner.borrow();
        inner.entries[inner.index].clone()
    }

    pub fn history_len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn back(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.index == 0 {
            return false;
        }
        inner.index -= 1;
        true
    }

    pub fn forward(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.index + 1 >= inner.entries.len() {
            return false;
        }
        inner.index += 1;
        true
    }

    /// Replaces the current query, as if the user edited the address bar.
    pub fn navigate(&self, search: &str) {
        self.push(search);
    }

    fn push(&self, search: &str) {
        let mut inner = self.inner.borrow_mut();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(search.to_string());
        inner.index = keep;
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl PageLocation for MemoryLocation {
    fn search(&self) -> String {
        self.current()
    }

    fn push_search(&mut self, search: &str) {
        self.push(search);
    }
}

/// Page controls holding plain values.
#[derive(Debug, Clone, Default)]
pub struct MemoryControls {
    values: Rc<RefCell<FxHashMap<ConfigField, String>>>,
}

impl MemoryControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls preselected the way the page ships them.
    pub fn from_defaults(defaults: &SessionDefaults) -> Self {
        let controls = Self::new();
        controls.set(ConfigField::Language, &defaults.language);
        controls.set(ConfigField::Theme, &defaults.theme);
        controls.set(ConfigField::Renderer, &defaults.renderer);
        controls.set(ConfigField::Options, &defaults.options.join(","));
        controls
    }

    pub fn set(&self, field: ConfigField, value: &str) {
        self.values.borrow_mut().insert(field, value.to_string());
    }

    pub fn clear(&self, field: ConfigField) {
        self.values.borrow_mut().remove(&field);
    }
}

impl ControlPanel for MemoryControls {
    fn value(&self, field: ConfigField) -> Option<String> {
        self.values.borrow().get(&field).cloned()
    }
}

/// Preview sink recording everything it receives.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreview {
    published: Rc<RefCell<Vec<String>>>,
}

impl MemoryPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.published.borrow().len()
    }

    pub fn last(&self) -> Option<String> {
        self.published.borrow().last().cloned()
    }
}

impl CodePreview for MemoryPreview {
    fn publish(&mut self, code: &str) {
        self.published.borrow_mut().push(code.to_string());
    }
}
