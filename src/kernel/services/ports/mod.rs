//! Service ports: traits + data contracts.

pub mod controls;
pub mod location;
pub mod preview;
pub mod settings;
pub mod storage;
pub mod toolkit;

pub use controls::{ConfigField, ControlPanel};
pub use location::PageLocation;
pub use preview::CodePreview;
pub use settings::{SessionDefaults, Settings, DEFAULT_STORAGE_KEY};
pub use storage::{SessionStorage, StorageError};
pub use toolkit::{
    CapabilityToken, EventKind, SnapshotError, Toolkit, WorkspaceEvent, WorkspaceInstance,
    WorkspaceOptions,
};
