//! Service adapters: concrete implementations of the ports.

pub mod headless;
pub mod memory;
pub mod settings;
#[cfg(feature = "web")]
pub mod web;

pub use headless::{Block, BlockGraph, HeadlessToolkit, HeadlessWorkspace};
pub use memory::{MemoryControls, MemoryLocation, MemoryPreview, MemoryStorage};
pub use settings::{
    get_settings_path, load_settings, load_settings_or_default, parse_settings,
    write_default_settings, SettingsError,
};
#[cfg(feature = "web")]
pub use web::{WebLocation, WebStorage};
