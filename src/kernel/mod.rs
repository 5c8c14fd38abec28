//! Headless session core (config, persistence, plugins, lifecycle).

pub mod action;
pub mod effect;
pub mod error;
pub mod gate;
pub mod handle;
pub mod language;
pub mod persistence;
pub mod plugins;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod toolbox;

pub use action::{Action, LanguageSource};
pub use effect::Effect;
pub use error::SessionError;
pub use gate::{Phase, RebootGate};
pub use handle::SessionHandle;
pub use language::LanguageCode;
pub use persistence::{OptionFlag, OptionSet, PersistenceBridge};
pub use plugins::{CapabilityHandle, Plugin, PluginError, PluginId, PluginRegistry};
pub use session::{DispatchResult, SessionManager, SessionServices};
pub use state::{ConfigPatch, PanelLayout, RendererId, SessionConfig, ThemeId, ToolboxMode};
pub use store::ConfigStore;
pub use toolbox::{CategoryNode, NodeKind, ToolboxSchema};
