use serde::{Deserialize, Serialize};

use crate::kernel::language::LanguageCode;
use crate::kernel::plugins::PluginId;
use crate::kernel::state::{RendererId, SessionConfig, ThemeId, ToolboxMode};
use crate::kernel::toolbox::ToolboxSchema;

/// Everything the toolkit needs to build a workspace instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceOptions {
    pub language: LanguageCode,
    pub rtl: bool,
    pub theme: ThemeId,
    pub renderer: RendererId,
    pub toolbox: ToolboxSchema,
    pub toolbox_mode: ToolboxMode,
}

impl WorkspaceOptions {
    /// Options for `config`, with `toolbox` already localized.
    pub fn new(config: &SessionConfig, toolbox: ToolboxSchema) -> Self {
        Self {
            language: config.language().clone(),
            rtl: config.is_right_to_left(),
            theme: config.theme().clone(),
            renderer: config.renderer().clone(),
            toolbox,
            toolbox_mode: config.toolbox_mode(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BlockCreate,
    BlockDelete,
    BlockChange,
    BlockMove,
    VarCreate,
    VarDelete,
    VarRename,
    CommentChange,
    FinishedLoading,
    ViewportChange,
    Click,
    Selected,
    ToolboxItemSelect,
    ThemeChange,
    BubbleOpen,
    DragStart,
    DragStop,
}

impl EventKind {
    /// UI events (scrolling, zooming, selection, ...) carry no content.
    pub fn is_ui(self) -> bool {
        matches!(
            self,
            Self::ViewportChange
                | Self::Click
                | Self::Selected
                | Self::ToolboxItemSelect
                | Self::ThemeChange
                | Self::BubbleOpen
                | Self::DragStart
                | Self::DragStop
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEvent {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    /// Fired while a block drag was in progress.
    #[serde(default)]
    pub during_drag: bool,
}

impl WorkspaceEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            block_id: None,
            during_drag: false,
        }
    }

    pub fn for_block(kind: EventKind, block_id: impl Into<String>) -> Self {
        Self {
            kind,
            block_id: Some(block_id.into()),
            during_drag: false,
        }
    }

    pub fn is_ui(&self) -> bool {
        self.kind.is_ui()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityToken(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not a block graph: {0}")]
    Malformed(String),
}

/// A live editing surface bound to its container.
///
/// [`WorkspaceInstance::dispose`] consumes the instance: once disposed the old
/// handle cannot be used again.
pub trait WorkspaceInstance {
    fn save(&self) -> serde_json::Value;

    fn load(&mut self, snapshot: &serde_json::Value) -> Result<(), SnapshotError>;

    /// Turns change notification on or off; while off no events are queued.
    fn set_events_enabled(&mut self, enabled: bool);

    /// Drains the change events fired since the last call.
    fn take_events(&mut self) -> Vec<WorkspaceEvent>;

    /// Monotonic counter bumped by every content change.
    fn change_count(&self) -> u64;

    fn supports_theme_swap(&self) -> bool;

    fn set_theme(&mut self, theme: &ThemeId);

    fn apply_toolbox_mode(&mut self, mode: ToolboxMode);

    fn scroll_center(&mut self);

    fn generate_code(&self) -> String;

    fn enable_capability(&mut self, id: PluginId) -> CapabilityToken;

    fn disable_capability(&mut self, token: CapabilityToken);

    fn set_overlay_visible(&mut self, id: PluginId, visible: bool);

    fn dispose(self)
    where
        Self: Sized;
}

pub trait Toolkit {
    type Instance: WorkspaceInstance;

    fn create(&mut self, options: &WorkspaceOptions) -> Self::Instance;
}
