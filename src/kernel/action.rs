use super::plugins::PluginId;
use super::state::{PanelLayout, ToolboxMode};

/// Where a language change takes its new value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    /// The language menu of the page.
    Menu,
    /// The `lang` query parameter.
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChangeLanguage(LanguageSource),
    /// `None` reads the theme menu.
    ChangeTheme(Option<String>),
    /// `None` reads the renderer menu.
    ChangeRenderer(Option<String>),
    SetToolboxMode(ToolboxMode),
    TogglePlugin {
        id: PluginId,
        enabled: bool,
    },
    SetCodeEditor(bool),
    Reboot,
    /// The workspace queued change events; run the listeners over them.
    WorkspaceChanged,
    HistoryNavigated,
    Unload(PanelLayout),
}
