use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::language::LanguageCode;
use super::plugins::PluginId;

pub const DEFAULT_THEME: &str = "classic";
pub const DEFAULT_RENDERER: &str = "geras";

pub const KNOWN_THEMES: &[&str] = &[
    "classic",
    "modern",
    "deuteranopia",
    "tritanopia",
    "zelos",
    "high_contrast",
    "dark",
    "blackWhite",
    "seshat",
];

pub const KNOWN_RENDERERS: &[&str] = &["geras", "thrasos", "zelos", "minimalist"];

macro_rules! string_id {
    ($name:ident, $default:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(CompactString);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(CompactString::from(id.as_ref().trim()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($default)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_id!(ThemeId, DEFAULT_THEME);
string_id!(RendererId, DEFAULT_RENDERER);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolboxMode {
    /// Collapsible category tree with one flyout per category.
    #[default]
    CategoryTree,
    /// One continuous flyout listing every category.
    Flat,
}

/// Snapshot of the session configuration.
///
/// Fields are private so that `is_right_to_left` can only ever be derived from
/// the language code; the store is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    language: LanguageCode,
    is_right_to_left: bool,
    theme: ThemeId,
    renderer: RendererId,
    enabled_plugins: BTreeSet<PluginId>,
    toolbox_mode: ToolboxMode,
    code_editor: bool,
}

impl SessionConfig {
    pub fn new(
        language: LanguageCode,
        theme: ThemeId,
        renderer: RendererId,
        enabled_plugins: BTreeSet<PluginId>,
        toolbox_mode: ToolboxMode,
        code_editor: bool,
    ) -> Self {
        let is_right_to_left = language.is_right_to_left();
        Self {
            language,
            is_right_to_left,
            theme,
            renderer,
            enabled_plugins,
            toolbox_mode,
            code_editor,
        }
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn is_right_to_left(&self) -> bool {
        self.is_right_to_left
    }

    pub fn theme(&self) -> &ThemeId {
        &self.theme
    }

    pub fn renderer(&self) -> &RendererId {
        &self.renderer
    }

    pub fn enabled_plugins(&self) -> &BTreeSet<PluginId> {
        &self.enabled_plugins
    }

    pub fn is_plugin_enabled(&self, id: PluginId) -> bool {
        self.enabled_plugins.contains(&id)
    }

    pub fn toolbox_mode(&self) -> ToolboxMode {
        self.toolbox_mode
    }

    pub fn code_editor(&self) -> bool {
        self.code_editor
    }

    pub(super) fn apply(&mut self, patch: ConfigPatch) {
        if let Some(language) = patch.language {
            self.is_right_to_left = language.is_right_to_left();
            self.language = language;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(renderer) = patch.renderer {
            self.renderer = renderer;
        }
        if let Some(enabled) = patch.enabled_plugins {
            self.enabled_plugins = enabled;
        }
        if let Some(mode) = patch.toolbox_mode {
            self.toolbox_mode = mode;
        }
        if let Some(code_editor) = patch.code_editor {
            self.code_editor = code_editor;
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(
            LanguageCode::default(),
            ThemeId::default(),
            RendererId::default(),
            BTreeSet::new(),
            ToolboxMode::default(),
            false,
        )
    }
}

/// Partial update for [`SessionConfig`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub language: Option<LanguageCode>,
    pub theme: Option<ThemeId>,
    pub renderer: Option<RendererId>,
    pub enabled_plugins: Option<BTreeSet<PluginId>>,
    pub toolbox_mode: Option<ToolboxMode>,
    pub code_editor: Option<bool>,
}

impl ConfigPatch {
    pub fn language(language: LanguageCode) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }

    pub fn theme(theme: ThemeId) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn renderer(renderer: RendererId) -> Self {
        Self {
            renderer: Some(renderer),
            ..Self::default()
        }
    }

    pub fn enabled_plugins(enabled: BTreeSet<PluginId>) -> Self {
        Self {
            enabled_plugins: Some(enabled),
            ..Self::default()
        }
    }

    pub fn toolbox_mode(mode: ToolboxMode) -> Self {
        Self {
            toolbox_mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn code_editor(enabled: bool) -> Self {
        Self {
            code_editor: Some(enabled),
            ..Self::default()
        }
    }
}

/// Flex sizes of the resizable editor panels, kept verbatim as CSS values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
}

impl PanelLayout {
    pub const KEYS: [&'static str; 4] = [
        "flex_container_up",
        "flex_container_up_left",
        "flex_container_up_right",
        "flex_container_bottom",
    ];

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_none())
    }

    pub fn entries(&self) -> [(&'static str, Option<&str>); 4] {
        [
            (Self::KEYS[0], self.up.as_deref()),
            (Self::KEYS[1], self.up_left.as_deref()),
            (Self::KEYS[2], self.up_right.as_deref()),
            (Self::KEYS[3], self.bottom.as_deref()),
        ]
    }

    pub fn set(&mut self, key: &str, value: String) {
        match key {
            "flex_container_up" => self.up = Some(value),
            "flex_container_up_left" => self.up_left = Some(value),
            "flex_container_up_right" => self.up_right = Some(value),
            "flex_container_bottom" => self.bottom = Some(value),
            _ => {}
        }
    }
}
