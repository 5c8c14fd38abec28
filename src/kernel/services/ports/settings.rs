use serde::{Deserialize, Serialize};

use crate::kernel::language::DEFAULT_LANGUAGE;
use crate::kernel::state::{DEFAULT_RENDERER, DEFAULT_THEME, KNOWN_RENDERERS, KNOWN_THEMES};

pub const DEFAULT_STORAGE_KEY: &str = "mainWorkspace_blocks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub defaults: SessionDefaults,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_known_themes")]
    pub known_themes: Vec<String>,
    #[serde(default = "default_known_renderers")]
    pub known_renderers: Vec<String>,
}

/// Values used when neither the URL, the storage nor the page controls
/// provide one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_renderer")]
    pub renderer: String,
    #[serde(default = "default_options")]
    pub options: Vec<String>,
}

impl Settings {
    pub fn is_known_theme(&self, theme: &str) -> bool {
        self.known_themes.iter().any(|t| t == theme)
    }

    pub fn is_known_renderer(&self, renderer: &str) -> bool {
        self.known_renderers.iter().any(|r| r == renderer)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaults: SessionDefaults::default(),
            storage_key: default_storage_key(),
            known_themes: default_known_themes(),
            known_renderers: default_known_renderers(),
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            language: default_language(),
            theme: default_theme(),
            renderer: default_renderer(),
            options: default_options(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_known_themes() -> Vec<String> {
    KNOWN_THEMES.iter().map(|t| t.to_string()).collect()
}

fn default_known_renderers() -> Vec<String> {
    KNOWN_RENDERERS.iter().map(|r| r.to_string()).collect()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_renderer() -> String {
    DEFAULT_RENDERER.to_string()
}

fn default_options() -> Vec<String> {
    vec![
        "search".to_string(),
        "zoomfit".to_string(),
        "backpack".to_string(),
    ]
}
