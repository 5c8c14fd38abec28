use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Language,
    Theme,
    Renderer,
    /// Comma separated option tokens (plugins, toolbox layout, code editor).
    Options,
}

impl ConfigField {
    pub const ALL: [ConfigField; 4] = [
        ConfigField::Language,
        ConfigField::Theme,
        ConfigField::Renderer,
        ConfigField::Options,
    ];

    pub fn url_param(self) -> &'static str {
        match self {
            Self::Language => "lang",
            Self::Theme => "theme",
            Self::Renderer => "renderer",
            Self::Options => "options",
        }
    }

    /// Storage key for scalar fields. Options are stored as one flag per token.
    pub fn storage_key(self) -> Option<&'static str> {
        match self {
            Self::Language => Some("paramLang"),
            Self::Theme => Some("paramTheme"),
            Self::Renderer => Some("paramRenderer"),
            Self::Options => None,
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_param())
    }
}

/// Menus and checkboxes of the page, read on demand.
pub trait ControlPanel {
    /// Current value of the control bound to `field`; for
    /// [`ConfigField::Options`] a comma separated token list of the checked
    /// boxes.
    fn value(&self, field: ConfigField) -> Option<String>;
}
