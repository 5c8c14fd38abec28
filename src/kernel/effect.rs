use super::language::LanguageCode;
use super::services::ports::ConfigField;
use super::state::PanelLayout;

/// Page-side work requested by the session, applied by the UI glue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetDocumentDirection {
        language: LanguageCode,
        rtl: bool,
    },
    /// `(label key, translated text)` pairs for the page chrome.
    TranslateLabels(Vec<(&'static str, &'static str)>),
    SyncControl {
        field: ConfigField,
        value: String,
    },
    ShowCodeEditor(bool),
    RestorePanelLayout(PanelLayout),
}
