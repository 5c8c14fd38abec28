use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages written right-to-left. `ar` is the only one shipped with a
/// translation pack, the others are recognised so a shared link still flips
/// direction.
pub const RTL_LANGUAGES: &[&str] = &["ar", "fa", "he", "lki"];

/// Keys of the page chrome labels (everything that is not a toolbox category).
pub const PAGE_LABEL_KEYS: &[&str] = &["HOME", "ABOUT", "CONTACT"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(CompactString);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(CompactString::from(code.as_ref().trim().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_right_to_left(&self) -> bool {
        RTL_LANGUAGES.contains(&self.as_str())
    }

    pub fn is_supported(&self) -> bool {
        language_pack(self).is_some()
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct LanguagePack {
    pub code: &'static str,
    pub name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl LanguagePack {
    pub fn translate(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| *text)
    }

    pub fn page_labels(&self) -> Vec<(&'static str, &'static str)> {
        PAGE_LABEL_KEYS
            .iter()
            .filter_map(|key| self.translate(key).map(|text| (*key, text)))
            .collect()
    }
}

static PACKS: [LanguagePack; 4] = [
    LanguagePack {
        code: "ar",
        name: "العربية",
        entries: &[
            ("HOME", "µcBlockly"),
            ("ABOUT", "في ما يخص"),
            ("CONTACT", "اتصال"),
            ("CAT_LOGIC", "منطق"),
            ("CAT_LOOPS", "الحلقات"),
            ("CAT_MATHS", "رياضيات"),
            ("CAT_TEXT", "نص"),
            ("CAT_LISTS", "قوائم"),
            ("CAT_COLOR", "لون"),
            ("CAT_VARIABLES", "متغيرات"),
            ("CAT_FUNCTIONS", "إجراءات"),
        ],
    },
    LanguagePack {
        code: "en",
        name: "English",
        entries: &[
            ("HOME", "µcBlockly"),
            ("ABOUT", "About"),
            ("CONTACT", "Contact"),
            ("CAT_LOGIC", "Logic"),
            ("CAT_LOOPS", "Loops"),
            ("CAT_MATHS", "Math"),
            ("CAT_TEXT", "Text"),
            ("CAT_LISTS", "Lists"),
            ("CAT_COLOR", "Colour"),
            ("CAT_VARIABLES", "Variables"),
            ("CAT_FUNCTIONS", "Functions"),
        ],
    },
    LanguagePack {
        code: "es",
        name: "Español",
        entries: &[
            ("HOME", "µcBlockly"),
            ("ABOUT", "por cierto"),
            ("CONTACT", "contacto"),
            ("CAT_LOGIC", "Lógica"),
            ("CAT_LOOPS", "Secuencias"),
            ("CAT_MATHS", "Matemáticas"),
            ("CAT_TEXT", "Texto"),
            ("CAT_LISTS", "Listas"),
            ("CAT_COLOR", "Color"),
            ("CAT_VARIABLES", "Variables"),
            ("CAT_FUNCTIONS", "Funciones"),
        ],
    },
    LanguagePack {
        code: "fr",
        name: "Français",
        entries: &[
            ("HOME", "µcBlockly"),
            ("ABOUT", "A propos"),
            ("CONTACT", "Contacter"),
            ("CAT_LOGIC", "Logique"),
            ("CAT_LOOPS", "Boucles"),
            ("CAT_MATHS", "Math"),
            ("CAT_TEXT", "Texte"),
            ("CAT_LISTS", "Listes"),
            ("CAT_COLOR", "Couleur"),
            ("CAT_VARIABLES", "Variables"),
            ("CAT_FUNCTIONS", "Procédures & Fonctions"),
        ],
    },
];

pub fn language_pack(code: &LanguageCode) -> Option<&'static LanguagePack> {
    PACKS.iter().find(|pack| pack.code == code.as_str())
}

pub fn supported_languages() -> impl Iterator<Item = &'static LanguagePack> {
    PACKS.iter()
}

pub fn translate(code: &LanguageCode, key: &str) -> Option<&'static str> {
    language_pack(code)?.translate(key)
}

/// Entries for the language menu, sorted by display name.
pub fn menu_entries() -> Vec<(&'static str, LanguageCode)> {
    let mut entries: Vec<_> = PACKS
        .iter()
        .map(|pack| (pack.name, LanguageCode::new(pack.code)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
