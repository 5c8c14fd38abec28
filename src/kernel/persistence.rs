//! Persistence bridge: the URL codec and the storage codec over the session
//! configuration fields, the block graph snapshot and the panel layout.
//!
//! Resolution order when no explicit value is given is URL, then storage,
//! then the page control, then the built-in default. The URL always wins so a
//! shared link reproduces the sender's configuration.

use regex::{Captures, RegexBuilder};
use std::collections::BTreeSet;
use std::fmt;
use url::form_urlencoded;

use super::plugins::PluginId;
use super::services::ports::{ConfigField, ControlPanel, PageLocation, SessionStorage};
use super::state::{PanelLayout, SessionConfig, ToolboxMode};

/// One token of the `options` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionFlag {
    Plugin(PluginId),
    ContinuousToolbox,
    CodeEditor,
}

impl OptionFlag {
    pub fn all() -> impl Iterator<Item = OptionFlag> {
        PluginId::ALL
            .into_iter()
            .map(OptionFlag::Plugin)
            .chain([OptionFlag::ContinuousToolbox, OptionFlag::CodeEditor])
    }

    pub fn url_token(self) -> &'static str {
        match self {
            Self::Plugin(id) => id.url_token(),
            Self::ContinuousToolbox => "ctoolbox",
            Self::CodeEditor => "codeEditor",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Plugin(id) => id.storage_key(),
            Self::ContinuousToolbox => "pluginContinuousToolbox",
            Self::CodeEditor => "codeEditorSwitch",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::all().find(|flag| flag.url_token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for OptionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_token())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet(BTreeSet<OptionFlag>);

impl OptionSet {
    /// Parses a comma separated token list; unknown tokens are dropped.
    pub fn parse(list: &str) -> Self {
        let mut set = BTreeSet::new();
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match OptionFlag::from_token(token) {
                Some(flag) => {
                    set.insert(flag);
                }
                None => tracing::warn!(token, "unknown option token ignored"),
            }
        }
        Self(set)
    }

    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let joined: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        Self::parse(&joined.join(","))
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        let mut set: BTreeSet<OptionFlag> = config
            .enabled_plugins()
            .iter()
            .copied()
            .map(OptionFlag::Plugin)
            .collect();
        if config.toolbox_mode() == ToolboxMode::Flat {
            set.insert(OptionFlag::ContinuousToolbox);
        }
        if config.code_editor() {
            set.insert(OptionFlag::CodeEditor);
        }
        Self(set)
    }

    /// Canonical token list: plugins in id order, then layout flags.
    pub fn to_param(&self) -> String {
        self.0
            .iter()
            .map(|flag| flag.url_token())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, flag: OptionFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn insert(&mut self, flag: OptionFlag) {
        self.0.insert(flag);
    }

    pub fn remove(&mut self, flag: OptionFlag) {
        self.0.remove(&flag);
    }

    pub fn plugins(&self) -> BTreeSet<PluginId> {
        self.0
            .iter()
            .filter_map(|flag| match flag {
                OptionFlag::Plugin(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn toolbox_mode(&self) -> ToolboxMode {
        if self.contains(OptionFlag::ContinuousToolbox) {
            ToolboxMode::Flat
        } else {
            ToolboxMode::CategoryTree
        }
    }

    pub fn code_editor(&self) -> bool {
        self.contains(OptionFlag::CodeEditor)
    }
}

/// Adds `name=value` to a query string, replacing an existing occurrence of
/// `name` in place and keeping every other parameter untouched.
pub fn add_replace_param(search: &str, name: &str, value: &str) -> String {
    if search.is_empty() || search == "?" {
        return format!("?{name}={value}");
    }

    let pattern = format!("([?&]){}=.*?(&|$)", regex::escape(name));
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(err) => {
            tracing::error!(error = %err, param = name, "query param pattern rejected");
            return format!("{search}&{name}={value}");
        }
    };

    if re.is_match(search) {
        re.replacen(search, 1, |caps: &Captures| {
            format!("{}{}={}{}", &caps[1], name, value, &caps[2])
        })
        .into_owned()
    } else {
        let separator = if search.contains('?') { '&' } else { '?' };
        format!("{search}{separator}{name}={value}")
    }
}

/// Percent-decoded value of `name` in a query string. The literal `null`
/// counts as absent.
pub fn read_param(search: &str, name: &str) -> Option<String> {
    let query = search.trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.into_owned())
        .filter(|value| value != "null")
}

pub struct PersistenceBridge {
    storage: Box<dyn SessionStorage>,
    location: Box<dyn PageLocation>,
    /// Query being assembled between `begin_url_batch` and `commit_url_batch`.
    pending_search: Option<String>,
}

impl PersistenceBridge {
    pub fn new(storage: Box<dyn SessionStorage>, location: Box<dyn PageLocation>) -> Self {
        Self {
            storage,
            location,
            pending_search: None,
        }
    }

    /// Current query, including writes not yet committed.
    pub fn search(&self) -> String {
        match &self.pending_search {
            Some(search) => search.clone(),
            None => self.location.search(),
        }
    }

    /// Collects URL writes until [`PersistenceBridge::commit_url_batch`] so
    /// that several fields land in a single history entry.
    pub fn begin_url_batch(&mut self) {
        if self.pending_search.is_none() {
            self.pending_search = Some(self.location.search());
        }
    }

    /// Pushes the batched query as one history entry, if it differs.
    pub fn commit_url_batch(&mut self) {
        let Some(next) = self.pending_search.take() else {
            return;
        };
        if next != self.location.search() {
            self.location.push_search(&next);
        }
    }

    // --- URL codec ---

    pub fn read_url(&self, param: &str) -> Option<String> {
        read_param(&self.search(), param)
    }

    /// Pushes a history entry unless the query string would not change.
    /// Inside a batch the write is held until the commit.
    pub fn write_url(&mut self, param: &str, value: &str) {
        let search = self.search();
        let next = add_replace_param(&search, param, value);
        if next == search {
            return;
        }
        match self.pending_search.as_mut() {
            Some(pending) => *pending = next,
            None => self.location.push_search(&next),
        }
    }

    // --- storage codec ---

    pub fn read_storage(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(key, error = %err, "storage read skipped");
                None
            }
        }
    }

    pub fn write_storage(&mut self, key: &str, value: &str) {
        if let Err(err) = self.storage.set_item(key, value) {
            tracing::debug!(key, error = %err, "storage write skipped");
        }
    }

    pub fn save_snapshot(&mut self, key: &str, snapshot: &serde_json::Value) {
        match serde_json::to_string(snapshot) {
            Ok(json) => self.write_storage(key, &json),
            Err(err) => tracing::warn!(key, error = %err, "snapshot not serializable"),
        }
    }

    /// Stored snapshot under `key`; a blob that does not parse counts as none.
    pub fn load_snapshot(&self, key: &str) -> Option<serde_json::Value> {
        let data = self.read_storage(key).filter(|data| !data.is_empty())?;
        match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "malformed snapshot ignored");
                None
            }
        }
    }

    pub fn read_panel_layout(&self) -> PanelLayout {
        let mut layout = PanelLayout::default();
        for key in PanelLayout::KEYS {
            if let Some(value) = self.read_storage(key).filter(|v| !v.is_empty()) {
                layout.set(key, value);
            }
        }
        layout
    }

    pub fn write_panel_layout(&mut self, layout: &PanelLayout) {
        for (key, value) in layout.entries() {
            if let Some(value) = value {
                self.write_storage(key, value);
            }
        }
    }

    // --- field sync ---

    /// Resolved value of a scalar field without writing anything back.
    pub fn resolve_field(&self, field: ConfigField, controls: &dyn ControlPanel) -> Option<String> {
        let non_empty = |v: &String| !v.trim().is_empty();
        self.read_url(field.url_param())
            .filter(non_empty)
            .or_else(|| {
                field
                    .storage_key()
                    .and_then(|key| self.read_storage(key))
                    .filter(non_empty)
            })
            .or_else(|| controls.value(field).filter(non_empty))
    }

    /// With `explicit`, writes it to URL and storage; otherwise resolves the
    /// field (falling back to `fallback`) and writes the result back.
    pub fn sync_field(
        &mut self,
        field: ConfigField,
        explicit: Option<&str>,
        controls: &dyn ControlPanel,
        fallback: &str,
    ) -> String {
        let value = match explicit {
            Some(value) => value.to_string(),
            None => self
                .resolve_field(field, controls)
                .unwrap_or_else(|| fallback.to_string()),
        };
        self.write_field(field, &value);
        value
    }

    pub fn write_field(&mut self, field: ConfigField, value: &str) {
        self.write_url(field.url_param(), value);
        if let Some(key) = field.storage_key() {
            self.write_storage(key, value);
        }
    }

    pub fn read_option_flags(&self) -> Option<OptionSet> {
        let mut any = false;
        let mut set = OptionSet::default();
        for flag in OptionFlag::all() {
            if let Some(value) = self.read_storage(flag.storage_key()) {
                any = true;
                if value == "true" {
                    set.insert(flag);
                }
            }
        }
        any.then_some(set)
    }

    pub fn resolve_options(&self, controls: &dyn ControlPanel) -> Option<OptionSet> {
        if let Some(list) = self.read_url(ConfigField::Options.url_param()) {
            return Some(OptionSet::parse(&list));
        }
        self.read_option_flags().or_else(|| {
            controls
                .value(ConfigField::Options)
                .map(|list| OptionSet::parse(&list))
        })
    }

    pub fn sync_options(
        &mut self,
        explicit: Option<&OptionSet>,
        controls: &dyn ControlPanel,
        fallback: &OptionSet,
    ) -> OptionSet {
        let set = match explicit {
            Some(set) => set.clone(),
            None => self
                .resolve_options(controls)
                .unwrap_or_else(|| fallback.clone()),
        };
        self.write_options(&set);
        set
    }

    pub fn write_options(&mut self, set: &OptionSet) {
        self.write_url(ConfigField::Options.url_param(), &set.to_param());
        for flag in OptionFlag::all() {
            let value = if set.contains(flag) { "true" } else { "false" };
            self.write_storage(flag.storage_key(), value);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/persistence.rs"]
mod tests;
