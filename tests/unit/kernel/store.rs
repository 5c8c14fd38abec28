use super::*;
use crate::kernel::language::LanguageCode;
use crate::kernel::plugins::PluginId;
use crate::kernel::state::{RendererId, ThemeId, ToolboxMode};
use std::collections::BTreeSet;

#[test]
fn default_store_holds_the_built_in_defaults() {
    let store = ConfigStore::default();
    let config = store.get();
    assert_eq!(config.language().as_str(), "en");
    assert!(!config.is_right_to_left());
    assert_eq!(config.theme().as_str(), "classic");
    assert_eq!(config.renderer().as_str(), "geras");
    assert!(config.enabled_plugins().is_empty());
    assert_eq!(config.toolbox_mode(), ToolboxMode::CategoryTree);
    assert!(!config.code_editor());
}

#[test]
fn set_applies_only_the_given_fields() {
    let mut store = ConfigStore::default();
    let config = store.set(ConfigPatch::theme(ThemeId::new("dark"))).clone();

    assert_eq!(config.theme().as_str(), "dark");
    assert_eq!(config.renderer().as_str(), "geras");
    assert_eq!(store.get(), &config);
}

#[test]
fn right_to_left_follows_the_language() {
    let mut store = ConfigStore::default();

    assert!(store.set(ConfigPatch::language(LanguageCode::new("ar"))).is_right_to_left());
    assert!(!store.set(ConfigPatch::language(LanguageCode::new("fr"))).is_right_to_left());
    assert!(!store.set(ConfigPatch::renderer(RendererId::new("zelos"))).is_right_to_left());
}

#[test]
fn plugin_set_is_replaced_wholesale() {
    let mut store = ConfigStore::default();
    let first: BTreeSet<_> = [PluginId::Minimap, PluginId::Backpack].into_iter().collect();
    store.set(ConfigPatch::enabled_plugins(first));

    let second: BTreeSet<_> = [PluginId::ZoomToFit].into_iter().collect();
    let config = store.set(ConfigPatch::enabled_plugins(second.clone()));

    assert_eq!(config.enabled_plugins(), &second);
    assert!(!config.is_plugin_enabled(PluginId::Minimap));
}

#[test]
fn combined_patch_updates_every_field() {
    let mut store = ConfigStore::default();
    let patch = ConfigPatch {
        language: Some(LanguageCode::new("he")),
        toolbox_mode: Some(ToolboxMode::Flat),
        code_editor: Some(true),
        ..ConfigPatch::default()
    };

    let config = store.set(patch);
    assert_eq!(config.language().as_str(), "he");
    assert!(config.is_right_to_left());
    assert_eq!(config.toolbox_mode(), ToolboxMode::Flat);
    assert!(config.code_editor());
}
