use super::*;
use crate::kernel::services::adapters::{MemoryControls, MemoryLocation, MemoryStorage};
use serde_json::json;

fn bridge(search: &str) -> (PersistenceBridge, MemoryStorage, MemoryLocation) {
    let storage = MemoryStorage::new();
    let location = MemoryLocation::new(search);
    let bridge = PersistenceBridge::new(Box::new(storage.clone()), Box::new(location.clone()));
    (bridge, storage, location)
}

#[test]
fn add_replace_param_appends_or_replaces_in_place() {
    assert_eq!(add_replace_param("", "lang", "fr"), "?lang=fr");
    assert_eq!(add_replace_param("?", "lang", "fr"), "?lang=fr");
    assert_eq!(
        add_replace_param("?theme=dark", "lang", "fr"),
        "?theme=dark&lang=fr"
    );
    assert_eq!(
        add_replace_param("?lang=en&theme=dark", "lang", "fr"),
        "?lang=fr&theme=dark"
    );
    assert_eq!(
        add_replace_param("?theme=dark&LANG=en", "lang", "ar"),
        "?theme=dark&lang=ar"
    );
}

#[test]
fn add_replace_param_does_not_match_a_longer_name() {
    assert_eq!(
        add_replace_param("?xlang=de", "lang", "fr"),
        "?xlang=de&lang=fr"
    );
}

#[test]
fn read_param_treats_null_as_absent() {
    assert_eq!(read_param("?lang=fr&theme=dark", "theme").as_deref(), Some("dark"));
    assert_eq!(read_param("?Lang=fr", "lang").as_deref(), Some("fr"));
    assert_eq!(read_param("?lang=null", "lang"), None);
    assert_eq!(read_param("", "lang"), None);
    assert_eq!(read_param("?options=", "options").as_deref(), Some(""));
}

#[test]
fn read_param_percent_decodes_values() {
    assert_eq!(read_param("?lang=fr%20", "lang").as_deref(), Some("fr "));
    assert_eq!(
        read_param("?options=minimap%2Cbackpack", "options").as_deref(),
        Some("minimap,backpack")
    );
    assert_eq!(read_param("?theme=high+contrast", "theme").as_deref(), Some("high contrast"));
    assert_eq!(read_param("?lang=%6E%75%6C%6C", "lang"), None);
}

#[test]
fn option_set_parses_tokens_and_writes_them_in_canonical_order() {
    let set = OptionSet::parse("backpack, ctoolbox,MINIMAP,bogus,,codeEditor");
    assert!(set.contains(OptionFlag::Plugin(PluginId::Minimap)));
    assert!(set.contains(OptionFlag::Plugin(PluginId::Backpack)));
    assert_eq!(set.toolbox_mode(), ToolboxMode::Flat);
    assert!(set.code_editor());
    assert_eq!(set.to_param(), "minimap,backpack,ctoolbox,codeEditor");
    assert_eq!(
        set.plugins().into_iter().collect::<Vec<_>>(),
        vec![PluginId::Minimap, PluginId::Backpack]
    );
}

#[test]
fn option_set_mirrors_the_config() {
    let config = SessionConfig::new(
        Default::default(),
        Default::default(),
        Default::default(),
        [PluginId::ZoomToFit].into_iter().collect(),
        ToolboxMode::Flat,
        false,
    );
    assert_eq!(OptionSet::from_config(&config).to_param(), "zoomfit,ctoolbox");
}

#[test]
fn write_url_pushes_history_only_on_change() {
    let (mut bridge, _, location) = bridge("?lang=en");

    bridge.write_url("lang", "en");
    assert_eq!(location.history_len(), 1);

    bridge.write_url("lang", "fr");
    assert_eq!(location.history_len(), 2);
    assert_eq!(location.current(), "?lang=fr");

    assert!(location.back());
    assert_eq!(bridge.read_url("lang").as_deref(), Some("en"));
}

#[test]
fn batched_url_writes_push_one_history_entry() {
    let (mut bridge, _, location) = bridge("");

    bridge.begin_url_batch();
    bridge.write_url("lang", "en");
    bridge.write_url("theme", "classic");
    assert_eq!(bridge.read_url("theme").as_deref(), Some("classic"));
    assert_eq!(location.history_len(), 1);

    bridge.commit_url_batch();
    assert_eq!(location.history_len(), 2);
    assert_eq!(location.current(), "?lang=en&theme=classic");

    bridge.begin_url_batch();
    bridge.write_url("lang", "en");
    bridge.commit_url_batch();
    assert_eq!(location.history_len(), 2);
}

#[test]
fn sync_field_resolves_url_then_storage_then_control() {
    let controls = MemoryControls::new();
    controls.set(ConfigField::Theme, "modern");

    let (mut bridge, storage, location) = bridge("");
    assert_eq!(
        bridge.sync_field(ConfigField::Theme, None, &controls, "classic"),
        "modern"
    );
    assert_eq!(storage.get("paramTheme").as_deref(), Some("modern"));
    assert_eq!(location.current(), "?theme=modern");

    storage.seed("paramTheme", "zelos");
    location.navigate("");
    assert_eq!(
        bridge.sync_field(ConfigField::Theme, None, &controls, "classic"),
        "zelos"
    );

    location.navigate("?theme=dark");
    assert_eq!(
        bridge.sync_field(ConfigField::Theme, None, &controls, "classic"),
        "dark"
    );
    assert_eq!(storage.get("paramTheme").as_deref(), Some("dark"));
}

#[test]
fn sync_field_with_explicit_value_writes_both_sides() {
    let (mut bridge, storage, location) = bridge("?lang=en&renderer=geras");
    let value = bridge.sync_field(
        ConfigField::Renderer,
        Some("zelos"),
        &MemoryControls::new(),
        "geras",
    );
    assert_eq!(value, "zelos");
    assert_eq!(location.current(), "?lang=en&renderer=zelos");
    assert_eq!(storage.get("paramRenderer").as_deref(), Some("zelos"));
}

#[test]
fn sync_field_falls_back_when_nothing_is_set() {
    let (mut bridge, storage, _) = bridge("");
    assert_eq!(
        bridge.sync_field(ConfigField::Language, None, &MemoryControls::new(), "en"),
        "en"
    );
    assert_eq!(storage.get("paramLang").as_deref(), Some("en"));
}

#[test]
fn sync_options_prefers_url_then_stored_flags() {
    let controls = MemoryControls::new();
    controls.set(ConfigField::Options, "search");
    let fallback = OptionSet::parse("zoomfit");

    let (mut bridge, storage, location) = bridge("");
    let set = bridge.sync_options(None, &controls, &fallback);
    assert_eq!(set.to_param(), "search");
    assert_eq!(storage.get("pluginWorkspaceSearch").as_deref(), Some("true"));
    assert_eq!(storage.get("pluginMinimap").as_deref(), Some("false"));
    assert_eq!(storage.get("codeEditorSwitch").as_deref(), Some("false"));

    storage.seed("pluginMinimap", "true");
    location.navigate("");
    let set = bridge.sync_options(None, &controls, &fallback);
    assert_eq!(set.to_param(), "minimap,search");

    location.navigate("?options=backpack,ctoolbox");
    let set = bridge.sync_options(None, &controls, &fallback);
    assert_eq!(set.to_param(), "backpack,ctoolbox");
    assert_eq!(storage.get("pluginMinimap").as_deref(), Some("false"));
    assert_eq!(
        storage.get("pluginContinuousToolbox").as_deref(),
        Some("true")
    );
}

#[test]
fn unavailable_storage_reads_nothing_and_swallows_writes() {
    let storage = MemoryStorage::unavailable();
    let location = MemoryLocation::new("");
    let mut bridge = PersistenceBridge::new(Box::new(storage.clone()), Box::new(location.clone()));

    bridge.write_storage("paramLang", "fr");
    assert_eq!(bridge.read_storage("paramLang"), None);
    assert!(storage.is_empty());

    let value = bridge.sync_field(ConfigField::Language, None, &MemoryControls::new(), "en");
    assert_eq!(value, "en");
    assert_eq!(location.current(), "?lang=en");
}

#[test]
fn malformed_snapshot_is_ignored() {
    let (mut bridge, storage, _) = bridge("");
    storage.seed("mainWorkspace_blocks", "{not json");
    assert_eq!(bridge.load_snapshot("mainWorkspace_blocks"), None);

    storage.seed("mainWorkspace_blocks", "");
    assert_eq!(bridge.load_snapshot("mainWorkspace_blocks"), None);

    let snapshot = json!({ "blocks": { "b1": { "type": "text" } } });
    bridge.save_snapshot("mainWorkspace_blocks", &snapshot);
    assert_eq!(bridge.load_snapshot("mainWorkspace_blocks"), Some(snapshot));
}

#[test]
fn panel_layout_is_stored_per_key() {
    let (mut bridge, storage, _) = bridge("");
    assert!(bridge.read_panel_layout().is_empty());

    let layout = PanelLayout {
        up: Some("3 1 0%".to_string()),
        bottom: Some("1 1 0%".to_string()),
        ..PanelLayout::default()
    };
    bridge.write_panel_layout(&layout);

    assert_eq!(storage.get("flex_container_up").as_deref(), Some("3 1 0%"));
    assert_eq!(storage.get("flex_container_up_left"), None);
    assert_eq!(bridge.read_panel_layout(), layout);
}
