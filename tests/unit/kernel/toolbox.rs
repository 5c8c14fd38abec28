use super::*;
use crate::kernel::language::supported_languages;

fn nested_schema() -> ToolboxSchema {
    ToolboxSchema {
        nodes: vec![CategoryNode::category(
            "CAT_LOGIC",
            "logic_category",
            vec![
                CategoryNode::category(
                    "CAT_LOOPS",
                    "loop_category",
                    vec![CategoryNode::category("CAT_UNKNOWN", "misc", Vec::new())],
                ),
                CategoryNode::block_group("controls_if"),
            ],
        )],
    }
}

#[test]
fn localize_translates_every_level() {
    let fr = LanguageCode::new("fr");
    let localized = localize(&nested_schema(), &fr);

    assert_eq!(localized.find("CAT_LOGIC").unwrap().localized_name, "Logique");
    assert_eq!(localized.find("CAT_LOOPS").unwrap().localized_name, "Boucles");
}

#[test]
fn missing_translation_keeps_existing_name() {
    let mut schema = nested_schema();
    schema.nodes[0].children[0].children[0].localized_name = "Misc".to_string();

    let localized = localize(&schema, &LanguageCode::new("es"));
    assert_eq!(localized.find("CAT_UNKNOWN").unwrap().localized_name, "Misc");
    assert_eq!(
        localized.find("controls_if").unwrap().localized_name,
        "controls_if"
    );

    let unknown_language = localize(&schema, &LanguageCode::new("xx"));
    assert_eq!(unknown_language, schema);
}

#[test]
fn localize_is_deterministic_and_keeps_raw_keys() {
    let schema = basic_toolbox();
    let raw_keys: Vec<String> = schema
        .flatten()
        .iter()
        .map(|n| n.raw_name_key.clone())
        .collect();

    for pack in supported_languages() {
        let code = LanguageCode::new(pack.code);
        let first = localize(&schema, &code);
        let second = localize(&schema, &code);
        assert_eq!(first, second, "{}", pack.code);

        let keys: Vec<String> = first
            .flatten()
            .iter()
            .map(|n| n.raw_name_key.clone())
            .collect();
        assert_eq!(keys, raw_keys, "{}", pack.code);
    }
}

#[test]
fn relocalizing_a_copy_matches_localizing_the_canonical_schema() {
    let schema = basic_toolbox();
    let ar = localize(&schema, &LanguageCode::new("ar"));
    let en_from_ar = localize(&ar, &LanguageCode::new("en"));
    let en = localize(&schema, &LanguageCode::new("en"));

    assert_eq!(en_from_ar, en);
}

#[test]
fn localize_leaves_the_input_untouched() {
    let schema = basic_toolbox();
    let before = schema.clone();
    let _ = localize(&schema, &LanguageCode::new("fr"));
    assert_eq!(schema, before);
    assert_eq!(schema.find("CAT_TEXT").unwrap().localized_name, "CAT_TEXT");
}

#[test]
fn schema_parses_from_json() {
    let json = r#"{
        "nodes": [
            { "kind": "category", "raw_name_key": "CAT_TEXT", "localized_name": "CAT_TEXT",
              "children": [ { "kind": "block_group", "raw_name_key": "text" } ] },
            { "kind": "separator" }
        ]
    }"#;

    let schema = ToolboxSchema::from_json(json).unwrap();
    assert_eq!(schema.nodes.len(), 2);
    assert_eq!(schema.nodes[1].kind, NodeKind::Separator);
    assert_eq!(schema.flatten().len(), 3);

    let localized = localize(&schema, &LanguageCode::new("fr"));
    assert_eq!(localized.nodes[0].localized_name, "Texte");
    assert_eq!(localized.nodes[0].children[0].localized_name, "");
}
