// ../tests/tests.rs
use std::fs;
use strum::IntoEnumIterator;
use woin_sheet::derived::{dice_badge, parse_int, update_derived};
use woin_sheet::ui::{TuiView, label_for};
use woin_sheet::*;

fn stored_sheet() -> serde_json::Value {
    let json_str =
        fs::read_to_string("tests/stored_sheet.json").expect("Failed to read stored sheet JSON file");
    serde_json::from_str(&json_str).expect("Failed to parse JSON")
}

#[test]
fn test_schema_presets() {
    let integrated = FieldSchema::integrated();
    assert_eq!(integrated.len(), 34);
    assert_eq!(integrated.fields()[0], "name");
    assert_eq!(integrated.fields()[2], "career");
    assert!(!integrated.contains("descriptor"));
    assert_eq!(integrated.fields().last(), Some(&"gear-text"));

    let standalone = FieldSchema::standalone();
    assert_eq!(standalone.len(), 46);
    assert!(standalone.contains("descriptor"));
    assert!(standalone.contains("pow_points"));
    assert!(standalone.contains("current_age"));
    assert!(!standalone.contains("career"));

    for schema in [&integrated, &standalone] {
        assert!(schema.is_reactive("agi"));
        assert!(schema.is_reactive("grade"));
        assert!(!schema.is_reactive("name"));
        assert!(!schema.is_reactive("initiative"));
        assert!(schema.is_derived("initiative"));
        assert!(!schema.is_derived("str"));
    }

    // Only the standalone sheet derives its dice badges.
    assert!(standalone.dice_badges());
    assert!(standalone.is_derived("str_dice"));
    assert!(!integrated.dice_badges());
    assert!(!integrated.is_derived("str_dice"));

    let with_badges = FieldSchema::integrated().with_dice_badges(true);
    assert!(with_badges.is_derived("str_dice"));
    assert!(with_badges.is_derived("initiative"));
}

#[test]
fn test_record_from_stored_json() {
    let schema = FieldSchema::integrated();
    let record = CharacterRecord::from_value(&schema, &stored_sheet());

    assert_eq!(record.get("name"), "Kara Voss");
    // Numbers keep their textual form.
    assert_eq!(record.get("grade"), "2");
    assert_eq!(record.get("skills-text"), "Pilot 3\nPistols 2");
    // Missing keys load as empty strings.
    assert_eq!(record.get("melee"), "");
    assert_eq!(record.get("gear-text"), "");
    // Unknown keys are dropped.
    assert_eq!(record.get("favourite_color"), "");
    assert_eq!(record.iter().count(), schema.len());

    let value = record.to_value().expect("Failed to serialize record");
    let object = value.as_object().expect("Expected an object");
    assert_eq!(object.len(), schema.len());
    assert!(!object.contains_key("favourite_color"));
    assert!(!object.contains_key("portrait"));
    assert_eq!(object["grade"], serde_json::json!("2"));
}

#[test]
fn test_record_from_non_object_is_empty() {
    let schema = FieldSchema::integrated();
    for value in [
        serde_json::json!(null),
        serde_json::json!("a string"),
        serde_json::json!([1, 2, 3]),
    ] {
        let record = CharacterRecord::from_value(&schema, &value);
        assert!(record.is_blank());
        assert_eq!(record, CharacterRecord::empty(&schema));
    }
    assert!(CharacterRecord::from_json(&schema, "{not json").is_err());
}

#[test]
fn test_record_set_outside_schema() {
    let schema = FieldSchema::integrated();
    let mut record = CharacterRecord::empty(&schema);
    assert!(record.set("name", "Ilya"));
    assert!(!record.set("descriptor", "Brave"));
    assert_eq!(record.get("name"), "Ilya");
    assert_eq!(record.get("descriptor"), "");
}

#[test]
fn test_parse_int_coerces_to_zero() {
    assert_eq!(parse_int("3"), 3);
    assert_eq!(parse_int("  12"), 12);
    assert_eq!(parse_int("-4"), -4);
    assert_eq!(parse_int("+7"), 7);
    assert_eq!(parse_int("3rd"), 3);
    assert_eq!(parse_int(""), 0);
    assert_eq!(parse_int("abc"), 0);
    assert_eq!(parse_int("-"), 0);
    assert_eq!(parse_int("4.9"), 4);
    assert_eq!(parse_int("99999999999999999999999"), i64::MAX);
    assert_eq!(parse_int("-99999999999999999999999"), i64::MIN);
    assert_eq!(dice_badge("3"), "3d6");
    assert_eq!(dice_badge("lots"), "0d6");
}

#[test]
fn test_initiative_is_agility_plus_logic() {
    let schema = FieldSchema::integrated();
    let cases = [
        ("3", "2", "5"),
        ("", "4", "4"),
        ("x", "y", "0"),
        ("-2", "5", "3"),
        ("10", "", "10"),
    ];
    for (agi, log, expected) in cases {
        let mut record = CharacterRecord::empty(&schema);
        record.set("agi", agi);
        record.set("log", log);
        update_derived(&schema, &mut record);
        assert_eq!(record.get("initiative"), expected, "agi={agi:?} log={log:?}");
    }
}

#[test]
fn test_update_derived_writes_badges() {
    let schema = FieldSchema::standalone();
    let mut record = CharacterRecord::empty(&schema);
    record.set("str", "3");
    record.set("pow", "none");
    let written = update_derived(&schema, &mut record);

    assert_eq!(written.len(), 11);
    assert_eq!(record.get("str_dice"), "3d6");
    assert_eq!(record.get("pow_dice"), "0d6");

    let plain = FieldSchema::integrated();
    let mut record = CharacterRecord::empty(&plain);
    record.set("str", "3");
    record.set("str_dice", "custom");
    assert_eq!(update_derived(&plain, &mut record), vec!["initiative"]);
    assert_eq!(record.get("str_dice"), "custom");
}

#[test]
fn test_apply_overwrites_stale_derived_values() {
    let schema = FieldSchema::integrated().with_dice_badges(true);
    let stored = CharacterRecord::from_value(&schema, &stored_sheet());
    assert_eq!(stored.get("initiative"), "42");

    let mut form = Form::new(schema.clone(), MemoryView::for_schema(&schema));
    form.apply(&stored);

    let record = form.collect();
    assert_eq!(record.get("initiative"), "9");
    assert_eq!(record.get("agi_dice"), "4d6");
    assert_eq!(form.view().read("initiative").as_deref(), Some("9"));
}

#[test]
fn test_apply_collect_is_idempotent() {
    let schema = FieldSchema::standalone();
    let mut form = Form::new(schema.clone(), MemoryView::for_schema(&schema));
    let mut record = CharacterRecord::empty(&schema);
    record.set("name", "Oren");
    record.set("agi", "2");
    record.set("log", "6");
    record.set("initiative", "stale");
    record.set("gear-text", "Rope\nLantern");

    form.apply(&record);
    let first = form.collect();
    let first_view = form.view().clone();

    form.apply(&form.collect());
    form.apply(&form.collect());
    assert_eq!(form.collect(), first);
    assert_eq!(form.view(), &first_view);
}

#[test]
fn test_missing_controls_are_silent() {
    let schema = FieldSchema::integrated();
    let mut view = MemoryView::for_schema(&schema);
    view.remove_control("soak");
    view.add_control("unrelated", "keep me");
    let mut form = Form::new(schema.clone(), view);

    let mut record = CharacterRecord::empty(&schema);
    record.set("soak", "3");
    record.set("name", "Tam");
    form.apply(&record);

    assert_eq!(form.view().read("soak"), None);
    assert_eq!(form.view().read("name").as_deref(), Some("Tam"));
    assert_eq!(form.view().read("unrelated").as_deref(), Some("keep me"));
    assert_eq!(form.collect().get("soak"), "3");
}

#[test]
fn test_input_recomputes_only_for_reactive_fields() {
    let schema = FieldSchema::integrated().with_dice_badges(true);
    let mut form = Form::new(schema.clone(), MemoryView::for_schema(&schema));

    assert!(form.input("agi", "3"));
    assert!(form.input("log", "2"));
    assert_eq!(form.collect().get("initiative"), "5");
    assert_eq!(form.view().read("agi_dice").as_deref(), Some("3d6"));

    assert!(!form.input("descriptor", "ignored"));
    assert!(form.input("initiative", "100"));
    assert_eq!(form.collect().get("initiative"), "100");

    assert!(form.input("grade", "1"));
    assert_eq!(form.collect().get("initiative"), "5");
}

#[test]
fn test_tui_view_mirrors_form() {
    let schema = FieldSchema::integrated();
    let mut form = Form::new(schema.clone(), TuiView::for_schema(&schema));
    form.input("agi", "4");
    form.input("log", "1");

    let view = form.view();
    assert_eq!(view.control("initiative").map(|c| c.value.as_str()), Some("5"));
    assert!(view.control("initiative").is_some_and(|c| c.read_only));
    assert!(view.control("str_dice").is_some_and(|c| !c.read_only));
    assert!(view.control("skills-text").is_some_and(|c| c.multiline));
    assert_eq!(view.focused().map(|c| c.id), Some("name"));

    assert_eq!(label_for("agi"), "AGI");
    assert_eq!(label_for("agi_dice"), "Dice");
    assert_eq!(label_for("skills-text"), "Skills");
    assert_eq!(label_for("natural_damage"), "Natural damage");
}

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("settings.json");

    let settings = Settings {
        variant: Variant::Integrated,
        status_timeout_ms: 2500,
        debug_mode: true,
        ..Settings::default()
    };
    settings.save_to_file(&path).expect("Failed to save settings");
    let loaded = Settings::load_settings_from_file(&path).expect("Failed to load settings");
    assert_eq!(loaded, settings);

    // Partial files fall back to defaults for the missing entries.
    fs::write(&path, r#"{ "variant": "integrated" }"#).expect("Failed to write settings");
    let partial = Settings::load_settings_from_file(&path).expect("Failed to load settings");
    assert_eq!(partial.variant, Variant::Integrated);
    assert_eq!(partial.status_timeout_ms, 1200);
    assert_eq!(partial.dice_badges, None);
    assert!(!partial.schema().dice_badges());
    assert!(Settings::default().schema().dice_badges());

    let forced = Settings {
        variant: Variant::Integrated,
        dice_badges: Some(true),
        ..Settings::default()
    };
    assert!(forced.schema().is_derived("pow_dice"));

    assert_eq!("Integrated".parse::<Variant>().ok(), Some(Variant::Integrated));
    assert_eq!("token".parse::<StorageMode>().ok(), Some(StorageMode::Token));
    assert_eq!(StorageMode::Scene.to_string(), "scene");
    assert_eq!(
        StorageMode::iter().collect::<Vec<_>>(),
        vec![StorageMode::Scene, StorageMode::Token]
    );
    assert!("board".parse::<Variant>().is_err());
}
