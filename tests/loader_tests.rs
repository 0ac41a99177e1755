//! Integration tests for loading layout definitions from disk.

use keymapctl::models::{Entry, Modifier};
use keymapctl::services::KeymapLoader;
use keymapctl::KeymapError;
use serde_json::json;

mod fixtures;
use fixtures::*;

#[test]
fn test_altgr_layers_fall_back_to_alt() {
    let dir = KeymapDir::new();
    write_basic(&dir, "de");

    let map = KeymapLoader::new(dir.path()).load("de").unwrap();

    assert_eq!(map.name(), "de");
    for index in 0..128 {
        assert_eq!(map.entry(Modifier::Base, index), Some(&Entry::from_char('a')));
        assert_eq!(map.entry(Modifier::Shift, index), Some(&Entry::from_char('A')));
        assert_eq!(map.entry(Modifier::Alt, index), Some(&Entry::from_char('b')));
        assert_eq!(map.entry(Modifier::AltGr, index), Some(&Entry::from_char('b')));
        assert_eq!(
            map.entry(Modifier::ShiftAltGr, index),
            Some(&Entry::from_char('b'))
        );
    }
}

#[test]
fn test_altgr_fallbacks_are_independent() {
    let dir = KeymapDir::new();
    let mut document = definition(
        &uniform_field("a"),
        &uniform_field("A"),
        &uniform_field("b"),
    );
    document["altgr_map"] = json!(uniform_field("@"));
    dir.write("altgr-only", &document);

    let map = KeymapLoader::new(dir.path()).load("altgr-only").unwrap();
    assert_eq!(map.entry(Modifier::AltGr, 7), Some(&Entry::from_char('@')));
    assert_eq!(
        map.entry(Modifier::ShiftAltGr, 7),
        Some(&Entry::from_char('b'))
    );
}

#[test]
fn test_full_definition_keeps_every_layer() {
    let dir = KeymapDir::new();
    dir.write(
        "full",
        &full_definition(
            &uniform_field("1"),
            &uniform_field("2"),
            &uniform_field("3"),
            &uniform_field("4"),
            &uniform_field("5"),
        ),
    );

    let map = KeymapLoader::new(dir.path()).load("full").unwrap();
    for (modifier, expected) in Modifier::ALL.into_iter().zip(['1', '2', '3', '4', '5']) {
        assert_eq!(map.entry(modifier, 0), Some(&Entry::from_char(expected)));
    }
}

#[test]
fn test_empty_strings_and_sequences() {
    let dir = KeymapDir::new();
    let map_field = sparse_field(0x10, "e\u{0301}");
    dir.write(
        "sparse",
        &definition(&map_field, &uniform_field(""), &uniform_field("")),
    );

    let map = KeymapLoader::new(dir.path()).load("sparse").unwrap();
    let entry = map.entry(Modifier::Base, 0x10).unwrap();
    assert_eq!(entry.codepoints(), &[0x65, 0x0301]);
    assert!(map.entry(Modifier::Base, 0x11).unwrap().is_unmapped());
    assert!(map.entry(Modifier::Shift, 0).unwrap().is_unmapped());
}

#[test]
fn test_missing_definition_is_not_found() {
    let dir = KeymapDir::new();
    let err = KeymapLoader::new(dir.path()).load("xx").unwrap_err();
    assert!(matches!(err, KeymapError::ResourceNotFound { .. }));
    assert_eq!(err.errno(), keymapctl::error::errno::ENOENT);
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let dir = KeymapDir::new();
    dir.write_raw("binary", &[0x7b, 0xff, 0xfe, 0x7d]);

    let err = KeymapLoader::new(dir.path()).load("binary").unwrap_err();
    assert!(matches!(err, KeymapError::Utf8Decode { .. }));
}

#[test]
fn test_short_layer_is_malformed() {
    let dir = KeymapDir::new();
    let mut short = uniform_field("a");
    short.truncate(127);
    dir.write(
        "short",
        &definition(&short, &uniform_field("A"), &uniform_field("b")),
    );

    let err = KeymapLoader::new(dir.path()).load("short").unwrap_err();
    assert!(matches!(err, KeymapError::MalformedDefinition { .. }));
    assert!(err.to_string().contains("127"));
}

#[test]
fn test_present_but_empty_altgr_layer_is_malformed() {
    let dir = KeymapDir::new();
    let mut document = definition(
        &uniform_field("a"),
        &uniform_field("A"),
        &uniform_field("b"),
    );
    document["altgr_map"] = json!([]);
    dir.write("empty-altgr", &document);

    let err = KeymapLoader::new(dir.path()).load("empty-altgr").unwrap_err();
    assert!(matches!(err, KeymapError::MalformedDefinition { .. }));
    assert!(err.to_string().contains("altgr_map"));
}

#[test]
fn test_missing_required_layer_is_malformed() {
    let dir = KeymapDir::new();
    dir.write(
        "no-alt",
        &json!({ "map": uniform_field("a"), "shift_map": uniform_field("A") }),
    );

    let err = KeymapLoader::new(dir.path()).load("no-alt").unwrap_err();
    assert!(matches!(err, KeymapError::MalformedDefinition { .. }));
    assert!(err.to_string().contains("alt_map"));
}

#[test]
fn test_non_string_entry_is_malformed() {
    let dir = KeymapDir::new();
    let mut document = definition(
        &uniform_field("a"),
        &uniform_field("A"),
        &uniform_field("b"),
    );
    document["map"][3] = json!(42);
    dir.write("numbers", &document);

    let err = KeymapLoader::new(dir.path()).load("numbers").unwrap_err();
    assert!(matches!(err, KeymapError::MalformedDefinition { .. }));
}

#[test]
fn test_definition_with_comments_is_accepted() {
    let dir = KeymapDir::new();
    let body = serde_json::to_string(&definition(
        &uniform_field("a"),
        &uniform_field("A"),
        &uniform_field("b"),
    ))
    .unwrap();
    let text = format!("// German layout\n{}", body);
    dir.write_raw("commented", text.as_bytes());

    let map = KeymapLoader::new(dir.path()).load("commented").unwrap();
    assert_eq!(map.entry(Modifier::Base, 0), Some(&Entry::from_char('a')));
}

#[test]
fn test_literal_path_name() {
    let dir = KeymapDir::new();
    let path = write_basic(&dir, "mine");
    let name = path.display().to_string();

    let map = KeymapLoader::new("/nonexistent").load(&name).unwrap();
    assert_eq!(map.name(), name);
}

#[test]
fn test_available_and_export_roundtrip() {
    let dir = KeymapDir::new();
    write_basic(&dir, "de");
    write_basic(&dir, "be");
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let loader = KeymapLoader::new(dir.path());
    assert_eq!(loader.available().unwrap(), vec!["be", "de"]);

    let map = loader.load("de").unwrap();
    let exported = dir.path().join("de-full.json");
    KeymapLoader::save(&map, &exported).unwrap();

    let text = std::fs::read_to_string(&exported).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["altgr_map"][0], "b");
    assert_eq!(value["shift_altgr_map"][127], "b");

    let mut reloaded = loader.load("de-full").unwrap();
    reloaded.set_name("de");
    assert_eq!(reloaded, map);
}
