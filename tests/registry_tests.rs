//! Registry Tests
//!
//! Builds registries from the schema fixtures and parses documents against them.

use std::path::Path;

use json_configparser::{
    custom_validation, Args, ErrorKind, ParserConfig, SchemaDeclaration, SchemaRegistry,
    UnknownFieldPolicy,
};
use serde_json::{json, Value};

fn fixtures_path() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").leak()
}

fn registry(schema: &str) -> SchemaRegistry {
    let declaration = SchemaDeclaration::from_json_str(schema).unwrap();
    SchemaRegistry::from_declaration(declaration, None).unwrap()
}

fn valid_document() -> Value {
    serde_json::from_str(include_str!("fixtures/valid.json")).unwrap()
}

// =============================================================================
// Full Schema Tests
// =============================================================================

#[test]
fn test_valid_options_with_bounds() {
    let registry = registry(include_str!("fixtures/options_schema.json"));
    let args = registry.parse_str(include_str!("fixtures/valid.json")).unwrap();
    assert_eq!(Value::Object(args), valid_document());
}

#[test]
fn test_numeric_literals_are_normalized() {
    let registry = registry(include_str!("fixtures/options_schema.json"));
    let args = registry.parse_str(include_str!("fixtures/coerced.json")).unwrap();
    assert_eq!(Value::Object(args.clone()), valid_document());
    assert!(args["a1"].is_i64());
    assert!(args["a13"][0][0].is_i64());

    // Parsing the normalized output again changes nothing
    let again = registry.parse(&Value::Object(args.clone())).unwrap();
    assert_eq!(again, args);
}

#[test]
fn test_defaults_fill_empty_document() {
    let registry = registry(include_str!("fixtures/defaults_schema.json"));

    let from_empty = registry.parse_str(include_str!("fixtures/empty.json")).unwrap();
    let from_valid = registry.parse_str(include_str!("fixtures/valid.json")).unwrap();

    assert_eq!(Value::Object(from_empty.clone()), valid_document());
    assert_eq!(from_empty, from_valid);
}

#[test]
fn test_invalid_element_type() {
    let registry = registry(include_str!("fixtures/options_schema.json"));
    let err = registry.parse_str(include_str!("fixtures/invalid.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.field(), Some("element of a8 list"));
}

#[test]
fn test_unknown_arguments() {
    let registry = registry(include_str!("fixtures/options_schema.json"));
    let mut document = valid_document();
    document["extra"] = json!(1);

    let err = registry.parse(&document).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownField);
    assert_eq!(err.field(), Some("extra"));

    let registry = registry.with_unknown_field_policy(UnknownFieldPolicy::Warn);
    let args = registry.parse(&document).unwrap();
    assert!(!args.contains_key("extra"));
}

#[test]
fn test_out_of_range_nested_value() {
    let registry = registry(include_str!("fixtures/options_schema.json"));
    let mut document = valid_document();
    document["a15"]["b"]["a"] = json!(11);

    let err = registry.parse(&document).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!(
        err.field(),
        Some("element of element of a15 dictionary with key b dictionary with key a")
    );
}

#[test]
fn test_empty_sequence_rejected() {
    let registry = registry(r#"{"fields": [{"name": "tags", "type": "List[str]"}]}"#);
    let err = registry.parse(&json!({"tags": []})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyValue);
    assert_eq!(err.field(), Some("tags"));
}

// =============================================================================
// Build-Time Failures
// =============================================================================

#[test]
fn test_bound_for_unknown_field() {
    let declaration = SchemaDeclaration::from_json_str(
        r#"{"fields": [{"name": "a1", "type": "int"}], "bounds": [{"field": "a2", "lower": 0}]}"#,
    )
    .unwrap();
    let err = SchemaRegistry::from_declaration(declaration, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownField);
}

#[test]
fn test_bound_for_string_field() {
    let declaration = SchemaDeclaration::from_json_str(
        r#"{"fields": [{"name": "a3", "type": "List[str]"}], "bounds": [{"field": "a3", "lower": 0}]}"#,
    )
    .unwrap();
    let err = SchemaRegistry::from_declaration(declaration, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
}

#[test]
fn test_unsupported_declared_type() {
    let declaration = SchemaDeclaration::from_json_str(
        r#"{"fields": [{"name": "a1", "type": "Dict[str, List[complex]]"}]}"#,
    )
    .unwrap();
    let err = SchemaRegistry::from_declaration(declaration, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
}

#[test]
fn test_default_out_of_bounds() {
    let declaration = SchemaDeclaration::from_json_str(
        r#"{
            "fields": [{"name": "a5", "type": "List[int]", "default": [1, 20]}],
            "bounds": [{"field": "a5", "lower": 0, "upper": 10}]
        }"#,
    )
    .unwrap();
    let err = SchemaRegistry::from_declaration(declaration, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDefault);
    assert_eq!(err.field(), Some("a5"));
}

// =============================================================================
// Custom Validation
// =============================================================================

fn word_filter_registry() -> SchemaRegistry {
    let declaration = SchemaDeclaration::from_json_str(include_str!("fixtures/word_filter_schema.json")).unwrap();
    let validation = custom_validation(|args: Args| {
        let translation = args["translation"].as_object().cloned().unwrap_or_default();
        for word in args["words"].as_array().into_iter().flatten() {
            let word = word.as_str().unwrap_or_default();
            if !translation.contains_key(word) {
                anyhow::bail!("Unknown word: {}", word);
            }
        }
        Ok(None)
    });
    SchemaRegistry::from_declaration(declaration, validation).unwrap()
}

#[test]
fn test_word_filter_accepts_translated_words() {
    let registry = word_filter_registry();
    let args = registry.parse_file(fixtures_path().join("word_filter_args.json")).unwrap();

    assert_eq!(args["max_size"], json!(3));
    assert_eq!(args["fail"], json!(false));
    assert_eq!(args["words"], json!(["ab", "cd", "efg"]));
}

#[test]
fn test_word_filter_rejects_untranslated_word() {
    let registry = word_filter_registry();
    let err = registry
        .parse(&json!({"words": ["ab", "zz"], "translation": {"ab": "ba"}}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert!(err.to_string().contains("Unknown word: zz"));

    // The empty default translation fails the cross-field check too
    let err = registry.parse(&json!({"words": ["ab"]})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
}

#[test]
fn test_word_filter_bound() {
    let registry = word_filter_registry();
    let err = registry
        .parse(&json!({"words": ["ab"], "max_size": 0, "translation": {"ab": "ba"}}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
}

// =============================================================================
// Files and Settings
// =============================================================================

#[test]
fn test_parse_missing_file() {
    let registry = word_filter_registry();
    let dir = tempfile::tempdir().unwrap();
    let err = registry.parse_file(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_parse_malformed_file() {
    let registry = word_filter_registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"words": ["ab""#).unwrap();

    let err = registry.parse_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_settings_select_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configparser.toml");
    std::fs::write(&path, "[parsing]\nunknown_fields = \"warn\"\n").unwrap();

    let settings = ParserConfig::load_from(Some(path.to_str().unwrap())).unwrap();
    let registry = word_filter_registry().with_config(&settings);
    assert_eq!(registry.unknown_field_policy(), UnknownFieldPolicy::Warn);

    let args = registry
        .parse(&json!({"words": ["ab"], "translation": {"ab": "ba"}, "colour": "red"}))
        .unwrap();
    assert!(!args.contains_key("colour"));
}

#[test]
fn test_schema_declaration_file() {
    let declaration = SchemaDeclaration::from_json_file(fixtures_path().join("defaults_schema.json")).unwrap();
    assert_eq!(declaration.fields.len(), 16);
    let registry = SchemaRegistry::from_declaration(declaration, None).unwrap();
    assert_eq!(registry.field_names().next(), Some("a1"));
    assert!(registry.descriptor("a16").unwrap().has_default());
}
