//! Integration test: the full parse → compile → extract → validate → format
//! chain, driven only through the crate's public API.

use serde_json::json;
use sieve_core::{DataSource, JsonInput, Record, SchemaError};
use sieve_schema::{
    create_validator, extract_data_to_validate, format_validation_error_message,
    parse_schema, validate_data,
};

const SCHEMA_TEXT: &str = r#"{
  "type": "object",
  "properties": {
    "name": { "type": "string", "minLength": 1 },
    "age": { "type": "integer", "minimum": 0 }
  },
  "required": ["name"]
}"#;

#[test]
fn text_schema_validates_record_payloads() {
    let schema = parse_schema(JsonInput::from(SCHEMA_TEXT)).unwrap();
    let mut validator = create_validator(&schema).unwrap();

    let good = Record::new(json!({"name": "Ada", "age": 36}));
    let subject = extract_data_to_validate(&good, DataSource::EntireItem, None).unwrap();
    assert!(validate_data(&mut validator, &subject).is_valid());

    let bad = Record::new(json!({"name": "", "age": -1}));
    let subject = extract_data_to_validate(&bad, DataSource::EntireItem, None).unwrap();
    let result = validate_data(&mut validator, &subject);
    assert!(!result.is_valid());

    let fields: Vec<&str> = result.errors().iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"/name"));
    assert!(fields.contains(&"/age"));

    let message = format_validation_error_message(result.errors());
    assert!(message.contains("/name: "));
    assert!(message.contains("/age: "));
    assert_eq!(message.matches(", /").count(), 1);
}

#[test]
fn custom_json_subject_replaces_payload() {
    let schema = parse_schema(JsonInput::from(SCHEMA_TEXT)).unwrap();
    let mut validator = create_validator(&schema).unwrap();

    // The payload itself would fail; the custom value is what counts.
    let record = Record::new(json!({"unrelated": true}));
    let subject = extract_data_to_validate(
        &record,
        DataSource::CustomJson,
        Some(JsonInput::from(r#"{"name": "Grace"}"#)),
    )
    .unwrap();
    assert!(validate_data(&mut validator, &subject).is_valid());
}

#[test]
fn malformed_schema_text_never_reaches_the_compiler() {
    let err = parse_schema(JsonInput::from(r#"{"type": "object""#)).unwrap_err();
    assert!(matches!(err, SchemaError::Syntax(_)));
}

#[test]
fn strict_mode_rejects_typo_in_schema() {
    let schema = parse_schema(JsonInput::from(
        r#"{"type": "object", "properties": {"name": {"type": "string"}}, "requird": ["name"]}"#,
    ))
    .unwrap();
    let err = create_validator(&schema).unwrap_err();
    assert!(err.to_string().contains("requird"));
}
