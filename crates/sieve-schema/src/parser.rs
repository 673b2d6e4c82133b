//! # Schema Parser
//!
//! Normalizes a schema supplied as text or as structure into one
//! [`Value`]. Purely syntactic: whether the value is an admissible schema
//! is decided by the [engine](crate::engine).

use serde_json::Value;

use sieve_core::{JsonInput, SchemaError};

/// Parse a schema from text, or pass a structured schema through.
///
/// Structured input is moved out unchanged, so no copy is made.
///
/// # Errors
///
/// Returns [`SchemaError::Syntax`] when text input is not valid JSON.
pub fn parse_schema(input: JsonInput) -> Result<Value, SchemaError> {
    match input {
        JsonInput::Text(text) => serde_json::from_str(&text).map_err(SchemaError::Syntax),
        JsonInput::Structured(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_schema_text() {
        let schema = parse_schema(JsonInput::from(
            r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#,
        ))
        .unwrap();
        assert_eq!(
            schema,
            json!({"type": "object", "properties": {"name": {"type": "string"}}})
        );
    }

    #[test]
    fn structured_schema_passes_through() {
        let schema = json!({"type": "string"});
        assert_eq!(parse_schema(JsonInput::from(schema.clone())).unwrap(), schema);
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        let err = parse_schema(JsonInput::from("{ invalid json }")).unwrap_err();
        assert!(matches!(err, SchemaError::Syntax(_)));
        assert!(err.to_string().starts_with("Invalid JSON Schema: "));
    }

    #[test]
    fn empty_text_is_a_syntax_error() {
        assert!(matches!(
            parse_schema(JsonInput::from("")),
            Err(SchemaError::Syntax(_))
        ));
    }

    #[test]
    fn scalar_and_array_text_parse() {
        assert_eq!(parse_schema(JsonInput::from("true")).unwrap(), json!(true));
        assert_eq!(parse_schema(JsonInput::from("[1,2]")).unwrap(), json!([1, 2]));
    }
}
