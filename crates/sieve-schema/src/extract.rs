//! # Data Extractor
//!
//! Decides, per record, which value is validated: the record's own
//! payload, or a custom value the host evaluated for that record.

use std::borrow::Cow;

use serde_json::Value;

use sieve_core::{DataSource, ExtractionError, JsonInput, Record};

/// Parse custom JSON text, or pass a structured value through.
///
/// # Errors
///
/// Returns [`ExtractionError::CustomJsonSyntax`] when text is not valid JSON.
pub fn extract_custom_json_data(input: JsonInput) -> Result<Value, ExtractionError> {
    match input {
        JsonInput::Text(text) => {
            serde_json::from_str(&text).map_err(ExtractionError::CustomJsonSyntax)
        }
        JsonInput::Structured(value) => Ok(value),
    }
}

/// Determine the subject of validation for one record.
///
/// For [`DataSource::EntireItem`] the record payload is borrowed as-is and
/// `custom_json` is ignored.
///
/// # Errors
///
/// For [`DataSource::CustomJson`], returns
/// [`ExtractionError::MissingCustomJson`] when `custom_json` is absent,
/// empty text, or `null`, and [`ExtractionError::CustomJsonSyntax`] when
/// it is malformed text.
pub fn extract_data_to_validate(
    record: &Record,
    data_source: DataSource,
    custom_json: Option<JsonInput>,
) -> Result<Cow<'_, Value>, ExtractionError> {
    match data_source {
        DataSource::EntireItem => Ok(Cow::Borrowed(record.payload())),
        DataSource::CustomJson => {
            let input = custom_json
                .filter(|input| !input.is_blank())
                .ok_or(ExtractionError::MissingCustomJson)?;
            extract_custom_json_data(input).map(Cow::Owned)
        }
    }
}
