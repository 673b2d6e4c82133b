//! # Validation Diagnostics
//!
//! The stable, engine-independent shape of a validation outcome. These
//! types serialize with camelCase field names so hosts receive
//! `{ field, message, keyword, params }` and `{ isValid, errors }`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path reported for violations at the root of the validated value.
pub const ROOT_FIELD: &str = "/";

/// Message used when the engine supplies no explanation.
pub const FALLBACK_MESSAGE: &str = "Validation failed";

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON Pointer to the violating value, `"/"` for the root.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
    /// Name of the schema keyword that failed (`required`, `type`, ...).
    pub keyword: String,
    /// Keyword-specific diagnostic data (`missingProperty`, `limit`, ...).
    pub params: Map<String, Value>,
}

impl ValidationError {
    /// Build an error, applying the root-path and message fallbacks.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        keyword: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        let field = field.into();
        let message = message.into();
        Self {
            field: if field.is_empty() {
                ROOT_FIELD.to_string()
            } else {
                field
            },
            message: if message.is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            },
            keyword: keyword.into(),
            params,
        }
    }
}

impl From<&ValidationError> for Value {
    /// Same shape as the serde output, built without a fallible serializer.
    fn from(error: &ValidationError) -> Self {
        let mut entry = Map::new();
        entry.insert("field".to_string(), Value::String(error.field.clone()));
        entry.insert("message".to_string(), Value::String(error.message.clone()));
        entry.insert("keyword".to_string(), Value::String(error.keyword.clone()));
        entry.insert("params".to_string(), Value::Object(error.params.clone()));
        Value::Object(entry)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating one subject.
///
/// Only constructible from an error list, so `is_valid` always agrees
/// with `errors.is_empty()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }

    /// Result for the given errors; valid iff the list is empty.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// True when no constraint was violated.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Violations in the order the engine reported them.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consume the result and return the violations.
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}
