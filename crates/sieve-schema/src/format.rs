//! # Error Formatter
//!
//! Renders normalized errors as one human-readable line.

use sieve_core::ValidationError;

/// Join `"{field}: {message}"` for each error with `", "`, in order.
///
/// An empty list renders as an empty string.
pub fn format_validation_error_message(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
