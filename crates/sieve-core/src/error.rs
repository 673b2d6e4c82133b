//! # Error Types
//!
//! Structured error hierarchy for Sieve. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema errors ([`SchemaError`]) describe a broken batch configuration.
//!   They abort the batch before any record is processed.
//! - Extraction errors ([`ExtractionError`]) belong to a single record and
//!   are recoverable when the host continues past per-record failures.
//! - Data that fails validation is never an error. It is a normal
//!   [`ValidationResult`](crate::ValidationResult) with a non-empty error list.

use thiserror::Error;

/// Message used when a record needs custom JSON and none was supplied.
pub const MISSING_CUSTOM_JSON_MESSAGE: &str =
    "Custom JSON is required when Data Source is \"Custom JSON\"";

/// The batch schema could not be turned into a validator.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema text is not valid JSON.
    #[error("Invalid JSON Schema: {0}")]
    Syntax(#[source] serde_json::Error),

    /// Schema is valid JSON but was rejected by the compiler or by
    /// strict-mode rules.
    #[error("schema compilation failed: {reason}")]
    Compilation {
        /// Reason reported by the compiler or the strict-mode checker.
        reason: String,
    },
}

/// The value to validate could not be determined for one record.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Data source is custom JSON but no value was supplied.
    #[error("Custom JSON is required when Data Source is \"Custom JSON\"")]
    MissingCustomJson,

    /// Custom JSON text failed to parse.
    #[error("Custom JSON is not valid JSON: {0}")]
    CustomJsonSyntax(#[source] serde_json::Error),
}

/// Error that aborts a whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Schema parse or compile failure. Never recoverable per record.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A record failed and the batch is not configured to continue.
    #[error("record {index}: {source}")]
    Record {
        /// Position of the offending record in the input.
        index: usize,
        /// What went wrong for that record.
        #[source]
        source: ExtractionError,
    },
}

impl BatchError {
    /// Index of the record that aborted the batch, if a record did.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::Record { index, .. } => Some(*index),
            Self::Schema(_) => None,
        }
    }
}

/// Invalid batch configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Data source name is not one of the supported values.
    #[error("unknown data source '{0}': expected 'entireItem' or 'customJson'")]
    UnknownDataSource(String),

    /// Two settings that exclude each other were both supplied.
    #[error("conflicting settings: {0}")]
    Conflict(String),
}
