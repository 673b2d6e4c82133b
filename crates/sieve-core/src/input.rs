//! # Host-Supplied Inputs
//!
//! Schemas and custom values reach Sieve either as JSON text typed by a
//! user or as values the host has already evaluated into structure.
//! [`JsonInput`] keeps that distinction until a parser decides what to do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// A JSON value that may still be in text form.
///
/// Deserializes untagged: a JSON string becomes [`JsonInput::Text`],
/// anything else becomes [`JsonInput::Structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonInput {
    /// Raw JSON text, parsed on demand.
    Text(String),
    /// An already-structured value, passed through as-is.
    Structured(Value),
}

impl JsonInput {
    /// True when the input carries nothing to validate: empty text or `null`.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Structured(value) => value.is_null(),
        }
    }
}

impl From<&str> for JsonInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for JsonInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for JsonInput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Which value is the subject of validation for each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    /// Validate the record's own payload.
    #[default]
    EntireItem,
    /// Validate a separately supplied per-record value.
    CustomJson,
}

impl DataSource {
    /// Wire name used by hosts and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntireItem => "entireItem",
            Self::CustomJson => "customJson",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entireItem" => Ok(Self::EntireItem),
            "customJson" => Ok(Self::CustomJson),
            other => Err(ConfigError::UnknownDataSource(other.to_string())),
        }
    }
}
