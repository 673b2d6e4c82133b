//! # Batch Configuration
//!
//! Settings read once per batch. Per-record settings (the custom JSON
//! value) come from a [`CustomJsonSource`](crate::source::CustomJsonSource)
//! instead.

use serde::{Deserialize, Serialize};

use sieve_core::{DataSource, JsonInput};
use sieve_schema::EngineOptions;

/// Everything a batch needs before it sees its first record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    /// Schema as text or structure.
    pub schema: JsonInput,
    /// What to validate for each record.
    #[serde(default)]
    pub data_source: DataSource,
    /// Route per-record failures to the invalid output instead of aborting.
    #[serde(default)]
    pub continue_on_fail: bool,
    /// Compiler options.
    #[serde(default)]
    pub engine: EngineOptions,
}

impl BatchConfig {
    /// Configuration that validates each record's payload and aborts on
    /// the first per-record failure.
    pub fn new(schema: impl Into<JsonInput>) -> Self {
        Self {
            schema: schema.into(),
            data_source: DataSource::default(),
            continue_on_fail: false,
            engine: EngineOptions::default(),
        }
    }

    /// Set the data source.
    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }

    /// Set the continue-on-fail policy.
    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    /// Set compiler options.
    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }
}
