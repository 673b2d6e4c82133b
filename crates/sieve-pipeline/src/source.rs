//! # Custom JSON Sources
//!
//! When the data source is custom JSON, the host evaluates a per-record
//! expression and hands Sieve the result. [`CustomJsonSource`] is that
//! seam: the orchestrator asks it once per record.

use serde_json::Value;

use sieve_core::{JsonInput, Record};

/// Supplies the custom JSON value for one record.
pub trait CustomJsonSource {
    /// Value for the record at `index`, or `None` when nothing is supplied.
    fn custom_json(&self, index: usize, record: &Record) -> Option<JsonInput>;
}

/// Never supplies a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomJson;

impl CustomJsonSource for NoCustomJson {
    fn custom_json(&self, _index: usize, _record: &Record) -> Option<JsonInput> {
        None
    }
}

/// Supplies the same value for every record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantCustomJson(pub JsonInput);

impl CustomJsonSource for ConstantCustomJson {
    fn custom_json(&self, _index: usize, _record: &Record) -> Option<JsonInput> {
        Some(self.0.clone())
    }
}

/// Reads the value from each record by JSON Pointer.
///
/// A string at the pointer is treated as JSON text and parsed later, the
/// way a host expression yielding a string would be. A missing target
/// means no value was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerCustomJson {
    pointer: String,
}

impl PointerCustomJson {
    /// Source reading `pointer` (e.g. `/body/payload`; `""` is the whole record).
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }

    /// The pointer this source reads.
    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

impl CustomJsonSource for PointerCustomJson {
    fn custom_json(&self, _index: usize, record: &Record) -> Option<JsonInput> {
        record.pointer(&self.pointer).map(|value| match value {
            Value::String(text) => JsonInput::Text(text.clone()),
            other => JsonInput::Structured(other.clone()),
        })
    }
}

impl<F> CustomJsonSource for F
where
    F: Fn(usize, &Record) -> Option<JsonInput>,
{
    fn custom_json(&self, index: usize, record: &Record) -> Option<JsonInput> {
        self(index, record)
    }
}
