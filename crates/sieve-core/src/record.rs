//! # Records
//!
//! One input item. Records that pass validation are emitted unmodified,
//! so the type is a transparent wrapper around the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single input item and its structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wrap a payload.
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// The record's payload.
    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Consume the record and return its payload.
    pub fn into_payload(self) -> Value {
        self.0
    }

    /// Look up a value inside the payload by JSON Pointer.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }
}

impl From<Value> for Record {
    fn from(payload: Value) -> Self {
        Self(payload)
    }
}
