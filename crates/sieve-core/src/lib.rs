//! # sieve-core — Foundational Types for Sieve
//!
//! Sieve is a single stage in a record-processing pipeline: it validates a
//! batch of records against a JSON Schema and partitions them into a
//! "valid" and an "invalid" output. This crate holds the types every other
//! crate in the workspace shares; it depends on nothing internal.
//!
//! ## Key Types
//!
//! - [`JsonInput`] — a schema or custom value as the host supplies it:
//!   raw text that still needs parsing, or an already-structured value.
//! - [`DataSource`] — closed choice of what gets validated per record.
//! - [`Record`] — one input item, carried through to the outputs unmodified.
//! - [`ValidationError`] / [`ValidationResult`] — the normalized diagnostic
//!   shape. `is_valid` holds iff `errors` is empty, by construction.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sieve-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod input;
pub mod record;

pub use diagnostic::{ValidationError, ValidationResult};
pub use error::{BatchError, ConfigError, ExtractionError, SchemaError};
pub use input::{DataSource, JsonInput};
pub use record::Record;
