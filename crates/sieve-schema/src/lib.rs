//! # sieve-schema — Schema Compilation & Record Validation
//!
//! The validation core of Sieve. Every batch flows through the same four
//! steps:
//!
//! 1. [`parser`] turns the configured schema (text or structure) into a
//!    [`serde_json::Value`].
//! 2. [`engine`] checks it against the [`strict`]-mode rules and compiles
//!    it once with the `jsonschema` crate.
//! 3. [`extract`] picks, per record, the value to validate.
//! 4. [`engine::validate_data`] runs that value through the compiled
//!    validator; [`diagnostics`] normalizes what the engine reports into
//!    [`sieve_core::ValidationError`]s, and [`format`] renders them.
//!
//! ## Crate Policy
//!
//! - Depends only on `sieve-core` internally.
//! - Schema semantics belong to the `jsonschema` crate. This crate adds
//!   strict-mode admissibility on top and owns the error shape.
//! - Data that fails validation is a result, never an `Err`.

pub mod diagnostics;
pub mod engine;
pub mod extract;
pub mod format;
pub mod parser;
pub mod strict;

pub use diagnostics::EngineDiagnostic;
pub use engine::{
    create_validator, is_valid_json_schema, transform_validation_errors, validate_data,
    CompiledValidator, EngineOptions, SchemaDraft, SchemaEngine,
};
pub use extract::{extract_custom_json_data, extract_data_to_validate};
pub use format::format_validation_error_message;
pub use parser::parse_schema;
pub use strict::{check_strict, strict_violations, StrictViolation};
