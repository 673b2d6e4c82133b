//! # Validation Engine
//!
//! Compiles schemas under strict mode and runs subjects through them.
//!
//! ## Engine Context
//!
//! There is no process-wide engine. A [`SchemaEngine`] carries the
//! compilation options and is owned by whoever runs a batch, so two
//! batches never share configuration by accident. [`create_validator`] and
//! [`is_valid_json_schema`] use a default engine for one-off calls.
//!
//! ## Diagnostics
//!
//! Every run collects all violations, not just the first. The underlying
//! engine's native shape keeps the last run's diagnostics on the
//! validator; [`CompiledValidator::validate`] reproduces that (it needs
//! `&mut self`, so two callers can never interleave on one instance) and
//! [`transform_validation_errors`] reads them back. [`validate_data`]
//! returns the errors directly, and [`CompiledValidator::evaluate`] does
//! the same through `&self` without touching stored state.
//!
//! ## References
//!
//! Only references inside the schema itself resolve. Compilation never
//! reads files or touches the network; an external `$ref` fails with a
//! [`SchemaError::Compilation`].

use std::fmt;

use jsonschema::{Retrieve, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sieve_core::{SchemaError, ValidationError, ValidationResult};

use crate::diagnostics::EngineDiagnostic;
use crate::strict::check_strict;

/// JSON Schema draft to compile against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaDraft {
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl SchemaDraft {
    fn to_engine(self) -> jsonschema::Draft {
        match self {
            Self::Draft4 => jsonschema::Draft::Draft4,
            Self::Draft6 => jsonschema::Draft::Draft6,
            Self::Draft7 => jsonschema::Draft::Draft7,
            Self::Draft201909 => jsonschema::Draft::Draft201909,
            Self::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Reason prefix reported when a schema points outside itself.
pub const EXTERNAL_REFERENCE_REFUSED: &str = "external schema references are not allowed";

/// Retriever that refuses every external URI.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("{EXTERNAL_REFERENCE_REFUSED}: {}", uri.as_str()).into())
    }
}

/// Compilation options. Strict mode and all-errors collection are not
/// options: they are always on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    /// Draft to use; `None` detects it from `$schema`, falling back to 2020-12.
    pub draft: Option<SchemaDraft>,
    /// Whether `format` is asserted rather than treated as an annotation.
    pub validate_formats: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            draft: None,
            validate_formats: true,
        }
    }
}

/// Compiles schemas into [`CompiledValidator`]s.
#[derive(Debug, Clone, Default)]
pub struct SchemaEngine {
    options: EngineOptions,
}

impl SchemaEngine {
    /// Engine with the given options.
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Options this engine compiles with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compile a schema under strict-mode rules.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compilation`] when the schema is not an object
    /// or boolean, breaks a strict-mode rule, or is rejected by the
    /// compiler (e.g. `properties` that is not a mapping).
    pub fn compile(&self, schema: &Value) -> Result<CompiledValidator, SchemaError> {
        if !(schema.is_object() || schema.is_boolean()) {
            return Err(SchemaError::Compilation {
                reason: "schema must be an object or a boolean".to_string(),
            });
        }

        check_strict(schema).map_err(|violation| SchemaError::Compilation {
            reason: violation.to_string(),
        })?;

        let inner = self
            .build(schema)
            .map_err(|reason| SchemaError::Compilation { reason })?;

        tracing::debug!(
            keywords = schema.as_object().map_or(0, |m| m.len()),
            draft = ?self.options.draft,
            "compiled schema validator"
        );

        Ok(CompiledValidator {
            schema: schema.clone(),
            inner,
            last_run: Vec::new(),
        })
    }

    /// True iff [`compile`](Self::compile) would succeed.
    pub fn is_valid_json_schema(&self, schema: &Value) -> bool {
        self.compile(schema).is_ok()
    }

    fn build(&self, schema: &Value) -> Result<jsonschema::Validator, String> {
        let built = match self.options.draft {
            Some(draft) => jsonschema::options()
                .with_retriever(OfflineRetriever)
                .with_draft(draft.to_engine())
                .should_validate_formats(self.options.validate_formats)
                .build(schema),
            None => jsonschema::options()
                .with_retriever(OfflineRetriever)
                .should_validate_formats(self.options.validate_formats)
                .build(schema),
        };
        built.map_err(|e| e.to_string())
    }
}

/// A schema compiled once and reused for every record of a batch.
pub struct CompiledValidator {
    schema: Value,
    inner: jsonschema::Validator,
    last_run: Vec<EngineDiagnostic>,
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("schema", &self.schema)
            .field("last_run", &self.last_run)
            .finish_non_exhaustive()
    }
}

impl CompiledValidator {
    /// The schema this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate a subject, replacing the stored diagnostics of the
    /// previous run. Returns true when the subject is valid.
    pub fn validate(&mut self, subject: &Value) -> bool {
        self.last_run = self.diagnose(subject);
        self.last_run.is_empty()
    }

    /// Diagnostics stored by the most recent [`validate`](Self::validate).
    pub fn last_errors(&self) -> &[EngineDiagnostic] {
        &self.last_run
    }

    /// Validate a subject without touching stored diagnostics.
    pub fn evaluate(&self, subject: &Value) -> ValidationResult {
        ValidationResult::from_errors(
            self.diagnose(subject)
                .iter()
                .map(EngineDiagnostic::normalize)
                .collect(),
        )
    }

    fn diagnose(&self, subject: &Value) -> Vec<EngineDiagnostic> {
        self.inner
            .iter_errors(subject)
            .flat_map(|error| EngineDiagnostic::from_engine(&self.schema, &error))
            .collect()
    }
}

/// True iff the schema compiles under strict mode with default options.
pub fn is_valid_json_schema(schema: &Value) -> bool {
    SchemaEngine::default().is_valid_json_schema(schema)
}

/// Compile a schema with default options.
///
/// # Errors
///
/// See [`SchemaEngine::compile`].
pub fn create_validator(schema: &Value) -> Result<CompiledValidator, SchemaError> {
    SchemaEngine::default().compile(schema)
}

/// Run a subject through the validator and return its normalized result.
pub fn validate_data(validator: &mut CompiledValidator, subject: &Value) -> ValidationResult {
    if validator.validate(subject) {
        ValidationResult::valid()
    } else {
        ValidationResult::from_errors(transform_validation_errors(validator))
    }
}

/// Normalize the diagnostics left by the validator's most recent run.
pub fn transform_validation_errors(validator: &CompiledValidator) -> Vec<ValidationError> {
    validator
        .last_errors()
        .iter()
        .map(EngineDiagnostic::normalize)
        .collect()
}
