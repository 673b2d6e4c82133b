//! # Batch Orchestration
//!
//! Runs one batch of records through a validator compiled once:
//!
//! 1. [`BatchRunner::new`] parses and compiles the schema. A broken schema
//!    fails here, before any record is looked at, whatever the
//!    continue-on-fail setting.
//! 2. [`BatchRunner::run`] extracts each record's subject, validates it,
//!    and routes the record. Valid records pass through unmodified.
//!    Records with violations become `{ validationErrors: [...] }`.
//! 3. A record whose subject cannot be extracted either aborts the batch
//!    with its index, or, under continue-on-fail, becomes its own payload
//!    with an `error` field.
//!
//! Both outputs keep input order and every invalid entry carries
//! `pairedItem`, the index of the record it came from.

use serde::Serialize;
use serde_json::{json, Map, Value};

use sieve_core::{
    BatchError, DataSource, ExtractionError, Record, SchemaError, ValidationError,
};
use sieve_schema::{
    extract_data_to_validate, format_validation_error_message, parse_schema, validate_data,
    CompiledValidator, SchemaEngine,
};

use crate::config::BatchConfig;
use crate::source::CustomJsonSource;

/// Field that carries the failure message on errored records.
pub const ERROR_FIELD: &str = "error";

/// Field that carries violations on records that failed validation.
pub const VALIDATION_ERRORS_FIELD: &str = "validationErrors";

/// Why a record ended up in the invalid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKind {
    /// The subject violated the schema.
    ValidationFailed,
    /// The subject could not be extracted.
    Errored,
}

/// One entry of the invalid output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRecord {
    /// Body emitted to the host.
    pub json: Value,
    /// Index of the originating record.
    pub paired_item: usize,
    #[serde(skip)]
    kind: InvalidKind,
}

impl InvalidRecord {
    /// Entry for a record whose subject violated the schema.
    pub fn validation_failed(index: usize, errors: &[ValidationError]) -> Self {
        let mut body = Map::new();
        body.insert(
            VALIDATION_ERRORS_FIELD.to_string(),
            Value::Array(errors.iter().map(Value::from).collect()),
        );
        Self {
            json: Value::Object(body),
            paired_item: index,
            kind: InvalidKind::ValidationFailed,
        }
    }

    /// Entry for a record that could not be processed.
    ///
    /// Object payloads get the message merged in as `error`, replacing any
    /// existing `error` field. Other payloads are wrapped as
    /// `{ value, error }`.
    pub fn errored(index: usize, payload: Value, message: &str) -> Self {
        let mut body = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        if let Some(previous) = body.insert(ERROR_FIELD.to_string(), json!(message)) {
            tracing::warn!(
                record = index,
                previous = %previous,
                "replaced existing error field on errored record"
            );
        }
        Self {
            json: Value::Object(body),
            paired_item: index,
            kind: InvalidKind::Errored,
        }
    }

    /// Why this record is invalid.
    pub fn kind(&self) -> InvalidKind {
        self.kind
    }

    /// Violations, for records that failed validation.
    pub fn validation_errors(&self) -> Option<Vec<ValidationError>> {
        if self.kind != InvalidKind::ValidationFailed {
            return None;
        }
        self.json
            .get(VALIDATION_ERRORS_FIELD)
            .cloned()
            .and_then(|errors| serde_json::from_value(errors).ok())
    }
}

/// The two outputs of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutput {
    /// Records that passed, unmodified, in input order.
    pub valid: Vec<Record>,
    /// Entries for records that failed or errored, in input order.
    pub invalid: Vec<InvalidRecord>,
}

impl BatchOutput {
    /// Counts per outcome.
    pub fn summary(&self) -> BatchSummary {
        let errored = self
            .invalid
            .iter()
            .filter(|r| r.kind() == InvalidKind::Errored)
            .count();
        BatchSummary {
            total: self.valid.len() + self.invalid.len(),
            valid: self.valid.len(),
            invalid: self.invalid.len() - errored,
            errored,
        }
    }
}

/// Record counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    /// Records that failed validation.
    pub invalid: usize,
    /// Records that could not be processed (continue-on-fail only).
    pub errored: usize,
}

/// A batch with its schema compiled and ready for records.
#[derive(Debug)]
pub struct BatchRunner {
    validator: CompiledValidator,
    data_source: DataSource,
    continue_on_fail: bool,
}

impl BatchRunner {
    /// Parse and compile the batch schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema text is malformed or the
    /// schema does not compile under strict mode.
    pub fn new(config: BatchConfig) -> Result<Self, SchemaError> {
        let BatchConfig {
            schema,
            data_source,
            continue_on_fail,
            engine,
        } = config;

        let schema = parse_schema(schema)?;
        let validator = SchemaEngine::new(engine).compile(&schema)?;

        Ok(Self {
            validator,
            data_source,
            continue_on_fail,
        })
    }

    /// The compiled validator shared by every record of this batch.
    pub fn validator(&self) -> &CompiledValidator {
        &self.validator
    }

    /// Validate and route every record.
    ///
    /// `source` is consulted only when the data source is custom JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Record`] with the record's index when a
    /// subject cannot be extracted and continue-on-fail is off.
    pub fn run<S>(&mut self, records: Vec<Record>, source: &S) -> Result<BatchOutput, BatchError>
    where
        S: CustomJsonSource + ?Sized,
    {
        let mut output = BatchOutput::default();

        for (index, record) in records.into_iter().enumerate() {
            match self.process(index, &record, source) {
                Ok(errors) if errors.is_empty() => {
                    tracing::debug!(record = index, "record valid");
                    output.valid.push(record);
                }
                Ok(errors) => {
                    tracing::debug!(
                        record = index,
                        errors = errors.len(),
                        message = %format_validation_error_message(&errors),
                        "record invalid"
                    );
                    output
                        .invalid
                        .push(InvalidRecord::validation_failed(index, &errors));
                }
                Err(err) if self.continue_on_fail => {
                    tracing::warn!(record = index, error = %err, "record failed, continuing");
                    let message = err.to_string();
                    output
                        .invalid
                        .push(InvalidRecord::errored(index, record.into_payload(), &message));
                }
                Err(error) => {
                    return Err(BatchError::Record {
                        index,
                        source: error,
                    })
                }
            }
        }

        let summary = output.summary();
        tracing::info!(
            total = summary.total,
            valid = summary.valid,
            invalid = summary.invalid,
            errored = summary.errored,
            "batch complete"
        );
        Ok(output)
    }

    fn process<S>(
        &mut self,
        index: usize,
        record: &Record,
        source: &S,
    ) -> Result<Vec<ValidationError>, ExtractionError>
    where
        S: CustomJsonSource + ?Sized,
    {
        let custom_json = match self.data_source {
            DataSource::CustomJson => source.custom_json(index, record),
            DataSource::EntireItem => None,
        };
        let subject = extract_data_to_validate(record, self.data_source, custom_json)?;
        Ok(validate_data(&mut self.validator, &subject).into_errors())
    }
}

/// Compile `config` and run `records` through it in one call.
///
/// # Errors
///
/// See [`BatchRunner::new`] and [`BatchRunner::run`].
pub fn run_batch<S>(
    config: BatchConfig,
    records: Vec<Record>,
    source: &S,
) -> Result<BatchOutput, BatchError>
where
    S: CustomJsonSource + ?Sized,
{
    BatchRunner::new(config)?.run(records, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ConstantCustomJson, NoCustomJson};
    use sieve_core::JsonInput;

    const NAME_SCHEMA: &str = r#"{"type":"object","properties":{"name":{"type":"string"}},"required":["name"]}"#;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values.into_iter().map(Record::new).collect()
    }

    #[test]
    fn routes_valid_and_invalid_records() {
        let output = run_batch(
            BatchConfig::new(NAME_SCHEMA),
            records(vec![json!({"name": "John"}), json!({})]),
            &NoCustomJson,
        )
        .unwrap();

        assert_eq!(output.valid, records(vec![json!({"name": "John"})]));
        assert_eq!(output.invalid.len(), 1);
        let invalid = &output.invalid[0];
        assert_eq!(invalid.paired_item, 1);
        assert_eq!(invalid.kind(), InvalidKind::ValidationFailed);
        let errors = invalid.validation_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "/");
        assert_eq!(errors[0].keyword, "required");
        assert_eq!(errors[0].params.get("missingProperty"), Some(&json!("name")));
    }

    #[test]
    fn validation_failed_body_lists_every_error() {
        let errors = vec![
            ValidationError::new("", "missing name", "required", Map::new()),
            ValidationError::new("/age", "", "type", Map::new()),
        ];
        let invalid = InvalidRecord::validation_failed(4, &errors);
        assert_eq!(invalid.paired_item, 4);
        assert_eq!(
            invalid.json,
            json!({"validationErrors": [
                {"field": "/", "message": "missing name", "keyword": "required", "params": {}},
                {"field": "/age", "message": "Validation failed", "keyword": "type", "params": {}}
            ]})
        );
        assert_eq!(invalid.validation_errors(), Some(errors));
    }

    #[test]
    fn schema_syntax_error_aborts_before_records() {
        let err = run_batch(
            BatchConfig::new("{not json").with_continue_on_fail(true),
            records(vec![json!({})]),
            &NoCustomJson,
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::Schema(SchemaError::Syntax(_))));
        assert_eq!(err.record_index(), None);
    }

    #[test]
    fn schema_compilation_error_aborts_regardless_of_policy() {
        let err = BatchRunner::new(
            BatchConfig::new(r#"{"type":"invalid-type"}"#).with_continue_on_fail(true),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Compilation { .. }));
    }

    #[test]
    fn missing_custom_json_aborts_with_index() {
        let err = run_batch(
            BatchConfig::new(NAME_SCHEMA).with_data_source(DataSource::CustomJson),
            records(vec![json!({"name": "a"}), json!({"name": "b"})]),
            &|index: usize, _: &Record| {
                (index == 0).then(|| JsonInput::from(r#"{"name":"ok"}"#))
            },
        )
        .unwrap_err();
        assert_eq!(err.record_index(), Some(1));
        assert!(err
            .to_string()
            .ends_with("Custom JSON is required when Data Source is \"Custom JSON\""));
    }

    #[test]
    fn continue_on_fail_merges_error_into_payload() {
        let output = run_batch(
            BatchConfig::new(NAME_SCHEMA)
                .with_data_source(DataSource::CustomJson)
                .with_continue_on_fail(true),
            records(vec![json!({"id": 7})]),
            &NoCustomJson,
        )
        .unwrap();

        assert!(output.valid.is_empty());
        let entry = &output.invalid[0];
        assert_eq!(entry.kind(), InvalidKind::Errored);
        assert_eq!(entry.paired_item, 0);
        assert_eq!(
            entry.json,
            json!({
                "id": 7,
                "error": "Custom JSON is required when Data Source is \"Custom JSON\""
            })
        );
        assert_eq!(entry.validation_errors(), None);
    }

    #[test]
    fn errored_record_replaces_existing_error_field() {
        let entry = InvalidRecord::errored(2, json!({"error": "old"}), "new");
        assert_eq!(entry.json, json!({"error": "new"}));
    }

    #[test]
    fn errored_scalar_payload_is_wrapped() {
        let entry = InvalidRecord::errored(0, json!([1, 2]), "boom");
        assert_eq!(entry.json, json!({"value": [1, 2], "error": "boom"}));
    }

    #[test]
    fn custom_json_source_is_used_per_record() {
        let output = run_batch(
            BatchConfig::new(NAME_SCHEMA).with_data_source(DataSource::CustomJson),
            records(vec![json!({}), json!({})]),
            &ConstantCustomJson(JsonInput::from(json!({"name": "from host"}))),
        )
        .unwrap();
        assert_eq!(output.valid.len(), 2);
        // Valid records are the originals, not the custom values.
        assert_eq!(output.valid[0].payload(), &json!({}));
    }

    #[test]
    fn entire_item_never_consults_source() {
        let source = |_: usize, _: &Record| -> Option<JsonInput> {
            panic!("source must not be consulted for entireItem")
        };
        let output = run_batch(
            BatchConfig::new(NAME_SCHEMA),
            records(vec![json!({"name": "x"})]),
            &source,
        )
        .unwrap();
        assert_eq!(output.valid.len(), 1);
    }

    #[test]
    fn summary_counts_each_outcome() {
        let output = run_batch(
            BatchConfig::new(NAME_SCHEMA)
                .with_data_source(DataSource::CustomJson)
                .with_continue_on_fail(true),
            records(vec![json!({}), json!({}), json!({})]),
            &|index: usize, _: &Record| match index {
                0 => Some(JsonInput::from(r#"{"name":"a"}"#)),
                1 => Some(JsonInput::from(r#"{"name":1}"#)),
                _ => Some(JsonInput::from("{broken")),
            },
        )
        .unwrap();
        assert_eq!(
            output.summary(),
            BatchSummary {
                total: 3,
                valid: 1,
                invalid: 1,
                errored: 1,
            }
        );
    }

    #[test]
    fn invalid_record_serializes_host_shape() {
        let entry = InvalidRecord::validation_failed(3, &[]);
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"json": {"validationErrors": []}, "pairedItem": 3})
        );
    }
}
