//! # Validate Subcommand
//!
//! Runs one batch: loads the schema and records, validates every record,
//! and writes the valid and invalid partitions.
//!
//! Exit codes: 0 when every record is valid, 1 when any record is invalid
//! or errored, 2 on operational error (reported by `main`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use sieve_core::{DataSource, JsonInput};
use sieve_pipeline::{
    BatchConfig, BatchRunner, ConstantCustomJson, CustomJsonSource, NoCustomJson,
    PointerCustomJson,
};

use crate::config::FileConfig;
use crate::io::{read_records, write_json_file, write_json_stdout};

/// Arguments for the `sieve validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// JSON Schema file.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Records: a JSON array, one JSON document, or JSON Lines. Reads stdin when omitted or `-`.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// What to validate per record: `entireItem` or `customJson`.
    #[arg(long, value_name = "SOURCE")]
    pub data_source: Option<DataSource>,

    /// Custom JSON text validated for every record.
    #[arg(long, value_name = "JSON", conflicts_with = "custom_json_pointer")]
    pub custom_json: Option<String>,

    /// JSON Pointer selecting each record's custom JSON.
    #[arg(long, value_name = "POINTER")]
    pub custom_json_pointer: Option<String>,

    /// Route per-record failures to the invalid output instead of aborting.
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Treat `format` as an annotation instead of asserting it.
    #[arg(long)]
    pub no_format_validation: bool,

    /// Write valid records here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub valid_out: Option<PathBuf>,

    /// Write invalid records here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub invalid_out: Option<PathBuf>,
}

/// Where each record's custom JSON comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomJsonSetting {
    None,
    Constant(JsonInput),
    Pointer(String),
}

impl CustomJsonSetting {
    fn into_source(self) -> Box<dyn CustomJsonSource> {
        match self {
            Self::None => Box::new(NoCustomJson),
            Self::Constant(input) => Box::new(ConstantCustomJson(input)),
            Self::Pointer(pointer) => Box::new(PointerCustomJson::new(pointer)),
        }
    }
}

/// Merge command-line flags over the configuration file.
pub fn resolve_settings(
    args: &ValidateArgs,
    file: FileConfig,
) -> Result<(BatchConfig, CustomJsonSetting)> {
    let schema = match (args.schema.clone(), file.schema, file.schema_path) {
        (Some(path), _, _) | (None, None, Some(path)) => JsonInput::Text(
            std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read schema file {}", path.display()))?,
        ),
        (None, Some(inline), _) => inline,
        (None, None, None) => bail!("no schema given: pass --schema or set it in --config"),
    };

    let custom = match (
        &args.custom_json,
        &args.custom_json_pointer,
        file.custom_json,
        file.custom_json_pointer,
    ) {
        (Some(text), _, _, _) => CustomJsonSetting::Constant(JsonInput::Text(text.clone())),
        (None, Some(pointer), _, _) => CustomJsonSetting::Pointer(pointer.clone()),
        (None, None, Some(input), _) => CustomJsonSetting::Constant(input),
        (None, None, None, Some(pointer)) => CustomJsonSetting::Pointer(pointer),
        (None, None, None, None) => CustomJsonSetting::None,
    };

    let data_source = args
        .data_source
        .or(file.data_source)
        .unwrap_or_default();
    if data_source == DataSource::EntireItem && custom != CustomJsonSetting::None {
        tracing::warn!("custom JSON is ignored unless the data source is customJson");
    }

    let mut engine = file.engine.unwrap_or_default();
    if args.no_format_validation {
        engine.validate_formats = false;
    }

    let batch = BatchConfig::new(schema)
        .with_data_source(data_source)
        .with_continue_on_fail(args.continue_on_fail || file.continue_on_fail.unwrap_or(false))
        .with_engine(engine);
    Ok((batch, custom))
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when all records are valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config_path: Option<&Path>) -> Result<u8> {
    let file = match config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let (batch, custom) = resolve_settings(args, file)?;

    // Schema problems surface before any record is read.
    let mut runner = BatchRunner::new(batch)?;
    let records = read_records(args.input.as_deref())?;
    tracing::info!(records = records.len(), "loaded records");

    let output = runner
        .run(records, custom.into_source().as_ref())
        .context("batch aborted")?;
    let summary = output.summary();

    let mut remaining = Map::new();
    match &args.valid_out {
        Some(path) => write_json_file(path, &output.valid)?,
        None => {
            remaining.insert("valid".to_string(), serde_json::to_value(&output.valid)?);
        }
    }
    match &args.invalid_out {
        Some(path) => write_json_file(path, &output.invalid)?,
        None => {
            remaining.insert("invalid".to_string(), serde_json::to_value(&output.invalid)?);
        }
    }
    if !remaining.is_empty() {
        write_json_stdout(&Value::Object(remaining))?;
    }

    eprintln!(
        "Records: {}/{} valid, {} invalid, {} errored",
        summary.valid, summary.total, summary.invalid, summary.errored
    );

    Ok(if summary.valid == summary.total { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_file(dir: &Path) -> PathBuf {
        let path = dir.join("schema.json");
        std::fs::write(
            &path,
            r#"{"type":"object","properties":{"name":{"type":"string"}},"required":["name"]}"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn schema_flag_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            schema: Some(schema_file(dir.path())),
            ..ValidateArgs::default()
        };
        let file = FileConfig {
            schema: Some(JsonInput::from("{}")),
            ..FileConfig::default()
        };
        let (batch, _) = resolve_settings(&args, file).unwrap();
        assert!(matches!(batch.schema, JsonInput::Text(ref t) if t.contains("required")));
    }

    #[test]
    fn inline_config_schema_is_used() {
        let file = FileConfig {
            schema: Some(JsonInput::from(json!({"type": "object"}))),
            data_source: Some(DataSource::CustomJson),
            custom_json_pointer: Some("/body".to_string()),
            continue_on_fail: Some(true),
            ..FileConfig::default()
        };
        let (batch, custom) = resolve_settings(&ValidateArgs::default(), file).unwrap();
        assert_eq!(batch.schema, JsonInput::from(json!({"type": "object"})));
        assert_eq!(batch.data_source, DataSource::CustomJson);
        assert!(batch.continue_on_fail);
        assert_eq!(custom, CustomJsonSetting::Pointer("/body".to_string()));
    }

    #[test]
    fn custom_json_flag_overrides_config_pointer() {
        let args = ValidateArgs {
            custom_json: Some("{}".to_string()),
            ..ValidateArgs::default()
        };
        let file = FileConfig {
            schema: Some(JsonInput::from("{}")),
            custom_json_pointer: Some("/x".to_string()),
            ..FileConfig::default()
        };
        let (_, custom) = resolve_settings(&args, file).unwrap();
        assert_eq!(custom, CustomJsonSetting::Constant(JsonInput::from("{}")));
    }

    #[test]
    fn missing_schema_is_an_error() {
        let err = resolve_settings(&ValidateArgs::default(), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no schema given"));
    }

    #[test]
    fn no_format_validation_flag_disables_formats() {
        let args = ValidateArgs {
            no_format_validation: true,
            ..ValidateArgs::default()
        };
        let file = FileConfig {
            schema: Some(JsonInput::from("{}")),
            ..FileConfig::default()
        };
        let (batch, _) = resolve_settings(&args, file).unwrap();
        assert!(!batch.engine.validate_formats);
    }

    #[test]
    fn writes_partitions_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.json");
        std::fs::write(&input, r#"[{"name": "John"}, {}]"#).unwrap();
        let valid_out = dir.path().join("valid.json");
        let invalid_out = dir.path().join("invalid.json");

        let args = ValidateArgs {
            schema: Some(schema_file(dir.path())),
            input: Some(input),
            valid_out: Some(valid_out.clone()),
            invalid_out: Some(invalid_out.clone()),
            ..ValidateArgs::default()
        };
        let code = run_validate(&args, None).unwrap();
        assert_eq!(code, 1);

        let valid: Value =
            serde_json::from_str(&std::fs::read_to_string(valid_out).unwrap()).unwrap();
        assert_eq!(valid, json!([{"name": "John"}]));

        let invalid: Value =
            serde_json::from_str(&std::fs::read_to_string(invalid_out).unwrap()).unwrap();
        assert_eq!(invalid[0]["pairedItem"], json!(1));
        assert_eq!(
            invalid[0]["json"]["validationErrors"][0]["params"],
            json!({"missingProperty": "name"})
        );
    }

    #[test]
    fn all_valid_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.jsonl");
        std::fs::write(&input, "{\"name\": \"a\"}\n{\"name\": \"b\"}\n").unwrap();
        let args = ValidateArgs {
            schema: Some(schema_file(dir.path())),
            input: Some(input),
            valid_out: Some(dir.path().join("v.json")),
            invalid_out: Some(dir.path().join("i.json")),
            ..ValidateArgs::default()
        };
        assert_eq!(run_validate(&args, None).unwrap(), 0);
    }

    #[test]
    fn broken_schema_fails_before_reading_records() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("bad.json");
        std::fs::write(&schema, r#"{"type": "invalid-type"}"#).unwrap();
        let args = ValidateArgs {
            schema: Some(schema),
            input: Some(dir.path().join("does-not-exist.json")),
            ..ValidateArgs::default()
        };
        let err = run_validate(&args, None).unwrap_err();
        assert!(err.to_string().contains("schema compilation failed"));
    }

    #[test]
    fn record_failure_aborts_with_index() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.json");
        std::fs::write(&input, r#"[{"body": "{\"name\":\"a\"}"}, {"other": 1}]"#).unwrap();
        let args = ValidateArgs {
            schema: Some(schema_file(dir.path())),
            input: Some(input),
            data_source: Some(DataSource::CustomJson),
            custom_json_pointer: Some("/body".to_string()),
            valid_out: Some(dir.path().join("v.json")),
            invalid_out: Some(dir.path().join("i.json")),
            ..ValidateArgs::default()
        };
        let err = run_validate(&args, None).unwrap_err();
        assert!(format!("{err:#}").contains("record 1"));
    }
}
