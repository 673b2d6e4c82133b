//! # Check-Schema Subcommand
//!
//! Pre-flight a schema file: parse it, list every strict-mode violation,
//! then compile it with the configured engine options.
//!
//! Exit codes: 0 when the schema compiles, 1 when it does not, 2 on
//! operational error (reported by `main`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sieve_core::JsonInput;
use sieve_schema::{parse_schema, strict_violations, SchemaEngine};

use crate::config::FileConfig;

/// Arguments for the `sieve check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON Schema file to check.
    pub path: PathBuf,
}

/// Execute the check-schema subcommand.
pub fn run_check(args: &CheckArgs, config_path: Option<&Path>) -> Result<u8> {
    let options = match config_path {
        Some(path) => FileConfig::load(path)?.engine.unwrap_or_default(),
        None => Default::default(),
    };

    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("cannot read schema file {}", args.path.display()))?;

    let schema = match parse_schema(JsonInput::Text(text)) {
        Ok(schema) => schema,
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            return Ok(1);
        }
    };

    let violations = strict_violations(&schema);
    for violation in &violations {
        println!("FAIL: {}: {violation}", args.path.display());
    }
    if !violations.is_empty() {
        return Ok(1);
    }

    match SchemaEngine::new(options).compile(&schema) {
        Ok(_) => {
            println!("ok: {}", args.path.display());
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(body: &str) -> u8 {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, body).unwrap();
        run_check(&CheckArgs { path }, None).unwrap()
    }

    #[test]
    fn sound_schema_passes() {
        assert_eq!(check(r#"{"type": "object", "properties": {"a": {"type": "string"}}}"#), 0);
    }

    #[test]
    fn strict_violation_fails() {
        assert_eq!(check(r#"{"type": "object", "foo": 1}"#), 1);
    }

    #[test]
    fn syntax_error_fails() {
        assert_eq!(check("{not json"), 1);
    }

    #[test]
    fn missing_file_is_operational_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CheckArgs {
            path: dir.path().join("absent.json"),
        };
        assert!(run_check(&args, None).is_err());
    }
}
