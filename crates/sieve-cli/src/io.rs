//! # Record Input and Output
//!
//! Records are read as a JSON array, a single JSON document, or JSON
//! Lines. Outputs are written as pretty-printed JSON.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use sieve_core::Record;

/// Parse records from text.
///
/// A JSON array yields one record per element; any other single JSON
/// document is one record; otherwise each non-blank line is a record.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(document) = serde_json::from_str::<Value>(text) {
        return Ok(match document {
            Value::Array(items) => items.into_iter().map(Record::new).collect(),
            other => vec![Record::new(other)],
        });
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Value>(line)
                .map(Record::new)
                .with_context(|| format!("invalid JSON on input line {}", i + 1))
        })
        .collect()
}

/// Read records from a file, or from stdin when `path` is `None` or `-`.
pub fn read_records(path: Option<&Path>) -> Result<Vec<Record>> {
    let mut text = String::new();
    match path {
        Some(p) if p != Path::new("-") => {
            text = std::fs::read_to_string(p)
                .with_context(|| format!("cannot read input file {}", p.display()))?;
        }
        _ => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read records from stdin")?;
        }
    }
    parse_records(&text)
}

/// Write a value as pretty JSON to a file.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_vec_pretty(value).context("cannot serialize output")?;
    body.push(b'\n');
    std::fs::write(path, body).with_context(|| format!("cannot write {}", path.display()))
}

/// Write a value as pretty JSON to stdout.
pub fn write_json_stdout<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("cannot write to stdout")?;
    writeln!(handle).context("cannot write to stdout")?;
    Ok(())
}
