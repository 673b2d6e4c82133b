//! # sieve-pipeline — Batch Orchestration
//!
//! The glue between a host and the validation core. A host hands over a
//! [`BatchConfig`], the records, and a [`CustomJsonSource`]; it gets back
//! a [`BatchOutput`] with the valid and invalid partitions.
//!
//! ```no_run
//! use serde_json::json;
//! use sieve_core::Record;
//! use sieve_pipeline::{run_batch, BatchConfig, NoCustomJson};
//!
//! let config = BatchConfig::new(r#"{"type":"object","required":["name"]}"#);
//! let records = vec![Record::new(json!({"name": "John"})), Record::new(json!({}))];
//! let output = run_batch(config, records, &NoCustomJson)?;
//! assert_eq!(output.valid.len(), 1);
//! assert_eq!(output.invalid.len(), 1);
//! # Ok::<(), sieve_core::BatchError>(())
//! ```
//!
//! ## Crate Policy
//!
//! - The schema is parsed and compiled once per batch, never per record.
//! - Each [`BatchRunner`] owns its validator; nothing is shared between
//!   batches.

pub mod batch;
pub mod config;
pub mod source;

pub use batch::{run_batch, BatchOutput, BatchRunner, BatchSummary, InvalidKind, InvalidRecord};
pub use config::BatchConfig;
pub use source::{ConstantCustomJson, CustomJsonSource, NoCustomJson, PointerCustomJson};
