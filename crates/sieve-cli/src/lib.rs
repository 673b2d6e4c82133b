//! # sieve-cli — Command Line for Sieve
//!
//! Provides the `sieve` binary.
//!
//! ## Subcommands
//!
//! - `sieve validate` — Split a batch of records into valid and invalid outputs.
//! - `sieve check-schema` — Report whether a schema compiles under strict mode.
//!
//! ```bash
//! sieve validate --schema customer.schema.json --input records.jsonl
//! sieve validate --config stage.yaml --invalid-out rejected.json < records.json
//! sieve check-schema customer.schema.json
//! ```
//!
//! Exit codes are 0 for success, 1 when records or the schema fail, and 2
//! for operational errors such as unreadable files.

pub mod check;
pub mod config;
pub mod io;
pub mod validate;
