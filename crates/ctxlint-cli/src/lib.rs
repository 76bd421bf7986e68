//! # ctxlint-cli: Lint Runs and the `ctxlint` Binary
//!
//! Ties the workspace together: [`lint::Linter`] walks a directory tree,
//! consults the ignore registry, dispatches context files to the
//! validator, and aggregates a [`report::LintReport`].
//!
//! ## Modules
//!
//! - `config`: optional YAML configuration with defaults for every key
//! - `lint`: the run state machine and directory walk
//! - `report`: aggregated results, text rendering, JSON serialization
//! - `command`: argument struct and handler behind the binary
//!
//! ## Crate Policy
//!
//! - Argument parsing stays in `main.rs` and `command`; linting logic
//!   lives in the library crates and `lint`.
//! - Exit codes: 0 valid, 1 invalid, 2 fatal or configuration error.

pub mod command;
pub mod config;
pub mod lint;
pub mod report;

pub use config::{ConfigError, LintConfig};
pub use lint::{LintState, Linter};
pub use report::{FileKind, FileReport, LintReport, Summary};
