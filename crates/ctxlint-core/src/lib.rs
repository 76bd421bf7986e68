//! # ctxlint-core: Foundational Types for the Context Linter
//!
//! Leaf crate of the workspace. Defines the types every other crate
//! exchanges: diagnostics, the fixed context-file schema, the canonical
//! field map with its key-casing rules, and per-file validation results.
//!
//! ## Key Design Principles
//!
//! 1. **The schema is data.** Required fields, section field sets, and
//!    field kinds live in static tables ([`schema::CONTEXT_SCHEMA`]).
//!    Changing the convention is a table edit, never a new code path.
//!
//! 2. **One casing convention.** Every field map is kebab-cased before it
//!    reaches the validator. JSON documents, which use camelCase by
//!    convention, are translated by [`casing::KeyCase`].
//!
//! 3. **Diagnostics, not exceptions.** Per-file problems are folded into a
//!    [`ValidationResult`] as [`Diagnostic`]s. Only [`LintError::Fatal`]
//!    aborts a run.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ctxlint-*` crates.
//! - No filesystem access.
//! - No `.unwrap()` outside tests.

pub mod casing;
pub mod error;
pub mod field_map;
pub mod result;
pub mod schema;

pub use casing::KeyCase;
pub use error::{Diagnostic, DiagnosticKind, LintError, Position};
pub use field_map::FieldMap;
pub use result::{coverage_percentage, SectionValidationResult, ValidationResult};
pub use schema::{FieldKind, ReferenceKind, SchemaDescriptor, SectionSpec, CONTEXT_SCHEMA};
