//! # ctxlint-ignore: Ignore Rules with Nearest-Ancestor Scoping
//!
//! Compiles `.contextignore` files into [`CompiledMatcher`]s and answers
//! "is this path excluded from linting?" through an [`IgnoreRegistry`].
//!
//! ## Pattern Syntax
//!
//! One pattern per line; blank lines and `#` comments are skipped.
//!
//! | Form | Meaning |
//! |------|---------|
//! | `name` | any path component named `name`, at any depth |
//! | `/name`, `dir/name` | anchored to the ignore file's directory |
//! | `name/` | directories only |
//! | `!pattern` | re-include what an earlier rule excluded |
//! | `*`, `?`, `[...]` | wildcards within a single path component |
//!
//! This is deliberately narrower than gitignore:
//!
//! - `**` is rejected outright.
//! - Patterns that would exclude the convention's own marker files
//!   (`.context.md`, `.contextignore`, ...) are rejected.
//! - A pattern and its exact negation in the same file are rejected.
//!
//! ## Scoping
//!
//! A path is judged by the ignore file of its nearest ancestor directory
//! that has one. A descendant's rules replace an ancestor's; they are never
//! merged.

pub mod matcher;
pub mod registry;
pub mod rule;

pub use matcher::{CompiledMatcher, IgnoreError};
pub use registry::{IgnoreFileOutcome, IgnoreRegistry};
pub use rule::{IgnoreRule, PatternViolation, ViolationReason};
