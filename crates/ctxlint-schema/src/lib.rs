//! # ctxlint-schema: Format Normalizers and Schema Validation
//!
//! Turns one context file, in any of its three encodings, into a
//! [`ValidationResult`](ctxlint_core::ValidationResult):
//!
//! ```text
//!   .context.md ──┐  split_frontmatter + YAML ─┐
//!   .context.yaml ├─ ContextFormat::parse ─────┼─▶ FieldMap ─▶ ContextValidator
//!   .context.json ┘  JSON + camel→kebab keys ──┘        │
//!                                                       ▼
//!                              ReferenceResolver (related modules, diagrams)
//! ```
//!
//! Markdown bodies are scanned separately by [`markdown::scan_body`] and
//! their findings are folded into the same result.
//!
//! The linked-resources file (`.contextdocs.md`) has its own shape and is
//! handled by [`docs::lint_docs`].
//!
//! ## Crate Policy
//!
//! - Parse failures never escape as `Err` from the validator. They become
//!   failing results carrying one positioned diagnostic.
//! - The only filesystem access is reading the file under validation and
//!   resolving cross-references, both through the caller's
//!   [`ContextValidator`].
//! - No network I/O. URLs are checked for shape only.

pub mod docs;
pub mod error;
pub mod format;
pub mod frontmatter;
pub mod markdown;
pub mod resolve;
pub mod validate;

pub use docs::{lint_docs, DocBundle, DocResource, DocsReport};
pub use error::ParseError;
pub use format::{ContextFormat, MarkdownBody, ParsedContext};
pub use frontmatter::{split_frontmatter, Frontmatter};
pub use markdown::{scan_body, BodyScan, Link};
pub use resolve::{ReferenceResolver, Unresolved};
pub use validate::{ContextValidator, CoveragePolicy};
