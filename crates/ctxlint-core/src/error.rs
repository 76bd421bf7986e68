//! # Error Types: Diagnostics and Run Failures
//!
//! Two layers of failure exist in the linter:
//!
//! - [`Diagnostic`]: a problem found in one file. Diagnostics are data:
//!   they are collected into that file's result and never abort the walk.
//!   Their [`DiagnosticKind`] decides whether they invalidate the file.
//! - [`LintError`]: a failure of the run itself. Only an unreadable root
//!   directory is fatal; everything else degrades to diagnostics.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure that aborts a whole lint run with no partial report.
#[derive(Error, Debug)]
pub enum LintError {
    /// The root directory could not be read.
    #[error("cannot read root directory {}: {source}", .path.display())]
    Fatal {
        /// The root that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The root path exists but is not a directory.
    #[error("root path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Classification of a per-file problem.
///
/// Every kind except [`DiagnosticKind::Warning`] is a hard error that fails
/// the file it was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Malformed YAML, JSON, or ignore pattern.
    Syntax,
    /// Missing or incomplete frontmatter, or a missing mandatory file.
    Structural,
    /// Required field absent, type mismatch, unresolved cross-reference,
    /// missing title heading.
    Schema,
    /// Soft finding that degrades the report without failing the file.
    Warning,
}

impl DiagnosticKind {
    /// Short label used in rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Structural => "structure",
            Self::Schema => "schema",
            Self::Warning => "warning",
        }
    }
}

/// 1-based line and column inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Convert a byte offset into `text` to a 1-based line/column.
    ///
    /// Columns count characters, not bytes. Offsets past the end of the
    /// text clamp to the position just after the last character.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// One problem found while linting a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Canonical (kebab-case) field path the problem is about, if any.
    /// Section fields use `section.field`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            position: None,
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Syntax, message)
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Structural, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Schema, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Whether this diagnostic fails the file it belongs to.
    pub fn is_error(&self) -> bool {
        self.kind != DiagnosticKind::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            write!(f, "error[{}]: {}", self.kind.label(), self.message)?;
        } else {
            write!(f, "warning: {}", self.message)?;
        }
        if let Some(position) = self.position {
            write!(f, " ({position})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_from_offset_first_line() {
        assert_eq!(Position::from_offset("abc", 0), Position::new(1, 1));
        assert_eq!(Position::from_offset("abc", 2), Position::new(1, 3));
    }

    #[test]
    fn position_from_offset_after_newlines() {
        let text = "one\ntwo\nthree";
        // 't' of "three"
        assert_eq!(Position::from_offset(text, 8), Position::new(3, 1));
        assert_eq!(Position::from_offset(text, 10), Position::new(3, 3));
    }

    #[test]
    fn position_from_offset_clamps_past_end() {
        assert_eq!(Position::from_offset("ab\n", 99), Position::new(2, 1));
    }

    #[test]
    fn position_from_offset_counts_characters() {
        // "é" is two bytes; offset 2 lands on 'x'.
        assert_eq!(Position::from_offset("éx", 2), Position::new(1, 2));
        // Offset inside a multi-byte character backs up to its start.
        assert_eq!(Position::from_offset("éx", 1), Position::new(1, 1));
    }

    #[test]
    fn warnings_are_not_errors() {
        assert!(!Diagnostic::warning("soft").is_error());
        assert!(Diagnostic::schema("hard").is_error());
        assert!(Diagnostic::syntax("hard").is_error());
        assert!(Diagnostic::structural("hard").is_error());
    }

    #[test]
    fn display_includes_position() {
        let d = Diagnostic::syntax("unexpected token").at(Position::new(4, 7));
        assert_eq!(
            d.to_string(),
            "error[syntax]: unexpected token (line 4, column 7)"
        );
    }

    #[test]
    fn display_warning() {
        let d = Diagnostic::warning("code block is missing a language");
        assert_eq!(d.to_string(), "warning: code block is missing a language");
    }
}
