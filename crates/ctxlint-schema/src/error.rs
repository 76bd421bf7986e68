//! Parse failures of the three format normalizers.

use ctxlint_core::{Diagnostic, Position};
use thiserror::Error;

/// Why a context document could not be turned into a field map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The YAML or JSON decoder rejected the input.
    #[error("invalid {format}: {message}")]
    Syntax {
        /// `"YAML"`, `"JSON"`, or `"frontmatter YAML"`.
        format: &'static str,
        message: String,
        /// Position in the whole file, when the decoder reported one.
        position: Option<Position>,
    },

    /// Frontmatter delimiters are missing or unbalanced.
    #[error("{0}")]
    Structural(String),

    /// The document decoded, but not to a map.
    #[error("document must be a map of fields, found {found}")]
    NotAMap { found: &'static str },
}

impl ParseError {
    /// The diagnostic recorded against the file.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Syntax { position, .. } => {
                let diagnostic = Diagnostic::syntax(self.to_string());
                match position {
                    Some(position) => diagnostic.at(*position),
                    None => diagnostic,
                }
            }
            Self::Structural(_) => Diagnostic::structural(self.to_string()),
            Self::NotAMap { .. } => Diagnostic::schema(self.to_string()),
        }
    }
}
