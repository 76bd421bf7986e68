//! # Validation Results
//!
//! A [`ValidationResult`] is produced once per linted file and never
//! mutated after the validator hands it back. The orchestrator aggregates
//! results by AND-ing `is_valid` and concatenating diagnostics.
//!
//! ## Invariants
//!
//! - `coverage_percentage` ∈ [0, 100] and equals
//!   `covered_field_count / total_field_count × 100` (100 when the scope
//!   expects no fields).
//! - `missing_fields` plus the covered fields is exactly the scope's
//!   expected field set.
//! - `is_valid` is false iff some diagnostic is a hard error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Diagnostic;
use crate::schema::SchemaDescriptor;

/// `covered / total × 100`, or 100 for an empty scope.
pub fn coverage_percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    covered.min(total) as f64 / total as f64 * 100.0
}

/// Two-decimal rendering used in reports.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Coverage and validity of one named section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionValidationResult {
    pub is_valid: bool,
    pub coverage_percentage: f64,
    pub covered_field_count: usize,
    pub total_field_count: usize,
    pub missing_fields: Vec<String>,
    pub unexpected_fields: Vec<String>,
}

/// Coverage, validity, and diagnostics of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub coverage_percentage: f64,
    pub covered_field_count: usize,
    pub total_field_count: usize,
    pub missing_fields: Vec<String>,
    pub unexpected_fields: Vec<String>,
    pub sections: BTreeMap<String, SectionValidationResult>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Result for a file that carries no schema fields of its own (ignore
    /// rules, docs bundles). Coverage is trivially complete.
    pub fn unscored(diagnostics: Vec<Diagnostic>) -> Self {
        let is_valid = !diagnostics.iter().any(Diagnostic::is_error);
        Self {
            is_valid,
            coverage_percentage: 100.0,
            covered_field_count: 0,
            total_field_count: 0,
            missing_fields: Vec::new(),
            unexpected_fields: Vec::new(),
            sections: BTreeMap::new(),
            diagnostics,
        }
    }

    /// Result for a context file that could not be decoded at all: nothing
    /// is covered and the file fails with the given diagnostic.
    pub fn parse_failure(schema: &SchemaDescriptor, diagnostic: Diagnostic) -> Self {
        let missing: Vec<String> = schema.top_level_names().map(str::to_string).collect();
        Self {
            is_valid: false,
            coverage_percentage: 0.0,
            covered_field_count: 0,
            total_field_count: missing.len(),
            missing_fields: missing,
            unexpected_fields: Vec::new(),
            sections: BTreeMap::new(),
            diagnostics: vec![diagnostic],
        }
    }

    /// Append a diagnostic, failing the result if it is a hard error.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.is_valid &= !diagnostic.is_error();
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Coverage formatted with two decimals.
    pub fn coverage_display(&self) -> String {
        format_percentage(self.coverage_percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CONTEXT_SCHEMA;

    #[test]
    fn coverage_of_empty_scope_is_full() {
        assert_eq!(coverage_percentage(0, 0), 100.0);
    }

    #[test]
    fn coverage_fraction() {
        assert_eq!(coverage_percentage(1, 4), 25.0);
        assert_eq!(coverage_percentage(4, 4), 100.0);
        assert_eq!(format_percentage(coverage_percentage(1, 3)), "33.33%");
    }

    #[test]
    fn push_warning_keeps_validity() {
        let mut result = ValidationResult::unscored(Vec::new());
        result.push(Diagnostic::warning("soft"));
        assert!(result.is_valid);
        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn push_error_fails_result() {
        let mut result = ValidationResult::unscored(Vec::new());
        result.push(Diagnostic::schema("hard"));
        result.push(Diagnostic::warning("soft"));
        assert!(!result.is_valid);
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn parse_failure_misses_every_field() {
        let result = ValidationResult::parse_failure(&CONTEXT_SCHEMA, Diagnostic::syntax("bad"));
        assert!(!result.is_valid);
        assert_eq!(result.coverage_percentage, 0.0);
        assert_eq!(result.missing_fields.len(), CONTEXT_SCHEMA.top_level.len());
        assert_eq!(result.total_field_count, CONTEXT_SCHEMA.top_level.len());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Coverage always lies in [0, 100].
            #[test]
            fn coverage_is_bounded(covered in 0usize..64, total in 0usize..64) {
                let p = coverage_percentage(covered, total);
                prop_assert!((0.0..=100.0).contains(&p));
            }

            /// Full coverage only when every expected field is covered.
            #[test]
            fn coverage_full_iff_complete(covered in 0usize..32, total in 1usize..32) {
                let covered = covered.min(total);
                let p = coverage_percentage(covered, total);
                prop_assert_eq!(p == 100.0, covered == total);
            }
        }
    }
}
