//! # Schema and Coverage Validation
//!
//! [`ContextValidator`] scores a kebab-cased [`FieldMap`] against
//! [`CONTEXT_SCHEMA`] and owns the per-run state the scoring needs: the
//! key-casing memo and the cross-reference caches.
//!
//! ## Validity
//!
//! A file is valid when all of the following hold:
//!
//! - every required top-level field is present,
//! - every recognized field decodes to its declared kind,
//! - every cross-reference entry resolves,
//! - the markdown body (if any) opens with a title heading,
//! - under [`CoveragePolicy::Minimum`], every scored scope meets the
//!   threshold.
//!
//! Unexpected fields, missing optional fields, and partial coverage are
//! warnings. Sections absent from the input are neither scored nor
//! penalized.

use std::collections::BTreeMap;
use std::path::Path;

use ctxlint_core::field_map::{is_scalar, value_kind};
use ctxlint_core::result::format_percentage;
use ctxlint_core::schema::SectionSpec;
use ctxlint_core::{
    coverage_percentage, Diagnostic, FieldKind, FieldMap, KeyCase, SchemaDescriptor,
    SectionValidationResult, ValidationResult, CONTEXT_SCHEMA,
};
use serde::Serialize;
use serde_json::Value;

use crate::format::ContextFormat;
use crate::markdown::scan_body;
use crate::resolve::ReferenceResolver;

/// How coverage affects validity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "threshold")]
pub enum CoveragePolicy {
    /// Partial coverage is reported but never fails a file.
    #[default]
    Advisory,
    /// A scope below this percentage fails its file.
    Minimum(f64),
}

/// Validator for context files. One instance per lint run.
#[derive(Debug)]
pub struct ContextValidator {
    schema: &'static SchemaDescriptor,
    policy: CoveragePolicy,
    check_body_sections: bool,
    casing: KeyCase,
    resolver: ReferenceResolver,
}

impl Default for ContextValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields of one scope, scored.
struct ScopeScore {
    covered: usize,
    total: usize,
    /// Denominator for the minimum-coverage check. Absent sections are left out.
    policy_total: usize,
    missing: Vec<String>,
    unexpected: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ScopeScore {
    fn coverage(&self) -> f64 {
        coverage_percentage(self.covered, self.total)
    }

    fn policy_coverage(&self) -> f64 {
        coverage_percentage(self.covered, self.policy_total)
    }

    fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

impl ContextValidator {
    pub fn new() -> Self {
        Self {
            schema: &CONTEXT_SCHEMA,
            policy: CoveragePolicy::default(),
            check_body_sections: true,
            casing: KeyCase::new(),
            resolver: ReferenceResolver::new(),
        }
    }

    pub fn with_policy(mut self, policy: CoveragePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether markdown bodies are checked for the conventional `##` sections.
    pub fn with_body_sections(mut self, check: bool) -> Self {
        self.check_body_sections = check;
        self
    }

    pub fn policy(&self) -> CoveragePolicy {
        self.policy
    }

    /// Score `fields` against the schema. Cross-references resolve
    /// relative to `base_dir`.
    ///
    /// Validating the same map twice yields identical results; the caches
    /// only avoid repeated filesystem lookups.
    pub fn validate_context_data(&mut self, fields: &FieldMap, base_dir: &Path) -> ValidationResult {
        let schema = self.schema;
        let mut sections = BTreeMap::new();
        let absent_sections = schema
            .sections
            .iter()
            .filter(|spec| !fields.contains_key(spec.name))
            .count();
        let mut score = ScopeScore {
            covered: 0,
            total: schema.top_level.len(),
            policy_total: schema.top_level.len() - absent_sections,
            missing: Vec::new(),
            unexpected: Vec::new(),
            diagnostics: Vec::new(),
        };

        for (key, value) in fields {
            let Some(kind) = schema.kind_of(key) else {
                score.unexpected.push(key.clone());
                score
                    .diagnostics
                    .push(Diagnostic::warning(format!("unexpected field '{key}'")).with_field(key.as_str()));
                continue;
            };
            score.covered += 1;

            if kind == FieldKind::Section {
                match (value, schema.section(key)) {
                    (Value::Object(nested), Some(spec)) => {
                        let (section, diagnostics) = self.validate_section(spec, nested);
                        score.diagnostics.extend(diagnostics);
                        sections.insert(key.clone(), section);
                    }
                    _ => score.diagnostics.push(kind_mismatch(key, kind, value)),
                }
                continue;
            }
            self.check_field(key, kind, value, base_dir, &mut score.diagnostics);
        }

        for name in schema.top_level_names() {
            if fields.contains_key(name) {
                continue;
            }
            score.missing.push(name.to_string());
            if schema.is_required(name) {
                score.diagnostics.push(
                    Diagnostic::schema(format!("missing required field '{name}'")).with_field(name),
                );
            }
        }

        self.score_coverage("top-level fields", &mut score);

        ValidationResult {
            is_valid: score.is_valid(),
            coverage_percentage: score.coverage(),
            covered_field_count: score.covered,
            total_field_count: score.total,
            missing_fields: score.missing,
            unexpected_fields: score.unexpected,
            sections,
            diagnostics: score.diagnostics,
        }
    }

    fn validate_section(
        &self,
        spec: &SectionSpec,
        fields: &FieldMap,
    ) -> (SectionValidationResult, Vec<Diagnostic>) {
        let mut score = ScopeScore {
            covered: 0,
            total: spec.fields.len(),
            policy_total: spec.fields.len(),
            missing: Vec::new(),
            unexpected: Vec::new(),
            diagnostics: Vec::new(),
        };

        for (key, value) in fields {
            let path = format!("{}.{key}", spec.name);
            match spec.kind_of(key) {
                Some(kind) => {
                    score.covered += 1;
                    if !kind_matches(kind, value) {
                        score.diagnostics.push(kind_mismatch(&path, kind, value));
                    }
                }
                None => {
                    score.unexpected.push(key.clone());
                    score.diagnostics.push(
                        Diagnostic::warning(format!("unexpected field '{key}' in section '{}'", spec.name))
                            .with_field(path),
                    );
                }
            }
        }
        score.missing = spec
            .field_names()
            .filter(|name| !fields.contains_key(*name))
            .map(str::to_string)
            .collect();

        self.score_coverage(&format!("section '{}'", spec.name), &mut score);

        let result = SectionValidationResult {
            is_valid: score.is_valid(),
            coverage_percentage: score.coverage(),
            covered_field_count: score.covered,
            total_field_count: score.total,
            missing_fields: score.missing,
            unexpected_fields: score.unexpected,
        };
        (result, score.diagnostics)
    }

    fn check_field(
        &mut self,
        key: &str,
        kind: FieldKind,
        value: &Value,
        base_dir: &Path,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if !kind_matches(kind, value) {
            diagnostics.push(kind_mismatch(key, kind, value));
            return;
        }
        let (FieldKind::Reference(reference), Value::Array(entries)) = (kind, value) else {
            return;
        };
        for (index, entry) in entries.iter().enumerate() {
            let Some(entry) = entry.as_str() else {
                diagnostics.push(
                    Diagnostic::schema(format!(
                        "entry {} of '{key}' must be a string, found {}",
                        index + 1,
                        value_kind(entry)
                    ))
                    .with_field(key),
                );
                continue;
            };
            if let Err(unresolved) = self.resolver.resolve(reference, entry, base_dir) {
                diagnostics.push(
                    Diagnostic::schema(format!("unresolved reference '{entry}' in '{key}': {unresolved}"))
                        .with_field(key),
                );
            }
        }
    }

    /// Partial-coverage warning plus the policy check for one scope.
    fn score_coverage(&self, scope: &str, score: &mut ScopeScore) {
        let coverage = score.coverage();
        if coverage < 100.0 {
            score.diagnostics.push(Diagnostic::warning(format!(
                "{scope} coverage is {}; missing: {}",
                format_percentage(coverage),
                score.missing.join(", ")
            )));
        }
        if let CoveragePolicy::Minimum(minimum) = self.policy {
            let scored = score.policy_coverage();
            if scored < minimum {
                score.diagnostics.push(Diagnostic::schema(format!(
                    "{scope} coverage {} is below the required minimum of {}",
                    format_percentage(scored),
                    format_percentage(minimum)
                )));
            }
        }
    }

    /// Parse `content` as `format` and validate it, folding parse failures
    /// and markdown body findings into the result.
    pub fn validate_str(&mut self, content: &str, format: ContextFormat, base_dir: &Path) -> ValidationResult {
        let parsed = match format.parse(content, &mut self.casing) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(format = %format, error = %err, "context document failed to parse");
                return ValidationResult::parse_failure(self.schema, err.to_diagnostic());
            }
        };

        let mut result = self.validate_context_data(&parsed.fields, base_dir);
        if let Some(body) = &parsed.body {
            let scan = scan_body(&body.text, body.first_line);
            result.extend(scan.diagnostics(body.first_line, self.check_body_sections));
        }
        if format == ContextFormat::Json {
            self.annotate_json_keys(&mut result);
        }
        result
    }

    /// Read and validate one context file. The format follows the file name.
    ///
    /// Unreadable files and unknown suffixes yield a failing result rather
    /// than an error.
    pub fn validate_file(&mut self, path: &Path) -> ValidationResult {
        let Some(format) = ContextFormat::from_path(path) else {
            return ValidationResult::parse_failure(
                self.schema,
                Diagnostic::structural(format!("{} is not a context file", path.display())),
            );
        };
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read context file");
                return ValidationResult::parse_failure(
                    self.schema,
                    Diagnostic::structural(format!("cannot read file: {e}")),
                );
            }
        };
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        self.validate_str(&content, format, base_dir)
    }

    /// Name the original camelCase key in diagnostics about JSON files.
    fn annotate_json_keys(&mut self, result: &mut ValidationResult) {
        for diagnostic in &mut result.diagnostics {
            let Some(field) = &diagnostic.field else {
                continue;
            };
            let camel: Vec<String> = field.split('.').map(|part| self.casing.kebab_to_camel(part)).collect();
            diagnostic.message.push_str(&format!(" (JSON key '{}')", camel.join(".")));
        }
    }

    /// Drop the cross-reference caches and the key-casing memo.
    pub fn clear_cache(&mut self) {
        tracing::trace!(
            references = self.resolver.cached_entries(),
            keys = self.casing.len(),
            "clearing validator caches"
        );
        self.resolver.clear_cache();
        self.casing.clear();
    }
}

fn kind_matches(kind: FieldKind, value: &Value) -> bool {
    match kind {
        FieldKind::String => is_scalar(value),
        FieldKind::List | FieldKind::Reference(_) => value.is_array(),
        FieldKind::Section => value.is_object(),
    }
}

fn kind_mismatch(field: &str, kind: FieldKind, value: &Value) -> Diagnostic {
    Diagnostic::schema(format!(
        "field '{field}' must be a {}, found {}",
        kind.describe(),
        value_kind(value)
    ))
    .with_field(field)
}
