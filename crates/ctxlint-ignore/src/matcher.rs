//! # Compiled Matchers
//!
//! A [`CompiledMatcher`] is the ordered rule list of one ignore file, bound
//! to the directory that holds it. Evaluation is a left fold over the
//! rules: the last rule whose pattern selects a path decides, so a later
//! `!pattern` re-includes exactly what an earlier `pattern` excluded.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::rule::{IgnoreRule, PatternViolation, ViolationReason};

/// Compilation failure of an ignore file.
#[derive(Error, Debug)]
pub enum IgnoreError {
    /// One or more pattern lines are invalid. Every violation is listed.
    #[error("invalid ignore rules in {}:\n{}", .scope.display(), render_violations(.violations))]
    Syntax {
        scope: PathBuf,
        violations: Vec<PatternViolation>,
    },
}

fn render_violations(violations: &[PatternViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ordered rules of one ignore file.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    scope: PathBuf,
    rules: Vec<IgnoreRule>,
    warnings: Vec<PatternViolation>,
}

struct Analysis {
    rules: Vec<IgnoreRule>,
    errors: Vec<PatternViolation>,
    warnings: Vec<PatternViolation>,
}

impl CompiledMatcher {
    /// Compile ignore-file text for the directory `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreError::Syntax`] listing every invalid line when any
    /// line is rejected (`**`, critical file, bad character, malformed
    /// glob, or an exact `P`/`!P` conflict). Redundant duplicates are
    /// kept as [`CompiledMatcher::warnings`] and do not fail compilation.
    pub fn compile(content: &str, scope: impl Into<PathBuf>) -> Result<Self, IgnoreError> {
        let scope = scope.into();
        let analysis = analyze(content);
        if !analysis.errors.is_empty() {
            return Err(IgnoreError::Syntax {
                scope,
                violations: analysis.errors,
            });
        }
        Ok(Self {
            scope,
            rules: analysis.rules,
            warnings: analysis.warnings,
        })
    }

    /// Compile whatever lines are valid and return the rejected ones
    /// alongside. Rejected lines are never honoured.
    pub fn compile_lenient(
        content: &str,
        scope: impl Into<PathBuf>,
    ) -> (Self, Vec<PatternViolation>) {
        let analysis = analyze(content);
        let matcher = Self {
            scope: scope.into(),
            rules: analysis.rules,
            warnings: analysis.warnings,
        };
        (matcher, analysis.errors)
    }

    /// Directory this matcher governs.
    pub fn scope(&self) -> &Path {
        &self.scope
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn warnings(&self) -> &[PatternViolation] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `relative` (to [`CompiledMatcher::scope`], `/`-separated)
    /// is ignored. A trailing `/` marks the path as a directory.
    pub fn ignores(&self, relative: &str) -> bool {
        let is_dir = relative.ends_with('/');
        let components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
        self.ignores_components(&components, is_dir)
    }

    /// Path-typed variant of [`CompiledMatcher::ignores`].
    pub fn ignores_path(&self, relative: &Path, is_dir: bool) -> bool {
        let owned: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let components: Vec<&str> = owned.iter().map(String::as_str).collect();
        self.ignores_components(&components, is_dir)
    }

    fn ignores_components(&self, components: &[&str], is_dir: bool) -> bool {
        if components.is_empty() {
            return false;
        }
        self.rules.iter().fold(false, |ignored, rule| {
            if rule.matches(components, is_dir) {
                !rule.negated()
            } else {
                ignored
            }
        })
    }
}

/// Run every check over the file and compile the lines that pass.
fn analyze(content: &str) -> Analysis {
    let mut rules = Vec::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let pattern = line.trim();
        if pattern.is_empty() || pattern.starts_with('#') {
            continue;
        }

        // A repeat keeps its place in the rule order; its violations were
        // already reported on the first occurrence.
        let repeat_of = seen.get(pattern).copied();
        match repeat_of {
            Some(first_line) => warnings.push(PatternViolation::new(
                line_no,
                pattern,
                ViolationReason::Redundant { first_line },
            )),
            None => {
                let counterpart = match pattern.strip_prefix('!') {
                    Some(positive) => positive.to_string(),
                    None => format!("!{pattern}"),
                };
                if let Some(&other_line) = seen.get(counterpart.as_str()) {
                    errors.push(PatternViolation::new(
                        line_no,
                        pattern,
                        ViolationReason::Conflict {
                            other: counterpart,
                            other_line,
                        },
                    ));
                }
                seen.insert(pattern, line_no);
            }
        }

        match IgnoreRule::parse(line_no, pattern) {
            Ok(rule) => rules.push(rule),
            Err(violations) if repeat_of.is_none() => errors.extend(violations),
            Err(_) => {}
        }
    }

    errors.sort_by_key(|v| v.line);
    Analysis {
        rules,
        errors,
        warnings,
    }
}
