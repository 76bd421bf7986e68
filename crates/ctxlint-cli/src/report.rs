//! # Lint Report
//!
//! Aggregate of one lint run. The run is valid when every file result is
//! valid and no run-level structural error was raised.
//!
//! [`LintReport`] renders as a line-oriented text report through
//! `Display`, and serializes to JSON for machine consumers.

use std::fmt;
use std::path::{Path, PathBuf};

use ctxlint_core::{Diagnostic, ValidationResult};
use ctxlint_schema::{ContextFormat, DocBundle};
use serde::Serialize;

/// What kind of convention file a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileKind {
    Context { format: ContextFormat },
    Docs,
    Ignore { rule_count: usize },
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context { format } => write!(f, "{format}"),
            Self::Docs => f.write_str("docs"),
            Self::Ignore { rule_count } => write!(f, "ignore, {rule_count} rules"),
        }
    }
}

/// Result for one linted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: FileKind,
    pub result: ValidationResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<DocBundle>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid
    }
}

/// Counts shown on the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub files: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Everything one lint run found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintReport {
    pub root: PathBuf,
    /// Context files linted in the root-file phase.
    pub root_files: Vec<PathBuf>,
    /// Every linted file, in visiting order.
    pub files: Vec<FileReport>,
    /// Run-level failures not tied to a linted file.
    pub structural_errors: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_directories: Vec<PathBuf>,
    /// Directories that could not be read and were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_directories: Vec<PathBuf>,
    pub summary: Summary,
    pub is_valid: bool,
}

impl LintReport {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            root_files: Vec::new(),
            files: Vec::new(),
            structural_errors: Vec::new(),
            ignored_files: Vec::new(),
            ignored_directories: Vec::new(),
            skipped_directories: Vec::new(),
            summary: Summary::default(),
            is_valid: false,
        }
    }

    /// Compute the verdict and the summary counts.
    pub(crate) fn finish(&mut self) {
        let mut summary = Summary {
            files: self.files.len(),
            failed: self.files.iter().filter(|f| !f.is_valid()).count(),
            errors: self.structural_errors.len(),
            warnings: 0,
        };
        for file in &self.files {
            summary.errors += file.result.errors().count();
            summary.warnings += file.result.warnings().count();
        }
        self.summary = summary;
        self.is_valid = summary.failed == 0 && self.structural_errors.is_empty();
    }

    /// Result of the file at `path`, if it was linted.
    pub fn file(&self, path: &Path) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_valid())
    }

    fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        match path.strip_prefix(&self.root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => path,
        }
    }
}

fn status(valid: bool) -> &'static str {
    if valid {
        "PASS"
    } else {
        "FAIL"
    }
}

impl fmt::Display for LintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linting {}", self.root.display())?;

        for file in &self.files {
            let result = &file.result;
            write!(
                f,
                "  {} {} [{}]",
                status(file.is_valid()),
                self.display_path(&file.path).display(),
                file.kind
            )?;
            if matches!(file.kind, FileKind::Context { .. }) {
                write!(f, " coverage {}", result.coverage_display())?;
            }
            writeln!(f)?;

            if matches!(file.kind, FileKind::Context { .. }) && !result.missing_fields.is_empty() {
                writeln!(f, "      missing: {}", result.missing_fields.join(", "))?;
            }
            if !result.unexpected_fields.is_empty() {
                writeln!(f, "      unexpected: {}", result.unexpected_fields.join(", "))?;
            }
            for (name, section) in &result.sections {
                write!(
                    f,
                    "      section {name}: {} {}",
                    status(section.is_valid),
                    ctxlint_core::result::format_percentage(section.coverage_percentage)
                )?;
                if !section.missing_fields.is_empty() {
                    write!(f, " (missing: {})", section.missing_fields.join(", "))?;
                }
                writeln!(f)?;
            }
            for bundle in &file.bundles {
                writeln!(
                    f,
                    "      bundle {}: {} resources",
                    bundle.name.as_deref().unwrap_or("<unnamed>"),
                    bundle.resources.len()
                )?;
            }
            for diagnostic in &result.diagnostics {
                writeln!(f, "      {diagnostic}")?;
            }
        }

        if !self.structural_errors.is_empty() {
            writeln!(f, "Run errors:")?;
            for diagnostic in &self.structural_errors {
                writeln!(f, "  {diagnostic}")?;
            }
        }
        if !self.skipped_directories.is_empty() {
            writeln!(f, "Skipped unreadable directories:")?;
            for dir in &self.skipped_directories {
                writeln!(f, "  {}", self.display_path(dir).display())?;
            }
        }
        if !self.ignored_directories.is_empty() {
            writeln!(f, "Ignored directories:")?;
            for dir in &self.ignored_directories {
                writeln!(f, "  {}", self.display_path(dir).display())?;
            }
        }
        if !self.ignored_files.is_empty() {
            writeln!(f, "Ignored files:")?;
            for file in &self.ignored_files {
                writeln!(f, "  {}", self.display_path(file).display())?;
            }
        }

        let s = &self.summary;
        write!(
            f,
            "Result: {} ({} files, {} failed, {} errors, {} warnings)",
            status(self.is_valid),
            s.files,
            s.failed,
            s.errors,
            s.warnings
        )
    }
}
