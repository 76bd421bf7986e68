//! # Directory Linter
//!
//! [`Linter`] drives one lint run over a directory tree as a small state
//! machine:
//!
//! ```text
//! Init → LoadIgnoreRules → LintRootFile → LintDocsFile → WalkTree → Report → Done
//!   └──────────────────────── (root unreadable) ──────────────────────────→ Failed
//! ```
//!
//! | State | Work |
//! |-------|------|
//! | `LoadIgnoreRules` | compile the root `.contextignore`, if any |
//! | `LintRootFile` | lint the root's default-named context files, ignore rules notwithstanding |
//! | `LintDocsFile` | lint `.contextdocs.md`, or flag its absence at the working root |
//! | `WalkTree` | depth-first, sorted walk; prune ignored directories; lint context files |
//! | `Report` | collect ignored paths (if configured) and compute the verdict |
//!
//! Execution is sequential. A directory's ignore file is compiled when the
//! walk enters it, after its parent's, so nearest-ancestor scoping always
//! sees a settled cache.
//!
//! Per-file problems never abort the walk. Only an unreadable root is
//! fatal. Both caches are cleared when the run ends, whether it succeeded
//! or failed.

use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use ctxlint_core::schema::{DOCS_FILE_NAME, ROOT_CONTEXT_FILES};
use ctxlint_core::{Diagnostic, LintError, ValidationResult};
use ctxlint_ignore::{IgnoreFileOutcome, IgnoreRegistry};
use ctxlint_schema::{lint_docs, ContextFormat, ContextValidator};
use serde::Serialize;

use crate::config::LintConfig;
use crate::report::{FileKind, FileReport, LintReport};

/// Phase of a lint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintState {
    Init,
    LoadIgnoreRules,
    LintRootFile,
    LintDocsFile,
    WalkTree,
    Report,
    /// Terminal: the report was produced.
    Done,
    /// Terminal: the root could not be read.
    Failed,
}

impl LintState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Orchestrates lint runs. Owns the ignore-rule and validator caches.
#[derive(Debug)]
pub struct Linter {
    config: LintConfig,
    ignore: IgnoreRegistry,
    validator: ContextValidator,
    working_dir: Option<PathBuf>,
    state: LintState,
}

impl Linter {
    pub fn new(config: LintConfig) -> Self {
        let validator = ContextValidator::new()
            .with_policy(config.coverage_policy())
            .with_body_sections(config.check_body_sections);
        Self {
            config,
            ignore: IgnoreRegistry::new(),
            validator,
            working_dir: None,
            state: LintState::Init,
        }
    }

    /// Directory treated as the working-directory root when deciding
    /// whether `.contextdocs.md` is mandatory. Defaults to the process's
    /// current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// State after the most recent transition.
    pub fn state(&self) -> LintState {
        self.state
    }

    /// Lint the tree under `root`.
    ///
    /// # Errors
    ///
    /// [`LintError::Fatal`] when `root` cannot be read and
    /// [`LintError::NotADirectory`] when it is not a directory. No partial
    /// report is produced in either case.
    pub fn lint_directory(&mut self, root: &Path) -> Result<LintReport, LintError> {
        self.state = LintState::Init;
        tracing::info!(root = %root.display(), "starting lint run");

        let outcome = self.run(root);

        self.ignore.clear_cache();
        self.validator.clear_cache();
        match &outcome {
            Ok(report) => {
                self.transition(LintState::Done);
                tracing::info!(
                    files = report.summary.files,
                    failed = report.summary.failed,
                    valid = report.is_valid,
                    "lint run finished"
                );
            }
            Err(e) => {
                self.transition(LintState::Failed);
                tracing::error!(error = %e, "lint run aborted");
            }
        }
        outcome
    }

    fn transition(&mut self, next: LintState) {
        tracing::debug!(from = ?self.state, to = ?next, "lint state transition");
        self.state = next;
    }

    fn run(&mut self, root: &Path) -> Result<LintReport, LintError> {
        let metadata = fs::metadata(root).map_err(|source| LintError::Fatal {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(LintError::NotADirectory(root.to_path_buf()));
        }
        let entries = read_sorted(root).map_err(|source| LintError::Fatal {
            path: root.to_path_buf(),
            source,
        })?;

        let mut report = LintReport::new(root);

        self.transition(LintState::LoadIgnoreRules);
        if let Some(outcome) = self.ignore.load(root) {
            report.files.push(ignore_file_report(outcome));
        }

        self.transition(LintState::LintRootFile);
        for name in ROOT_CONTEXT_FILES {
            let path = root.join(name);
            if !path.is_file() {
                continue;
            }
            if let Some(format) = ContextFormat::from_file_name(name) {
                report.files.push(self.lint_context_file(&path, format));
                report.root_files.push(path);
            }
        }

        self.transition(LintState::LintDocsFile);
        let docs = root.join(DOCS_FILE_NAME);
        if docs.is_file() {
            report.files.push(lint_docs_file(&docs));
        } else if self.config.require_docs_file && self.is_working_root(root) {
            tracing::warn!(root = %root.display(), "docs file missing at working root");
            report.structural_errors.push(Diagnostic::structural(format!(
                "{DOCS_FILE_NAME} is required at the working-directory root {}",
                root.display()
            )));
        }

        self.transition(LintState::WalkTree);
        self.walk(root, root, entries, &mut report);

        self.transition(LintState::Report);
        if self.config.report_ignored {
            report.ignored_files = self.ignore.ignored_files(root);
            report.ignored_directories = self.ignore.ignored_directories(root);
        }
        report.finish();
        Ok(report)
    }

    fn walk(&mut self, dir: &Path, root: &Path, entries: Vec<(PathBuf, FileType)>, report: &mut LintReport) {
        for (path, file_type) in entries {
            let (is_dir, is_file) = resolve_type(&path, file_type);

            if is_dir {
                if self.ignore.is_ignored(&path, root) {
                    tracing::debug!(dir = %path.display(), "pruned ignored directory");
                    continue;
                }
                let children = match read_sorted(&path) {
                    Ok(children) => children,
                    Err(e) => {
                        tracing::warn!(dir = %path.display(), error = %e, "skipping unreadable directory");
                        report.skipped_directories.push(path);
                        continue;
                    }
                };
                if let Some(outcome) = self.ignore.load(&path) {
                    report.files.push(ignore_file_report(outcome));
                }
                self.walk(&path, root, children, report);
            } else if is_file {
                let Some(format) = ContextFormat::from_path(&path) else {
                    continue;
                };
                if dir == root && report.root_files.contains(&path) {
                    continue;
                }
                if self.ignore.is_ignored(&path, root) {
                    tracing::debug!(path = %path.display(), "skipped ignored context file");
                    continue;
                }
                report.files.push(self.lint_context_file(&path, format));
            }
        }
    }

    fn lint_context_file(&mut self, path: &Path, format: ContextFormat) -> FileReport {
        tracing::info!(path = %path.display(), %format, "linting context file");
        let result = self.validator.validate_file(path);
        if !result.is_valid {
            tracing::warn!(
                path = %path.display(),
                errors = result.errors().count(),
                "context file failed validation"
            );
        }
        FileReport {
            path: path.to_path_buf(),
            kind: FileKind::Context { format },
            result,
            bundles: Vec::new(),
        }
    }

    fn is_working_root(&self, root: &Path) -> bool {
        let working = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => match std::env::current_dir() {
                Ok(dir) => dir,
                Err(_) => return false,
            },
        };
        match (fs::canonicalize(root), fs::canonicalize(&working)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

fn lint_docs_file(path: &Path) -> FileReport {
    tracing::info!(path = %path.display(), "linting docs file");
    let (result, bundles) = match fs::read_to_string(path) {
        Ok(content) => {
            let docs = lint_docs(&content);
            (docs.result, docs.bundles)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read docs file");
            (
                ValidationResult::unscored(vec![Diagnostic::structural(format!("cannot read file: {e}"))]),
                Vec::new(),
            )
        }
    };
    FileReport {
        path: path.to_path_buf(),
        kind: FileKind::Docs,
        result,
        bundles,
    }
}

fn ignore_file_report(outcome: IgnoreFileOutcome) -> FileReport {
    FileReport {
        result: ValidationResult::unscored(outcome.diagnostics()),
        kind: FileKind::Ignore {
            rule_count: outcome.rule_count,
        },
        path: outcome.path,
        bundles: Vec::new(),
    }
}

/// Directory entries sorted by file name.
fn read_sorted(dir: &Path) -> std::io::Result<Vec<(PathBuf, FileType)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        entries.push((entry.path(), entry.file_type()?));
    }
    entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(entries)
}

/// Symlinks to files are linted; symlinks to directories are not followed.
fn resolve_type(path: &Path, file_type: FileType) -> (bool, bool) {
    if file_type.is_symlink() {
        let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        return (false, is_file);
    }
    (file_type.is_dir(), file_type.is_file())
}
