//! # Ignore Registry
//!
//! Caches one [`CompiledMatcher`] per directory holding a `.contextignore`
//! and resolves the nearest one for any path under the run root.
//!
//! The registry is owned by whoever drives a lint run. It is filled while
//! the tree is walked and must be emptied with
//! [`IgnoreRegistry::clear_cache`] when the run ends, so rules from one
//! tree never leak into a later, unrelated run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ctxlint_core::schema::IGNORE_FILE_NAME;
use ctxlint_core::Diagnostic;

use crate::matcher::CompiledMatcher;
use crate::rule::PatternViolation;

/// What happened when one ignore file was loaded.
#[derive(Debug, Clone)]
pub struct IgnoreFileOutcome {
    pub path: PathBuf,
    /// Rules that compiled and are being honoured.
    pub rule_count: usize,
    /// Rejected lines. These are never honoured.
    pub violations: Vec<PatternViolation>,
    /// Redundant lines.
    pub warnings: Vec<PatternViolation>,
    /// Set when the file exists but could not be read.
    pub read_error: Option<String>,
}

impl IgnoreFileOutcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty() && self.read_error.is_none()
    }

    /// Violations and warnings as report diagnostics, in line order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all: Vec<&PatternViolation> =
            self.violations.iter().chain(self.warnings.iter()).collect();
        all.sort_by_key(|v| v.line);
        let mut diagnostics: Vec<Diagnostic> = all.into_iter().map(PatternViolation::to_diagnostic).collect();
        if let Some(reason) = &self.read_error {
            diagnostics.insert(0, Diagnostic::structural(format!("cannot read ignore file: {reason}")));
        }
        diagnostics
    }
}

/// Directory → compiled ignore rules, for one run.
#[derive(Debug, Default)]
pub struct IgnoreRegistry {
    /// `None` records "this directory has no usable ignore file".
    matchers: HashMap<PathBuf, Option<CompiledMatcher>>,
}

impl IgnoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `dir`'s ignore file if it has one and it is not cached yet.
    ///
    /// Returns the outcome only the first time a file is compiled, so a
    /// caller that loads every directory it enters reports each ignore
    /// file exactly once. Lines that fail to compile are dropped; the rest
    /// of the file stays in force.
    pub fn load(&mut self, dir: &Path) -> Option<IgnoreFileOutcome> {
        if self.matchers.contains_key(dir) {
            return None;
        }
        let path = dir.join(IGNORE_FILE_NAME);
        if !path.is_file() {
            self.matchers.insert(dir.to_path_buf(), None);
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read ignore file");
                self.matchers.insert(dir.to_path_buf(), None);
                return Some(IgnoreFileOutcome {
                    path,
                    rule_count: 0,
                    violations: Vec::new(),
                    warnings: Vec::new(),
                    read_error: Some(e.to_string()),
                });
            }
        };

        let (matcher, violations) = CompiledMatcher::compile_lenient(&content, dir);
        if violations.is_empty() {
            tracing::debug!(path = %path.display(), rules = matcher.len(), "compiled ignore rules");
        } else {
            tracing::warn!(
                path = %path.display(),
                rejected = violations.len(),
                honoured = matcher.len(),
                "ignore file has invalid patterns"
            );
        }

        let outcome = IgnoreFileOutcome {
            path,
            rule_count: matcher.len(),
            violations,
            warnings: matcher.warnings().to_vec(),
            read_error: None,
        };
        self.matchers.insert(dir.to_path_buf(), Some(matcher));
        Some(outcome)
    }

    /// Cached matcher of exactly `dir`, without loading.
    pub fn matcher(&self, dir: &Path) -> Option<&CompiledMatcher> {
        self.matchers.get(dir).and_then(Option::as_ref)
    }

    /// Nearest matcher at or above `dir`, searching no higher than `root`.
    pub fn nearest(&mut self, dir: &Path, root: &Path) -> Option<&CompiledMatcher> {
        let scope = self.nearest_scope(dir, root)?;
        self.matcher(&scope)
    }

    fn nearest_scope(&mut self, start: &Path, root: &Path) -> Option<PathBuf> {
        if !start.starts_with(root) {
            return None;
        }
        let mut dir = start;
        loop {
            self.load(dir);
            if self.matcher(dir).is_some() {
                return Some(dir.to_path_buf());
            }
            if dir == root {
                return None;
            }
            dir = dir.parent()?;
        }
    }

    /// Whether `path` (a file or directory under `root`) is excluded.
    ///
    /// Only the ignore file nearest to the path's parent directory is
    /// consulted. With no ignore file in scope nothing is ignored.
    pub fn is_ignored(&mut self, path: &Path, root: &Path) -> bool {
        if path == root || !path.starts_with(root) {
            return false;
        }
        let Some(parent) = path.parent() else {
            return false;
        };
        let is_dir = path.is_dir();
        let Some(matcher) = self.nearest(parent, root) else {
            return false;
        };
        match path.strip_prefix(matcher.scope()) {
            Ok(relative) => matcher.ignores_path(relative, is_dir),
            Err(_) => false,
        }
    }

    /// Every file under `root` that is ignored, sorted. Reporting only.
    pub fn ignored_files(&mut self, root: &Path) -> Vec<PathBuf> {
        let (files, _) = enumerate(root);
        files.into_iter().filter(|p| self.is_ignored(p, root)).collect()
    }

    /// Every directory under `root` that is ignored, sorted. Reporting only.
    pub fn ignored_directories(&mut self, root: &Path) -> Vec<PathBuf> {
        let (_, dirs) = enumerate(root);
        dirs.into_iter().filter(|p| self.is_ignored(p, root)).collect()
    }

    /// Number of directories examined so far, with or without rules.
    pub fn cached_scopes(&self) -> usize {
        self.matchers.len()
    }

    /// Drop every compiled matcher.
    pub fn clear_cache(&mut self) {
        tracing::trace!(scopes = self.matchers.len(), "clearing ignore matcher cache");
        self.matchers.clear();
    }
}

/// Full recursive listing of files and directories under `root`, sorted.
fn enumerate(root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    enumerate_inner(root, &mut files, &mut dirs);
    files.sort();
    dirs.sort();
    (files, dirs)
}

fn enumerate_inner(dir: &Path, files: &mut Vec<PathBuf>, dirs: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory during enumeration");
            return;
        }
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            dirs.push(path.clone());
            enumerate_inner(&path, files, dirs);
        } else if file_type.is_file() {
            files.push(path);
        }
    }
}
