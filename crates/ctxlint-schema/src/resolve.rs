//! # Cross-Reference Resolution
//!
//! Two schema fields point at other artifacts:
//!
//! | Field | Entry must be |
//! |-------|---------------|
//! | `related-modules` | a directory, relative to the context file, holding a context file |
//! | `diagrams` | an `http`/`https` URL, or an existing file with an allow-listed extension |
//!
//! URLs are checked for shape only. Filesystem lookups are memoized per
//! resolved path in two separate caches that live for one lint run.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ctxlint_core::schema::{is_context_file_name, DIAGRAM_EXTENSIONS};
use ctxlint_core::ReferenceKind;
use url::Url;

/// Why a cross-reference entry did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// Not a directory, or a directory without any context file.
    NotAModule(PathBuf),
    /// A URL with a scheme other than `http`/`https`.
    UnsupportedScheme(String),
    /// Extension missing or not in the diagram allow-list.
    UnsupportedExtension(PathBuf),
    /// No such file.
    MissingFile(PathBuf),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAModule(path) => write!(
                f,
                "{} is not a directory containing a context file",
                path.display()
            ),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "URL scheme '{scheme}' is not supported (use http or https)")
            }
            Self::UnsupportedExtension(path) => write!(
                f,
                "{} does not have a diagram extension ({})",
                path.display(),
                DIAGRAM_EXTENSIONS.join(", ")
            ),
            Self::MissingFile(path) => write!(f, "{} does not exist", path.display()),
        }
    }
}

/// Memoizing resolver for `related-modules` and `diagrams` entries.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    modules: HashMap<PathBuf, bool>,
    diagrams: HashMap<PathBuf, bool>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one entry of a cross-reference list declared in a file
    /// living in `base_dir`.
    pub fn resolve(&mut self, kind: ReferenceKind, entry: &str, base_dir: &Path) -> Result<(), Unresolved> {
        match kind {
            ReferenceKind::Module => {
                let path = base_dir.join(entry);
                if self.is_module(&path) {
                    Ok(())
                } else {
                    Err(Unresolved::NotAModule(path))
                }
            }
            ReferenceKind::Diagram => self.resolve_diagram(entry, base_dir),
        }
    }

    fn resolve_diagram(&mut self, entry: &str, base_dir: &Path) -> Result<(), Unresolved> {
        if let Ok(url) = Url::parse(entry) {
            // Single-letter schemes are drive prefixes, not URLs.
            if url.scheme().len() > 1 {
                return match url.scheme() {
                    "http" | "https" => Ok(()),
                    other => Err(Unresolved::UnsupportedScheme(other.to_string())),
                };
            }
        }

        let path = base_dir.join(entry);
        let allowed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DIAGRAM_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if !allowed {
            return Err(Unresolved::UnsupportedExtension(path));
        }
        if self.is_diagram_file(&path) {
            Ok(())
        } else {
            Err(Unresolved::MissingFile(path))
        }
    }

    fn is_module(&mut self, path: &Path) -> bool {
        if let Some(&hit) = self.modules.get(path) {
            return hit;
        }
        let found = directory_has_context_file(path);
        tracing::trace!(path = %path.display(), found, "resolved module reference");
        self.modules.insert(path.to_path_buf(), found);
        found
    }

    fn is_diagram_file(&mut self, path: &Path) -> bool {
        if let Some(&hit) = self.diagrams.get(path) {
            return hit;
        }
        let found = path.is_file();
        tracing::trace!(path = %path.display(), found, "resolved diagram reference");
        self.diagrams.insert(path.to_path_buf(), found);
        found
    }

    /// Memoized lookups, both caches.
    pub fn cached_entries(&self) -> usize {
        self.modules.len() + self.diagrams.len()
    }

    pub fn clear_cache(&mut self) {
        self.modules.clear();
        self.diagrams.clear();
    }
}

fn directory_has_context_file(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry.file_type().is_ok_and(|t| t.is_file())
            && entry.file_name().to_str().is_some_and(is_context_file_name)
    })
}
