//! Lint run configuration.
//!
//! Every setting has a default, so the file is optional and may name only
//! the keys it changes:
//!
//! ```yaml
//! min_coverage: 80
//! report_ignored: true
//! ```

use std::path::{Path, PathBuf};

use ctxlint_schema::CoveragePolicy;
use serde::{Deserialize, Serialize};

/// Settings for one lint run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Minimum coverage percentage per scope. `None` keeps coverage advisory.
    pub min_coverage: Option<f64>,
    /// Fail the run when the working-directory root has no `.contextdocs.md`.
    pub require_docs_file: bool,
    /// List ignored files and directories in the report.
    pub report_ignored: bool,
    /// Warn when a markdown body lacks one of the conventional `##` sections.
    pub check_body_sections: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            min_coverage: None,
            require_docs_file: true,
            report_ignored: false,
            check_body_sections: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("min_coverage must be between 0 and 100, got {0}")]
    InvalidMinCoverage(f64),
}

impl LintConfig {
    /// Parse and validate YAML configuration text. Empty text yields the
    /// defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded lint configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.min_coverage {
            Some(min) if !(0.0..=100.0).contains(&min) => Err(ConfigError::InvalidMinCoverage(min)),
            _ => Ok(()),
        }
    }

    pub fn coverage_policy(&self) -> CoveragePolicy {
        match self.min_coverage {
            Some(min) => CoveragePolicy::Minimum(min),
            None => CoveragePolicy::Advisory,
        }
    }
}
