//! # Lint Command
//!
//! Arguments and handler behind `ctxlint [ROOT]`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::config::LintConfig;
use crate::lint::Linter;
use crate::report::LintReport;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, line-oriented report.
    #[default]
    Text,
    /// The full report as JSON.
    Json,
}

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Arguments for a lint run.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Directory to lint.
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Report output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute a lint run and print its report.
///
/// Returns exit code: 0 when the tree is valid, 1 when it is not.
/// Fatal and configuration errors are returned as `Err`.
pub fn run_lint(args: &LintArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = match config_path {
        Some(path) => LintConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => LintConfig::default(),
    };

    let mut linter = Linter::new(config);
    let report = linter
        .lint_directory(&args.root)
        .with_context(|| format!("lint of {} aborted", args.root.display()))?;

    println!("{}", render(&report, args.format)?);

    Ok(if report.is_valid { 0 } else { 1 })
}

/// Render `report` in the requested format.
pub fn render(report: &LintReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).context("failed to serialize report"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(root: &Path) -> LintArgs {
        LintArgs {
            root: root.to_path_buf(),
            format: OutputFormat::Text,
        }
    }

    fn relaxed_config(dir: &Path) -> PathBuf {
        let path = dir.join("ctxlint.yaml");
        fs::write(&path, "require_docs_file: false\n").unwrap();
        path
    }

    #[test]
    fn exit_codes() {
        let config_dir = tempfile::tempdir().unwrap();
        let config = relaxed_config(config_dir.path());

        let good = tempfile::tempdir().unwrap();
        fs::write(good.path().join(".context.yaml"), "module-name: m\nversion: '1'\ndescription: d\n").unwrap();
        assert_eq!(run_lint(&args(good.path()), Some(&config)).unwrap(), 0);

        let bad = tempfile::tempdir().unwrap();
        fs::write(bad.path().join(".context.yaml"), "module-name: m\n").unwrap();
        assert_eq!(run_lint(&args(bad.path()), Some(&config)).unwrap(), 1);

        assert!(run_lint(&args(&bad.path().join("missing")), Some(&config)).is_err());
    }

    #[test]
    fn bad_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("ctxlint.yaml");
        fs::write(&config, "min_coverage: 500\n").unwrap();
        let err = run_lint(&args(dir.path()), Some(&config)).unwrap_err();
        assert!(format!("{err:#}").contains("min_coverage"));
    }

    #[test]
    fn log_format_values() {
        assert_eq!(LogFormat::from_str("json", true).unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);
        assert!(LogFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn json_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let mut linter = Linter::new(LintConfig {
            require_docs_file: false,
            ..LintConfig::default()
        });
        let report = linter.lint_directory(dir.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["is_valid"], true);
        assert_eq!(json["summary"]["files"], 0);
    }
}
