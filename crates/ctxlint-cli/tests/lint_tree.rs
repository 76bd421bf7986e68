//! Integration tests: full lint runs over temporary directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use ctxlint_cli::{FileKind, LintConfig, LintReport, Linter};
use ctxlint_core::DiagnosticKind;

const VALID_YAML: &str = "module-name: m\nversion: '1'\ndescription: d\n";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn lint(root: &Path, config: LintConfig) -> LintReport {
    Linter::new(config).lint_directory(root).unwrap()
}

fn relaxed() -> LintConfig {
    LintConfig {
        require_docs_file: false,
        ..LintConfig::default()
    }
}

fn context_paths(report: &LintReport) -> Vec<PathBuf> {
    report
        .files
        .iter()
        .filter(|f| matches!(f.kind, FileKind::Context { .. }))
        .map(|f| f.path.clone())
        .collect()
}

#[test]
fn test_scenario_log_and_build_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".contextignore"), "*.log\n/build\n");
    write(&root.join("app.log"), "");
    write(&root.join("build/main.js"), "");
    write(&root.join("build/.context.yaml"), "broken: [\n");
    write(&root.join("src.js"), "");

    let config = LintConfig {
        report_ignored: true,
        ..relaxed()
    };
    let report = lint(root, config);

    assert!(report.is_valid, "{report}");
    assert!(context_paths(&report).is_empty());
    assert_eq!(report.ignored_directories, vec![root.join("build")]);
    assert_eq!(
        report.ignored_files,
        vec![
            root.join("app.log"),
            root.join("build/.context.yaml"),
            root.join("build/main.js"),
        ]
    );
}

#[test]
fn test_scenario_frontmatter_with_only_module_name() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".context.md"), "---\nmodule-name: X\n---\n# X\n");

    let report = lint(root, relaxed());
    assert!(!report.is_valid);
    let file = report.file(&root.join(".context.md")).unwrap();
    let schema_errors: Vec<_> = file
        .result
        .errors()
        .filter(|d| d.kind == DiagnosticKind::Schema)
        .collect();
    assert_eq!(schema_errors.len(), 2);
    assert!(file.result.coverage_percentage < 100.0);
}

#[test]
fn test_scenario_critical_file_pattern_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".contextignore"), ".context.md\n");
    write(&root.join("sub/.context.md"), "---\nmodule-name: X\n---\n# X\n");

    let report = lint(root, relaxed());
    assert!(!report.is_valid);

    let ignore = report.file(&root.join(".contextignore")).unwrap();
    assert!(!ignore.is_valid());
    assert!(matches!(ignore.kind, FileKind::Ignore { rule_count: 0 }));
    assert!(ignore.result.diagnostics[0].message.contains("critical file"));

    // The rejected pattern is not honoured: the nested file is still linted.
    assert!(report.file(&root.join("sub/.context.md")).is_some());
}

#[test]
fn test_scenario_json_string_for_list() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("api/.context.json"),
        r#"{"moduleName": "api", "version": "1", "description": "d", "mainTechnologies": "a,b"}"#,
    );

    let report = lint(root, relaxed());
    assert!(!report.is_valid);
    let file = report.file(&root.join("api/.context.json")).unwrap();
    let error = file.result.errors().next().unwrap();
    assert_eq!(error.kind, DiagnosticKind::Schema);
    assert!(error.message.contains("main-technologies"));
    assert!(error.message.contains("must be a list"));
}

#[test]
fn test_nearest_ignore_file_scopes_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".contextignore"), "legacy\n");
    write(&root.join("pkg/.contextignore"), "generated\n");
    write(&root.join("legacy/.context.yaml"), "broken: [\n");
    write(&root.join("pkg/legacy/.context.yaml"), VALID_YAML);
    write(&root.join("pkg/generated/.context.yaml"), "broken: [\n");

    let report = lint(root, relaxed());
    assert!(report.is_valid, "{report}");
    // Under pkg/, only pkg/.contextignore applies, so pkg/legacy is linted.
    assert_eq!(context_paths(&report), vec![root.join("pkg/legacy/.context.yaml")]);
    let ignore_files = report
        .files
        .iter()
        .filter(|f| matches!(f.kind, FileKind::Ignore { .. }))
        .count();
    assert_eq!(ignore_files, 2);
}

#[test]
fn test_negation_reincludes_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".contextignore"), "gen-*\n!gen-keep\n");
    write(&root.join("gen-drop/.context.yml"), "broken: [\n");
    write(&root.join("gen-keep/.context.yml"), VALID_YAML);

    let report = lint(root, relaxed());
    assert!(report.is_valid, "{report}");
    assert_eq!(context_paths(&report), vec![root.join("gen-keep/.context.yml")]);
}

#[test]
fn test_critical_suffix_pattern_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".contextignore"), "*.context.yml\n");
    write(&root.join("sub/a.context.yml"), VALID_YAML);

    let report = lint(root, relaxed());
    assert!(!report.is_valid);
    assert_eq!(context_paths(&report), vec![root.join("sub/a.context.yml")]);
}

#[test]
fn test_full_coverage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("ledger/.context.yaml"), VALID_YAML);
    write(&root.join("docs/flow.svg"), "<svg/>");
    write(
        &root.join(".context.yaml"),
        "\
module-name: payments
version: 1.0.0
description: Payments.
related-modules: [ledger]
diagrams: [docs/flow.svg, 'https://example.com/seq.png']
main-technologies: [rust]
conventions: [kebab-case keys]
directives: [no panics]
architecture:
  style: layered
  components: [api]
  data-flow: [api -> ledger]
development:
  setup-steps: [make setup]
  build-command: make
  test-command: make test
business-requirements:
  key-features: [cards]
  target-audience: merchants
  success-metrics: [uptime]
quality-assurance:
  testing-frameworks: [proptest]
  coverage-threshold: 80%
  performance-benchmarks: [p99 < 50ms]
deployment:
  platform: k8s
  cicd-pipeline: github actions
  staging-environment: staging
  production-environment: production
",
    );

    let report = lint(root, relaxed());
    assert!(report.is_valid, "{report}");
    let file = report.file(&root.join(".context.yaml")).unwrap();
    assert_eq!(file.result.coverage_percentage, 100.0);
    assert!(file.result.diagnostics.is_empty());
    assert_eq!(file.result.sections.len(), 5);
    assert_eq!(report.root_files, vec![root.join(".context.yaml")]);
}

#[test]
fn test_missing_docs_file_at_working_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".context.yaml"), VALID_YAML);

    let report = Linter::new(LintConfig::default())
        .with_working_dir(root)
        .lint_directory(root)
        .unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.structural_errors[0].kind, DiagnosticKind::Structural);
    assert!(report.failed_files().next().is_none());

    write(
        &root.join(".contextdocs.md"),
        "---\ncontextdocs:\n  - name: Rust\n    relationship: language\n    resources:\n      - Book: https://doc.rust-lang.org/book/\n---\n# Docs\n",
    );
    let report = Linter::new(LintConfig::default())
        .with_working_dir(root)
        .lint_directory(root)
        .unwrap();
    assert!(report.is_valid, "{report}");
    let docs = report.file(&root.join(".contextdocs.md")).unwrap();
    assert_eq!(docs.bundles.len(), 1);
}

#[test]
fn test_parse_failure_does_not_abort_walk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/.context.json"), "{ not json");
    write(&root.join("b/.context.yaml"), VALID_YAML);

    let report = lint(root, relaxed());
    assert!(!report.is_valid);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.summary.failed, 1);
    let failed = report.failed_files().next().unwrap();
    assert_eq!(failed.path, root.join("a/.context.json"));
    assert_eq!(failed.result.diagnostics[0].kind, DiagnosticKind::Syntax);
}

#[test]
fn test_minimum_coverage_policy_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join(".context.yaml"), VALID_YAML);

    let config = LintConfig {
        min_coverage: Some(50.0),
        ..relaxed()
    };
    assert!(!lint(root, config).is_valid);
    assert!(lint(root, relaxed()).is_valid);
}

#[test]
fn test_full_minimum_coverage_without_sections() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("ledger/.context.yaml"), VALID_YAML);
    write(&root.join("docs/flow.mmd"), "graph TD");
    write(
        &root.join(".context.yaml"),
        "\
module-name: payments
version: 1.0.0
description: Payments.
related-modules: [ledger]
diagrams: [docs/flow.mmd]
main-technologies: [rust]
conventions: [kebab-case keys]
directives: [no panics]
",
    );

    let config = LintConfig {
        min_coverage: Some(100.0),
        ..relaxed()
    };
    let report = lint(root, config);
    let file = report.file(&root.join(".context.yaml")).unwrap();
    assert!(file.is_valid(), "{report}");
    assert!(file.result.sections.is_empty());
    // ledger/.context.yaml carries only the required fields.
    assert!(!report.file(&root.join("ledger/.context.yaml")).unwrap().is_valid());
}
