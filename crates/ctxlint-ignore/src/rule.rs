//! # Ignore Rules
//!
//! One [`IgnoreRule`] per pattern line. Parsing runs every per-line check
//! and reports all of them, so a single compile shows the author every
//! problem in the file at once.

use std::fmt;

use ctxlint_core::schema::CRITICAL_FILE_NAMES;
use ctxlint_core::{Diagnostic, DiagnosticKind, Position};
use globset::{GlobBuilder, GlobMatcher};

/// Why a pattern line was rejected or flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    /// The pattern contains a `**` run.
    DoubleStar,
    /// The pattern would exclude one of the convention's marker files.
    CriticalFile(&'static str),
    /// A character outside the accepted pattern alphabet.
    InvalidCharacter(char),
    /// Nothing left to match after stripping `!` and slashes.
    EmptyPattern,
    /// The glob itself is malformed (e.g. an unclosed `[`).
    InvalidGlob(String),
    /// `P` and `!P` both appear in the same file.
    Conflict { other: String, other_line: usize },
    /// The same pattern appears twice. Advisory only.
    Redundant { first_line: usize },
}

/// A problem with one line of an ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternViolation {
    /// 1-based line in the ignore file.
    pub line: usize,
    pub pattern: String,
    pub reason: ViolationReason,
}

impl PatternViolation {
    pub fn new(line: usize, pattern: &str, reason: ViolationReason) -> Self {
        Self {
            line,
            pattern: pattern.to_string(),
            reason,
        }
    }

    /// Redundant patterns are warnings; everything else fails the file.
    pub fn is_error(&self) -> bool {
        !matches!(self.reason, ViolationReason::Redundant { .. })
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let kind = if self.is_error() {
            DiagnosticKind::Syntax
        } else {
            DiagnosticKind::Warning
        };
        Diagnostic::new(kind, format!("`{}`: {}", self.pattern, self.reason))
            .at(Position::new(self.line, 1))
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleStar => f.write_str("`**` is not supported; use single-level `*`"),
            Self::CriticalFile(name) => write!(f, "cannot ignore critical file '{name}'"),
            Self::InvalidCharacter(ch) => write!(f, "invalid character '{ch}' in pattern"),
            Self::EmptyPattern => f.write_str("pattern is empty"),
            Self::InvalidGlob(reason) => write!(f, "invalid pattern: {reason}"),
            Self::Conflict { other, other_line } => {
                write!(f, "conflicts with `{other}` on line {other_line}")
            }
            Self::Redundant { first_line } => {
                write!(f, "redundant pattern, already given on line {first_line}")
            }
        }
    }
}

impl fmt::Display for PatternViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: `{}`: {}", self.line, self.pattern, self.reason)
    }
}

/// One compiled pattern.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    raw: String,
    line: usize,
    negated: bool,
    anchored: bool,
    dir_only: bool,
    glob: GlobMatcher,
}

impl IgnoreRule {
    /// Parse and compile one trimmed, non-comment pattern line.
    ///
    /// Returns every violation found on the line, not just the first.
    pub fn parse(line: usize, raw: &str) -> Result<Self, Vec<PatternViolation>> {
        let mut violations = Vec::new();
        let reject = |reason| PatternViolation::new(line, raw, reason);

        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        if body.contains("**") {
            violations.push(reject(ViolationReason::DoubleStar));
        }

        if let Some(name) = CRITICAL_FILE_NAMES
            .iter()
            .copied()
            .find(|name| raw.ends_with(name) || raw.contains(&format!("/{name}")))
        {
            violations.push(reject(ViolationReason::CriticalFile(name)));
        }

        if let Some(ch) = first_invalid_char(body) {
            violations.push(reject(ViolationReason::InvalidCharacter(ch)));
        }

        let dir_only = body.ends_with('/');
        let stripped = body.trim_end_matches('/');
        let anchored = stripped.contains('/');
        let glob_body = stripped.trim_start_matches('/');

        if glob_body.is_empty() {
            violations.push(reject(ViolationReason::EmptyPattern));
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let glob = GlobBuilder::new(glob_body)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|e| vec![reject(ViolationReason::InvalidGlob(e.kind().to_string()))])?
            .compile_matcher();

        Ok(Self {
            raw: raw.to_string(),
            line,
            negated,
            anchored,
            dir_only,
            glob,
        })
    }

    /// Pattern text as written, including any `!`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn anchored(&self) -> bool {
        self.anchored
    }

    pub fn dir_only(&self) -> bool {
        self.dir_only
    }

    /// Whether this rule's pattern (ignoring negation) selects `components`.
    ///
    /// A rule selects a path when it selects the path itself or any of its
    /// ancestor directories. Ancestors are always directories; the path
    /// itself is one only when `is_dir` is set.
    pub fn matches(&self, components: &[&str], is_dir: bool) -> bool {
        (0..components.len()).any(|i| {
            let prefix_is_dir = i + 1 < components.len() || is_dir;
            if self.dir_only && !prefix_is_dir {
                return false;
            }
            if self.anchored {
                self.glob.is_match(components[..=i].join("/"))
            } else {
                self.glob.is_match(components[i])
            }
        })
    }
}

/// First character outside `[A-Za-z0-9_./*?\[\]-]`, allowing `!` only as
/// the negation marker of a bracket class (`[!a]`).
fn first_invalid_char(body: &str) -> Option<char> {
    let mut previous = None;
    for ch in body.chars() {
        let ok = ch.is_ascii_alphanumeric()
            || matches!(ch, '_' | '-' | '.' | '/' | '*' | '?' | '[' | ']')
            || (ch == '!' && previous == Some('['));
        if !ok {
            return Some(ch);
        }
        previous = Some(ch);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(raw: &str) -> IgnoreRule {
        IgnoreRule::parse(1, raw).unwrap()
    }

    fn reasons(raw: &str) -> Vec<ViolationReason> {
        IgnoreRule::parse(7, raw)
            .unwrap_err()
            .into_iter()
            .map(|v| v.reason)
            .collect()
    }

    fn split(path: &str) -> Vec<&str> {
        path.split('/').collect()
    }

    #[test]
    fn parses_flags() {
        let r = rule("!/build/");
        assert!(r.negated());
        assert!(r.anchored());
        assert!(r.dir_only());
        assert_eq!(r.raw(), "!/build/");

        let r = rule("*.log");
        assert!(!r.negated());
        assert!(!r.anchored());
        assert!(!r.dir_only());
    }

    #[test]
    fn rejects_double_star() {
        assert_eq!(reasons("**/*.log"), vec![ViolationReason::DoubleStar]);
        assert_eq!(reasons("src/**"), vec![ViolationReason::DoubleStar]);
    }

    #[test]
    fn rejects_critical_files() {
        assert_eq!(
            reasons(".context.md"),
            vec![ViolationReason::CriticalFile(".context.md")]
        );
        assert_eq!(
            reasons("docs/.contextignore"),
            vec![ViolationReason::CriticalFile(".contextignore")]
        );
        assert_eq!(
            reasons("*.context.json"),
            vec![ViolationReason::CriticalFile(".context.json")]
        );
    }

    #[test]
    fn collects_all_violations_on_a_line() {
        let found = reasons("**/.context.md");
        assert!(found.contains(&ViolationReason::DoubleStar));
        assert!(found.contains(&ViolationReason::CriticalFile(".context.md")));
    }

    #[test]
    fn rejects_invalid_characters() {
        assert_eq!(reasons("foo bar"), vec![ViolationReason::InvalidCharacter(' ')]);
        assert_eq!(reasons("{a,b}"), vec![ViolationReason::InvalidCharacter('{')]);
    }

    #[test]
    fn rejects_empty_patterns() {
        assert_eq!(reasons("!"), vec![ViolationReason::EmptyPattern]);
        assert_eq!(reasons("/"), vec![ViolationReason::EmptyPattern]);
    }

    #[test]
    fn rejects_unclosed_bracket() {
        let found = reasons("file[ab");
        assert!(matches!(found.as_slice(), [ViolationReason::InvalidGlob(_)]));
    }

    #[test]
    fn bracket_negation_is_allowed() {
        let r = rule("[!a]*.tmp");
        assert!(r.matches(&split("b1.tmp"), false));
        assert!(!r.matches(&split("a1.tmp"), false));
    }

    #[test]
    fn unanchored_matches_any_component() {
        let r = rule("*.log");
        assert!(r.matches(&split("app.log"), false));
        assert!(r.matches(&split("deep/nested/app.log"), false));
        assert!(!r.matches(&split("app.log.txt"), false));
    }

    #[test]
    fn anchored_matches_from_scope_only() {
        let r = rule("/build");
        assert!(r.matches(&split("build"), true));
        assert!(r.matches(&split("build/main.js"), false));
        assert!(!r.matches(&split("src/build/main.js"), false));
    }

    #[test]
    fn interior_slash_anchors() {
        let r = rule("docs/*.md");
        assert!(r.matches(&split("docs/intro.md"), false));
        assert!(!r.matches(&split("other/docs/intro.md"), false));
        // Single-level wildcard does not cross separators.
        assert!(!r.matches(&split("docs/sub/intro.md"), false));
    }

    #[test]
    fn dir_only_requires_directory() {
        let r = rule("tmp/");
        assert!(r.matches(&split("tmp"), true));
        assert!(!r.matches(&split("tmp"), false));
        assert!(r.matches(&split("tmp/file.txt"), false));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let r = rule("v?.txt");
        assert!(r.matches(&split("v1.txt"), false));
        assert!(!r.matches(&split("v10.txt"), false));
    }

    #[test]
    fn violation_renders_line_and_reason() {
        let v = PatternViolation::new(3, "**/x", ViolationReason::DoubleStar);
        assert!(v.to_string().starts_with("line 3: `**/x`"));
        let d = v.to_diagnostic();
        assert!(d.is_error());
        assert_eq!(d.position, Some(Position::new(3, 1)));
    }

    #[test]
    fn redundant_is_a_warning() {
        let v = PatternViolation::new(4, "*.log", ViolationReason::Redundant { first_line: 1 });
        assert!(!v.is_error());
        assert!(!v.to_diagnostic().is_error());
    }
}
