//! # Frontmatter Splitting
//!
//! A markdown context file opens with a YAML block fenced by lines that
//! hold exactly `---`:
//!
//! ```text
//! ---
//! module-name: billing
//! ---
//! # Billing
//! ```
//!
//! Offsets are kept so decoder errors inside the block can be reported
//! against the whole file.

use crate::error::ParseError;

const DELIMITER: &str = "---";

/// The two halves of a markdown document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// Text between the delimiters.
    pub yaml: &'a str,
    /// Byte offset of `yaml` in the whole file.
    pub yaml_offset: usize,
    /// Everything after the closing delimiter.
    pub body: &'a str,
    /// 1-based line on which `body` starts.
    pub body_line: usize,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Split `content` into frontmatter and body.
///
/// # Errors
///
/// [`ParseError::Structural`] when the first line is not `---` or no
/// closing `---` line follows.
pub fn split_frontmatter(content: &str) -> Result<Frontmatter<'_>, ParseError> {
    let mut lines = content.split_inclusive('\n');
    let opening = lines.next().unwrap_or_default();
    if !is_delimiter(opening) {
        return Err(ParseError::Structural(
            "frontmatter is missing: the file must start with a `---` line".to_string(),
        ));
    }

    let yaml_offset = opening.len();
    let mut offset = yaml_offset;
    let mut line_no = 1;
    for line in lines {
        line_no += 1;
        if is_delimiter(line) {
            return Ok(Frontmatter {
                yaml: &content[yaml_offset..offset],
                yaml_offset,
                body: &content[offset + line.len()..],
                body_line: line_no + 1,
            });
        }
        offset += line.len();
    }

    Err(ParseError::Structural(
        "frontmatter is incomplete: no closing `---` line".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_frontmatter_and_body() {
        let doc = "---\nmodule-name: x\n---\n# Title\n";
        let fm = split_frontmatter(doc).unwrap();
        assert_eq!(fm.yaml, "module-name: x\n");
        assert_eq!(fm.yaml_offset, 4);
        assert_eq!(fm.body, "# Title\n");
        assert_eq!(fm.body_line, 4);
    }

    #[test]
    fn tolerates_crlf() {
        let doc = "---\r\na: 1\r\n---\r\nbody";
        let fm = split_frontmatter(doc).unwrap();
        assert_eq!(fm.yaml, "a: 1\r\n");
        assert_eq!(fm.body, "body");
    }

    #[test]
    fn empty_frontmatter() {
        let fm = split_frontmatter("---\n---\n").unwrap();
        assert_eq!(fm.yaml, "");
        assert_eq!(fm.body, "");
    }

    #[test]
    fn missing_opening_delimiter() {
        let err = split_frontmatter("# Title\n---\na: 1\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::Structural(msg) if msg.contains("missing")));
        assert!(split_frontmatter("").is_err());
    }

    #[test]
    fn missing_closing_delimiter() {
        let err = split_frontmatter("---\na: 1\n# Title\n").unwrap_err();
        assert!(matches!(err, ParseError::Structural(msg) if msg.contains("incomplete")));
    }

    #[test]
    fn longer_dash_runs_are_not_delimiters() {
        assert!(split_frontmatter("----\na: 1\n---\n").is_err());
        let fm = split_frontmatter("---\na: 1\n-----\n---\nbody").unwrap();
        assert_eq!(fm.yaml, "a: 1\n-----\n");
    }
}
