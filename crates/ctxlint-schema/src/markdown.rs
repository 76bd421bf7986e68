//! # Markdown Body Scanner
//!
//! A line-oriented pass over the markdown that follows the frontmatter. It
//! recognizes only what the linter checks:
//!
//! - ATX (`# Title`) and setext (`Title` over `===`) headings,
//! - fenced code blocks and their info string,
//! - inline links `[text](href)` and autolinks `<https://...>`.
//!
//! Content inside fenced blocks and inline code spans is never inspected.

use ctxlint_core::schema::BODY_SECTIONS;
use ctxlint_core::{Diagnostic, Position};
use url::Url;

/// A hyperlink found in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    /// 1-based line in the whole file.
    pub line: usize,
}

/// Everything the scanner extracted from one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyScan {
    /// Text of the opening first-level heading, if the body starts with one.
    pub title: Option<String>,
    /// Second-level heading texts, lowercased, in document order.
    pub sections: Vec<String>,
    pub links: Vec<Link>,
    /// Lines of opening fences that declare no language.
    pub untagged_fences: Vec<usize>,
}

struct Fence {
    marker: char,
    len: usize,
}

/// Scan `body`, whose first line is line `first_line` of the file.
pub fn scan_body(body: &str, first_line: usize) -> BodyScan {
    let mut scan = BodyScan::default();
    let mut fence: Option<Fence> = None;
    let mut seen_content = false;
    let lines: Vec<&str> = body.lines().collect();

    for (index, raw) in lines.iter().enumerate() {
        let line_no = first_line + index;
        let line = raw.trim_start();

        if let Some(open) = &fence {
            if closes_fence(line, open) {
                fence = None;
            }
            continue;
        }

        if let Some((marker, len, info)) = fence_opening(line) {
            if info.is_empty() {
                scan.untagged_fences.push(line_no);
            }
            fence = Some(Fence { marker, len });
            seen_content = true;
            continue;
        }

        if line.is_empty() {
            continue;
        }

        if let Some((level, text)) = atx_heading(line) {
            if level == 1 && !seen_content {
                scan.title = Some(text.to_string());
            } else if level == 2 {
                scan.sections.push(text.to_lowercase());
            }
        } else if let Some(level) = lines.get(index + 1).and_then(|next| setext_level(next)) {
            if level == 1 && !seen_content {
                scan.title = Some(line.trim_end().to_string());
            } else if level == 2 {
                scan.sections.push(line.trim_end().to_lowercase());
            }
        }

        collect_links(line, line_no, &mut scan.links);
        seen_content = true;
    }

    scan
}

impl BodyScan {
    /// Findings for a context-file body.
    ///
    /// A missing opening title is an error; everything else is a warning.
    /// Conventional sections are only checked when `check_sections` is set.
    pub fn diagnostics(&self, first_line: usize, check_sections: bool) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.title.is_none() {
            diagnostics.push(
                Diagnostic::schema("markdown body must start with a first-level `# ` title heading")
                    .at(Position::new(first_line, 1)),
            );
        }
        diagnostics.extend(self.link_and_fence_warnings());
        if check_sections {
            for section in BODY_SECTIONS {
                if !self.sections.iter().any(|s| s == section) {
                    diagnostics.push(Diagnostic::warning(format!(
                        "markdown body is missing a \"{section}\" section"
                    )));
                }
            }
        }
        diagnostics
    }

    /// Relative or malformed links and untagged code fences.
    pub fn link_and_fence_warnings(&self) -> Vec<Diagnostic> {
        let mut warnings: Vec<(usize, Diagnostic)> = Vec::new();
        for link in &self.links {
            if !is_absolute_url(&link.href) {
                warnings.push((
                    link.line,
                    Diagnostic::warning(format!(
                        "link `{}` is not an absolute URL (relative path or malformed)",
                        link.href
                    ))
                    .at(Position::new(link.line, 1)),
                ));
            }
        }
        for &line in &self.untagged_fences {
            warnings.push((
                line,
                Diagnostic::warning("code block is missing a language tag").at(Position::new(line, 1)),
            ));
        }
        warnings.sort_by_key(|(line, _)| *line);
        warnings.into_iter().map(|(_, d)| d).collect()
    }

    pub fn hrefs(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|l| l.href.as_str())
    }
}

/// Whether `href` parses as an absolute URL.
pub fn is_absolute_url(href: &str) -> bool {
    Url::parse(href).is_ok()
}

fn fence_opening(line: &str) -> Option<(char, usize, &str)> {
    let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = line[len..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((marker, len, info))
}

fn closes_fence(line: &str, open: &Fence) -> bool {
    let len = line.chars().take_while(|c| *c == open.marker).count();
    len >= open.len && line[len..].trim().is_empty()
}

fn atx_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    Some((level, text))
}

fn setext_level(next: &str) -> Option<usize> {
    let next = next.trim();
    if next.is_empty() {
        return None;
    }
    if next.chars().all(|c| c == '=') {
        Some(1)
    } else if next.chars().all(|c| c == '-') && next.len() >= 3 {
        // Short dash runs are more likely list bullets or rules than underlines.
        Some(2)
    } else {
        None
    }
}

/// Drop inline code spans so their contents are never read as links.
fn strip_code_spans(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_code = false;
    for ch in line.chars() {
        if ch == '`' {
            in_code = !in_code;
            out.push(' ');
        } else if in_code {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

fn collect_links(line: &str, line_no: usize, links: &mut Vec<Link>) {
    let text = strip_code_spans(line);
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                let is_image = i > 0 && bytes[i - 1] == b'!';
                let Some(close) = text[i..].find("](").map(|p| i + p) else {
                    break;
                };
                let href_start = close + 2;
                let Some(end) = text[href_start..].find(')').map(|p| href_start + p) else {
                    break;
                };
                if !is_image {
                    let target = text[href_start..end].trim();
                    let href = target.split_whitespace().next().unwrap_or_default();
                    let href = href.trim_start_matches('<').trim_end_matches('>');
                    if !href.is_empty() {
                        links.push(Link {
                            href: href.to_string(),
                            line: line_no,
                        });
                    }
                }
                i = end + 1;
            }
            b'<' => {
                let Some(end) = text[i + 1..].find('>').map(|p| i + 1 + p) else {
                    break;
                };
                let inner = &text[i + 1..end];
                if (inner.starts_with("http://") || inner.starts_with("https://"))
                    && !inner.contains(char::is_whitespace)
                {
                    links.push(Link {
                        href: inner.to_string(),
                        line: line_no,
                    });
                }
                i = end + 1;
            }
            _ => i += 1,
        }
    }
}
