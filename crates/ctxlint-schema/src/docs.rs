//! # Docs-Bundle Linting
//!
//! `.contextdocs.md` lists external documentation bundles a module depends
//! on, in its frontmatter:
//!
//! ```yaml
//! contextdocs:
//!   - name: Tokio
//!     relationship: runtime
//!     url: https://tokio.rs
//!     resources:
//!       - Tutorial: https://tokio.rs/tokio/tutorial
//! ```
//!
//! Each entry needs `name`, `relationship`, and `resources`; each resource
//! is a single-key `label: url` map. The markdown body is free-form, but a
//! link listed in the frontmatter should not be repeated there.

use std::collections::BTreeSet;

use ctxlint_core::{Diagnostic, Position, ValidationResult};
use serde::Serialize;
use serde_json::Value;

use crate::format::decode_yaml;
use crate::frontmatter::split_frontmatter;
use crate::markdown::{is_absolute_url, scan_body};

const BUNDLE_KEY: &str = "contextdocs";
const REQUIRED_ENTRY_FIELDS: &[&str] = &["name", "relationship", "resources"];

/// One labelled link of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocResource {
    pub label: String,
    pub url: String,
}

/// One entry of the `contextdocs` list, as far as it could be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocBundle {
    pub name: Option<String>,
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub resources: Vec<DocResource>,
}

impl DocBundle {
    /// Every link the bundle declares.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.url
            .iter()
            .map(String::as_str)
            .chain(self.resources.iter().map(|r| r.url.as_str()))
    }
}

/// Outcome of linting one docs-bundle file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocsReport {
    pub result: ValidationResult,
    pub bundles: Vec<DocBundle>,
}

/// Lint the content of a `.contextdocs.md` file.
pub fn lint_docs(content: &str) -> DocsReport {
    let fm = match split_frontmatter(content) {
        Ok(fm) => fm,
        Err(err) => {
            return DocsReport {
                result: ValidationResult::unscored(vec![err.to_diagnostic()]),
                bundles: Vec::new(),
            }
        }
    };
    let fields = match decode_yaml(fm.yaml, "frontmatter YAML", |index| {
        Position::from_offset(content, fm.yaml_offset + index)
    }) {
        Ok(fields) => fields,
        Err(err) => {
            return DocsReport {
                result: ValidationResult::unscored(vec![err.to_diagnostic()]),
                bundles: Vec::new(),
            }
        }
    };

    let mut diagnostics = Vec::new();
    let bundles: Vec<DocBundle> = match fields.get(BUNDLE_KEY) {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| read_bundle(index, entry, &mut diagnostics))
            .collect(),
        _ => {
            diagnostics.push(
                Diagnostic::schema(format!("missing or invalid '{BUNDLE_KEY}' list in frontmatter"))
                    .with_field(BUNDLE_KEY),
            );
            Vec::new()
        }
    };

    let declared: BTreeSet<&str> = bundles.iter().flat_map(DocBundle::links).collect();
    let scan = scan_body(fm.body, fm.body_line);
    diagnostics.extend(scan.link_and_fence_warnings());

    let mut reported = BTreeSet::new();
    for link in &scan.links {
        if declared.contains(link.href.as_str()) && reported.insert(link.href.as_str()) {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "link `{}` appears in both the frontmatter and the body",
                    link.href
                ))
                .at(Position::new(link.line, 1)),
            );
        }
    }

    DocsReport {
        result: ValidationResult::unscored(diagnostics),
        bundles,
    }
}

fn read_bundle(index: usize, entry: &Value, diagnostics: &mut Vec<Diagnostic>) -> Option<DocBundle> {
    let field = |name: &str| format!("{BUNDLE_KEY}[{index}].{name}");
    let Value::Object(entry) = entry else {
        diagnostics.push(
            Diagnostic::schema(format!("entry {} of '{BUNDLE_KEY}' must be a map", index + 1))
                .with_field(format!("{BUNDLE_KEY}[{index}]")),
        );
        return None;
    };

    for &name in REQUIRED_ENTRY_FIELDS {
        if !entry.contains_key(name) {
            diagnostics.push(
                Diagnostic::schema(format!(
                    "entry {} of '{BUNDLE_KEY}' is missing required field '{name}'",
                    index + 1
                ))
                .with_field(field(name)),
            );
        }
    }

    let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
    let mut bundle = DocBundle {
        name: text("name"),
        relationship: text("relationship"),
        url: text("url"),
        resources: Vec::new(),
    };

    if let Some(url) = &bundle.url {
        if !is_absolute_url(url) {
            diagnostics.push(
                Diagnostic::warning(format!("bundle url `{url}` is not an absolute URL")).with_field(field("url")),
            );
        }
    }

    match entry.get("resources") {
        Some(Value::Array(resources)) => {
            for resource in resources {
                match read_resource(resource) {
                    Ok(resource) => {
                        if !is_absolute_url(&resource.url) {
                            diagnostics.push(
                                Diagnostic::warning(format!(
                                    "resource '{}' url `{}` is not an absolute URL",
                                    resource.label, resource.url
                                ))
                                .with_field(field("resources")),
                            );
                        }
                        bundle.resources.push(resource);
                    }
                    Err(message) => {
                        diagnostics.push(Diagnostic::schema(message).with_field(field("resources")));
                    }
                }
            }
        }
        Some(_) => diagnostics.push(
            Diagnostic::schema(format!("'resources' of entry {} must be a list", index + 1))
                .with_field(field("resources")),
        ),
        None => {}
    }

    Some(bundle)
}

fn read_resource(resource: &Value) -> Result<DocResource, String> {
    let found = serde_json::to_string(resource).unwrap_or_default();
    match resource {
        Value::Object(map) if map.len() == 1 => match map.iter().next() {
            Some((label, Value::String(url))) => Ok(DocResource {
                label: label.clone(),
                url: url.clone(),
            }),
            _ => Err(format!("resource url must be a string, found {found}")),
        },
        _ => Err(format!("resource must be a single `label: url` pair, found {found}")),
    }
}
