//! # Format Normalizers
//!
//! One [`ContextFormat`] per encoding, selected once from the file name.
//! Each variant decodes its input into the same kebab-cased
//! [`FieldMap`], so the validator has a single code path.
//!
//! | Suffix | Variant | Decoder |
//! |--------|---------|---------|
//! | `.context.md` | [`ContextFormat::Markdown`] | frontmatter split, then YAML |
//! | `.context.yaml`, `.context.yml` | [`ContextFormat::Yaml`] | `serde_yaml` |
//! | `.context.json` | [`ContextFormat::Json`] | `serde_json`, keys camel→kebab |
//!
//! YAML values are converted to `serde_json::Value` so all three formats
//! share one value model.

use std::fmt;
use std::path::Path;

use ctxlint_core::field_map::value_kind;
use ctxlint_core::{FieldMap, KeyCase, Position};
use serde::Serialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::frontmatter::split_frontmatter;

/// Encoding of a context file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextFormat {
    Markdown,
    Yaml,
    Json,
}

/// Markdown text following the frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownBody {
    pub text: String,
    /// 1-based line of the first body line in the whole file.
    pub first_line: usize,
}

/// A decoded context document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContext {
    pub fields: FieldMap,
    /// Present for [`ContextFormat::Markdown`] only.
    pub body: Option<MarkdownBody>,
}

impl ContextFormat {
    /// Format implied by a file name, `None` for non-context files.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".context.md") {
            Some(Self::Markdown)
        } else if name.ends_with(".context.yaml") || name.ends_with(".context.yml") {
            Some(Self::Yaml)
        } else if name.ends_with(".context.json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(Self::from_file_name)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Decode `content` into a canonical field map.
    ///
    /// `casing` memoizes key translation across files of one run; only the
    /// JSON variant uses it.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Structural`] for missing or unclosed frontmatter.
    /// - [`ParseError::Syntax`] with a whole-file position when the
    ///   decoder rejects the input.
    /// - [`ParseError::NotAMap`] when the document is not a map.
    pub fn parse(self, content: &str, casing: &mut KeyCase) -> Result<ParsedContext, ParseError> {
        match self {
            Self::Markdown => {
                let fm = split_frontmatter(content)?;
                let fields = decode_yaml(fm.yaml, "frontmatter YAML", |index| {
                    Position::from_offset(content, fm.yaml_offset + index)
                })?;
                Ok(ParsedContext {
                    fields,
                    body: Some(MarkdownBody {
                        text: fm.body.to_string(),
                        first_line: fm.body_line,
                    }),
                })
            }
            Self::Yaml => {
                let fields = decode_yaml(content, "YAML", |index| Position::from_offset(content, index))?;
                Ok(ParsedContext { fields, body: None })
            }
            Self::Json => {
                let fields = decode_json(content)?;
                Ok(ParsedContext {
                    fields: casing.normalize_keys(fields),
                    body: None,
                })
            }
        }
    }
}

impl fmt::Display for ContextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decode a YAML document that must be a map. An empty document is an
/// empty map.
///
/// `locate` turns a byte offset within `text` into a whole-file position.
pub(crate) fn decode_yaml(
    text: &str,
    format: &'static str,
    locate: impl Fn(usize) -> Position,
) -> Result<FieldMap, ParseError> {
    if text.trim().is_empty() {
        return Ok(FieldMap::new());
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| ParseError::Syntax {
        format,
        message: without_location(e.to_string()),
        position: e.location().map(|loc| locate(loc.index())),
    })?;
    let value = yaml_to_json_value(&yaml).map_err(|message| ParseError::Syntax {
        format,
        message,
        position: None,
    })?;
    into_map(value)
}

/// Drop the decoder's own " at line L column C" suffix. It is relative to
/// `text`, which for frontmatter is not the whole file.
fn without_location(mut message: String) -> String {
    if let Some(index) = message.find(" at line ") {
        message.truncate(index);
    }
    message
}

fn decode_json(text: &str) -> Result<FieldMap, ParseError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::Syntax {
        format: "JSON",
        message: e.to_string(),
        position: (e.line() > 0).then(|| Position::new(e.line(), e.column().max(1))),
    })?;
    into_map(value)
}

fn into_map(value: Value) -> Result<FieldMap, ParseError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(FieldMap::new()),
        other => Err(ParseError::NotAMap {
            found: value_kind(&other),
        }),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped in favour of their inner value. Scalar map keys are
/// stringified; sequence or map keys are rejected.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                // NaN and infinities have no JSON form; keep them as text.
                Ok(serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string())))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported map key: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
