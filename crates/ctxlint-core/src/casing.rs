//! # Key Casing
//!
//! Context files written as JSON use camelCase keys (`mainTechnologies`);
//! markdown frontmatter and YAML use kebab-case (`main-technologies`). The
//! schema tables are kebab-case, so JSON keys are translated before
//! validation.
//!
//! The free functions are pure. [`KeyCase`] memoizes them per key, since
//! the same handful of keys recur in every file of a run.

use std::collections::HashMap;

use serde_json::Value;

use crate::field_map::FieldMap;

/// `mainTechnologies` → `main-technologies`.
///
/// Every ASCII uppercase letter becomes `-` plus its lowercase form, except
/// at the start of the key. Keys that are already kebab-case pass through
/// unchanged.
pub fn camel_to_kebab(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('-') {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `main-technologies` → `mainTechnologies`.
///
/// Only a hyphen followed by a lowercase ASCII letter is folded; any other
/// hyphen is kept as written.
pub fn kebab_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '-' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                out.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Memoizing key translator.
#[derive(Debug, Default, Clone)]
pub struct KeyCase {
    to_kebab: HashMap<String, String>,
    to_camel: HashMap<String, String>,
}

impl KeyCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camel_to_kebab(&mut self, key: &str) -> String {
        if let Some(hit) = self.to_kebab.get(key) {
            return hit.clone();
        }
        let translated = camel_to_kebab(key);
        self.to_kebab.insert(key.to_string(), translated.clone());
        translated
    }

    pub fn kebab_to_camel(&mut self, key: &str) -> String {
        if let Some(hit) = self.to_camel.get(key) {
            return hit.clone();
        }
        let translated = kebab_to_camel(key);
        self.to_camel.insert(key.to_string(), translated.clone());
        translated
    }

    /// Number of memoized translations, both directions.
    pub fn len(&self) -> usize {
        self.to_kebab.len() + self.to_camel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.to_kebab.clear();
        self.to_camel.clear();
    }

    /// Rewrite every map key of a JSON-sourced field map to kebab-case.
    ///
    /// Nested maps (the named sections) are translated too. Sequences are
    /// values, not schema fields, and are left untouched.
    pub fn normalize_keys(&mut self, fields: FieldMap) -> FieldMap {
        fields
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Object(nested) => Value::Object(self.normalize_keys(nested)),
                    other => other,
                };
                (self.camel_to_kebab(&key), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_to_kebab_basic() {
        assert_eq!(camel_to_kebab("mainTechnologies"), "main-technologies");
        assert_eq!(camel_to_kebab("moduleName"), "module-name");
        assert_eq!(camel_to_kebab("cicdPipeline"), "cicd-pipeline");
        assert_eq!(camel_to_kebab("version"), "version");
    }

    #[test]
    fn camel_to_kebab_leaves_kebab_untouched() {
        assert_eq!(camel_to_kebab("data-flow"), "data-flow");
        assert_eq!(camel_to_kebab("module-name"), "module-name");
    }

    #[test]
    fn kebab_to_camel_basic() {
        assert_eq!(kebab_to_camel("main-technologies"), "mainTechnologies");
        assert_eq!(kebab_to_camel("business-requirements"), "businessRequirements");
        assert_eq!(kebab_to_camel("style"), "style");
    }

    #[test]
    fn kebab_to_camel_keeps_non_letter_hyphens() {
        assert_eq!(kebab_to_camel("step-1"), "step-1");
        assert_eq!(kebab_to_camel("trailing-"), "trailing-");
    }

    #[test]
    fn translations_are_inverse_for_schema_keys() {
        for name in crate::CONTEXT_SCHEMA.top_level_names() {
            assert_eq!(camel_to_kebab(&kebab_to_camel(name)), name);
        }
        for section in crate::CONTEXT_SCHEMA.sections {
            for name in section.field_names() {
                assert_eq!(camel_to_kebab(&kebab_to_camel(name)), name);
            }
        }
    }

    #[test]
    fn memoizes_each_key_once() {
        let mut keys = KeyCase::new();
        assert_eq!(keys.camel_to_kebab("buildCommand"), "build-command");
        assert_eq!(keys.camel_to_kebab("buildCommand"), "build-command");
        assert_eq!(keys.len(), 1);
        keys.kebab_to_camel("build-command");
        assert_eq!(keys.len(), 2);
        keys.clear();
        assert!(keys.is_empty());
    }

    #[test]
    fn normalize_keys_recurses_into_sections() {
        let mut keys = KeyCase::new();
        let input = json!({
            "moduleName": "api",
            "mainTechnologies": ["rust"],
            "development": { "buildCommand": "cargo build", "setupSteps": [{ "keepAsIs": 1 }] }
        });
        let Value::Object(map) = input else { unreachable!() };
        let out = Value::Object(keys.normalize_keys(map));
        assert_eq!(out["module-name"], "api");
        assert_eq!(out["main-technologies"][0], "rust");
        assert_eq!(out["development"]["build-command"], "cargo build");
        assert_eq!(out["development"]["setup-steps"][0]["keepAsIs"], 1);
    }
}
