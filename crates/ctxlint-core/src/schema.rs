//! # Context Schema: Declarative Field Tables
//!
//! The context convention has one fixed schema. It is expressed here as
//! static tables rather than conditionals scattered through the validator:
//!
//! | Table | Contents |
//! |-------|----------|
//! | [`SchemaDescriptor::required`] | top-level fields that must be present |
//! | [`SchemaDescriptor::top_level`] | every recognized top-level field and its kind |
//! | [`SchemaDescriptor::sections`] | the five named sections and their field sets |
//!
//! The descriptor is `'static` and never mutated. File-name conventions
//! shared by the walker and the ignore matcher also live here.

use std::fmt;

/// File suffixes that mark a context file.
pub const CONTEXT_SUFFIXES: &[&str] = &[".context.md", ".context.yaml", ".context.yml", ".context.json"];

/// Default context file names looked up at the root of a run, in order.
pub const ROOT_CONTEXT_FILES: &[&str] = CONTEXT_SUFFIXES;

/// Name of the linked-resources ("docs bundle") file.
pub const DOCS_FILE_NAME: &str = ".contextdocs.md";

/// Name of the ignore-rule file.
pub const IGNORE_FILE_NAME: &str = ".contextignore";

/// Marker files of the convention itself. Ignore patterns may never target them.
pub const CRITICAL_FILE_NAMES: &[&str] = &[
    ".context.md",
    ".context.yaml",
    ".context.yml",
    ".context.json",
    ".contextdocs.md",
    ".contextignore",
];

/// Extensions (lowercase, without the dot) accepted for on-disk diagrams.
pub const DIAGRAM_EXTENSIONS: &[&str] = &["mermaid", "mmd", "pdf", "png", "jpeg", "jpg", "svg"];

/// Second-level headings a markdown context body conventionally carries.
pub const BODY_SECTIONS: &[&str] = &[
    "architecture overview",
    "development guidelines",
    "business context",
    "quality assurance",
    "deployment and operations",
];

/// Whether `name` is a context file name (any of [`CONTEXT_SUFFIXES`]).
pub fn is_context_file_name(name: &str) -> bool {
    CONTEXT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// The artifact a cross-reference field must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A directory that itself holds a context file.
    Module,
    /// An absolute URL, or a file with an allow-listed diagram extension.
    Diagram,
}

/// Declared kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Must decode to a scalar (string, number, or boolean).
    String,
    /// Must decode to an ordered sequence.
    List,
    /// A list whose string entries must each resolve to a real artifact.
    Reference(ReferenceKind),
    /// A nested map validated against its own [`SectionSpec`].
    Section,
}

impl FieldKind {
    /// Human-readable name of the kind, used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List | Self::Reference(_) => "list",
            Self::Section => "map",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One field of a scope and its declared kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// A named optional section and its expected fields.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl SectionSpec {
    /// Declared kind of a field inside this section.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// The complete, fixed schema of a context file.
#[derive(Debug)]
pub struct SchemaDescriptor {
    pub required: &'static [&'static str],
    pub top_level: &'static [FieldSpec],
    pub sections: &'static [SectionSpec],
}

impl SchemaDescriptor {
    /// Declared kind of a top-level field, `None` if unrecognized.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.top_level.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(&name)
    }

    /// Every recognized top-level field, in declaration order.
    pub fn top_level_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.top_level.iter().map(|f| f.name)
    }
}

const ARCHITECTURE: &[FieldSpec] = &[
    field("style", FieldKind::String),
    field("components", FieldKind::List),
    field("data-flow", FieldKind::List),
];

const DEVELOPMENT: &[FieldSpec] = &[
    field("setup-steps", FieldKind::List),
    field("build-command", FieldKind::String),
    field("test-command", FieldKind::String),
];

const BUSINESS_REQUIREMENTS: &[FieldSpec] = &[
    field("key-features", FieldKind::List),
    field("target-audience", FieldKind::String),
    field("success-metrics", FieldKind::List),
];

const QUALITY_ASSURANCE: &[FieldSpec] = &[
    field("testing-frameworks", FieldKind::List),
    field("coverage-threshold", FieldKind::String),
    field("performance-benchmarks", FieldKind::List),
];

const DEPLOYMENT: &[FieldSpec] = &[
    field("platform", FieldKind::String),
    field("cicd-pipeline", FieldKind::String),
    field("staging-environment", FieldKind::String),
    field("production-environment", FieldKind::String),
];

/// The context convention schema.
pub static CONTEXT_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    required: &["module-name", "version", "description"],
    top_level: &[
        field("module-name", FieldKind::String),
        field("version", FieldKind::String),
        field("description", FieldKind::String),
        field("related-modules", FieldKind::Reference(ReferenceKind::Module)),
        field("diagrams", FieldKind::Reference(ReferenceKind::Diagram)),
        field("main-technologies", FieldKind::List),
        field("conventions", FieldKind::List),
        field("directives", FieldKind::List),
        field("architecture", FieldKind::Section),
        field("development", FieldKind::Section),
        field("business-requirements", FieldKind::Section),
        field("quality-assurance", FieldKind::Section),
        field("deployment", FieldKind::Section),
    ],
    sections: &[
        SectionSpec { name: "architecture", fields: ARCHITECTURE },
        SectionSpec { name: "development", fields: DEVELOPMENT },
        SectionSpec { name: "business-requirements", fields: BUSINESS_REQUIREMENTS },
        SectionSpec { name: "quality-assurance", fields: QUALITY_ASSURANCE },
        SectionSpec { name: "deployment", fields: DEPLOYMENT },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_field_is_declared_as_section() {
        for section in CONTEXT_SCHEMA.sections {
            assert_eq!(
                CONTEXT_SCHEMA.kind_of(section.name),
                Some(FieldKind::Section),
                "section '{}' missing from top-level table",
                section.name
            );
        }
        let declared = CONTEXT_SCHEMA
            .top_level
            .iter()
            .filter(|f| f.kind == FieldKind::Section)
            .count();
        assert_eq!(declared, CONTEXT_SCHEMA.sections.len());
    }

    #[test]
    fn required_fields_are_recognized() {
        for name in CONTEXT_SCHEMA.required {
            assert!(CONTEXT_SCHEMA.kind_of(name).is_some(), "{name}");
        }
    }

    #[test]
    fn cross_reference_fields() {
        assert_eq!(
            CONTEXT_SCHEMA.kind_of("related-modules"),
            Some(FieldKind::Reference(ReferenceKind::Module))
        );
        assert_eq!(
            CONTEXT_SCHEMA.kind_of("diagrams"),
            Some(FieldKind::Reference(ReferenceKind::Diagram))
        );
    }

    #[test]
    fn section_lookup() {
        let deployment = CONTEXT_SCHEMA.section("deployment").unwrap();
        assert_eq!(deployment.fields.len(), 4);
        assert_eq!(deployment.kind_of("platform"), Some(FieldKind::String));
        assert_eq!(deployment.kind_of("style"), None);
        assert!(CONTEXT_SCHEMA.section("unknown").is_none());
    }

    #[test]
    fn context_file_names() {
        assert!(is_context_file_name(".context.md"));
        assert!(is_context_file_name("api.context.yml"));
        assert!(is_context_file_name("db.context.json"));
        assert!(!is_context_file_name("context.md"));
        assert!(!is_context_file_name(".contextdocs.md"));
    }

    #[test]
    fn kind_descriptions() {
        assert_eq!(FieldKind::String.to_string(), "string");
        assert_eq!(FieldKind::Reference(ReferenceKind::Diagram).to_string(), "list");
        assert_eq!(FieldKind::Section.to_string(), "map");
    }
}
