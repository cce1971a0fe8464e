//! Code Generation
//!
//! Generators consume a finished, read-only [`Namespace`] and return one
//! artifact as a string. They never mutate the graph and never read schema
//! sources directly.
//!
//! Architecture:
//! - GenContext: borrowed graph + casing table + per-generator settings
//! - Generator: one output format (`debug`, `json`, `rust`, `avro`)
//! - Registry: id -> generator, in registration order

pub mod avro;
pub mod debug;
pub mod json;
pub mod rust;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SchemaError};
use crate::graph::{Field, Link, Namespace, Object};
use crate::naming::{Casing, Identifier};

// =============================================================================
// Settings
// =============================================================================

/// Avro record settings; every value is required by the `avro` generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvroSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Rust emitter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RustSettings {
    /// Derives placed on every generated struct
    #[serde(default = "default_derives")]
    pub derives: Vec<String>,
}

fn default_derives() -> Vec<String> {
    ["Debug", "Clone", "Default", "PartialEq", "Serialize", "Deserialize"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RustSettings {
    fn default() -> Self {
        Self {
            derives: default_derives(),
        }
    }
}

/// Settings for every builtin generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub avro: AvroSettings,
    pub rust: RustSettings,
}

// =============================================================================
// Generator Contract
// =============================================================================

/// Everything a generator may read
#[derive(Debug, Clone, Copy)]
pub struct GenContext<'a> {
    pub namespace: &'a Namespace,
    pub casing: &'a Casing,
    pub settings: &'a GeneratorSettings,
}

impl<'a> GenContext<'a> {
    pub fn new(
        namespace: &'a Namespace,
        casing: &'a Casing,
        settings: &'a GeneratorSettings,
    ) -> Self {
        Self {
            namespace,
            casing,
            settings,
        }
    }
}

/// An output format driven off the type graph.
pub trait Generator: Send + Sync {
    /// Unique snake_case id (e.g., "rust", "avro")
    fn id(&self) -> &'static str;

    /// File extension for the generated artifact
    fn extension(&self) -> &'static str;

    /// One-line summary for `--list-generators`
    fn description(&self) -> &'static str;

    /// Check settings before any graph is read
    fn validate(&self, _settings: &GeneratorSettings) -> Result<()> {
        Ok(())
    }

    /// Render the artifact
    fn generate(&self, ctx: &GenContext<'_>) -> Result<String>;
}

// =============================================================================
// Registry
// =============================================================================

/// Generators by id, in registration order
#[derive(Default)]
pub struct Registry {
    generators: Vec<Box<dyn Generator>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `debug`, `json`, `rust` and `avro`
    pub fn with_builtins() -> Self {
        let generators: Vec<Box<dyn Generator>> = vec![
            Box::new(debug::DebugGenerator),
            Box::new(json::JsonGenerator),
            Box::new(rust::RustGenerator),
            Box::new(avro::AvroGenerator),
        ];
        Self { generators }
    }

    /// Add a generator; ids must be unique.
    pub fn register(&mut self, generator: Box<dyn Generator>) -> Result<()> {
        if self.contains(generator.id()) {
            return Err(SchemaError::DuplicateGenerator(generator.id().to_string()));
        }
        self.generators.push(generator);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&dyn Generator> {
        self.generators
            .iter()
            .find(|g| g.id() == id)
            .map(|g| g.as_ref())
            .ok_or_else(|| SchemaError::UnknownGenerator {
                name: id.to_string(),
                available: self.ids().join(", "),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.generators.iter().any(|g| g.id() == id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Generator> {
        self.generators.iter().map(|g| g.as_ref())
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Validate settings, then run one generator.
    pub fn generate(&self, id: &str, ctx: &GenContext<'_>) -> Result<String> {
        let generator = self.get(id)?;
        generator.validate(ctx.settings)?;
        generator.generate(ctx)
    }
}

// =============================================================================
// Members
// =============================================================================

/// Field types that describe a container rather than a value
const CONTAINER_TYPES: &[&str] = &["object", "nested"];

/// One emitted member of an object
#[derive(Debug, Clone, Copy)]
pub(crate) enum Member<'a> {
    Field(&'a Field),
    /// `array` is set when a container field of the same name was folded in
    Link { link: &'a Link, array: bool },
}

impl<'a> Member<'a> {
    pub(crate) fn name(&self) -> &'a Identifier {
        match self {
            Member::Field(field) => field.id(),
            Member::Link { link, .. } => &link.name,
        }
    }
}

/// Members of an object in emission order: fields, then refs, then nested.
///
/// A container field (`dns.answers`, type object) that shares its name with a
/// link (`dns.answers.name`) is folded into the link. Any other pair of
/// members with the same snake form is a `MemberCollision`.
pub(crate) fn members(object: &Object) -> Result<Vec<Member<'_>>> {
    let links: Vec<&Link> = object
        .sorted_refs()
        .into_iter()
        .chain(object.sorted_nested())
        .collect();

    let mut folded: HashMap<&Identifier, bool> = HashMap::new();
    let mut members = Vec::new();
    for field in object.sorted_fields() {
        let shadowed = links.iter().any(|link| link.name == *field.id());
        if shadowed && CONTAINER_TYPES.contains(&field.field_type()) {
            let array = field.is_array() || field.field_type() == "nested";
            *folded.entry(field.id()).or_default() |= array;
            continue;
        }
        members.push(Member::Field(field));
    }
    for link in links {
        let array = folded.get(&link.name).copied().unwrap_or(false);
        members.push(Member::Link { link, array });
    }

    let mut seen: HashMap<String, &Identifier> = HashMap::new();
    for member in &members {
        let name = member.name();
        if let Some(first) = seen.insert(name.snake(), name) {
            return Err(SchemaError::MemberCollision {
                type_name: object.id().raw().to_string(),
                member: name.snake(),
                first: first.raw().to_string(),
                second: name.raw().to_string(),
            });
        }
    }

    Ok(members)
}

/// `<dir>/<id>.<extension>`
pub fn output_path(dir: &Path, generator: &dyn Generator) -> PathBuf {
    dir.join(format!("{}.{}", generator.id(), generator.extension()))
}

/// Write one artifact, creating the output directory if needed.
pub fn write_output(dir: &Path, generator: &dyn Generator, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = output_path(dir, generator);
    std::fs::write(&path, content)?;
    info!(generator = generator.id(), path = %path.display(), bytes = content.len(), "wrote output");
    Ok(path)
}
