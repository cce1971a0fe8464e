//! Schema definition types
//!
//! Value types deserialized from fieldset YAML sources. A source file holds one
//! (occasionally several) [`TypeDef`], each listing its fields by dotted name
//! relative to the type: the `client` fieldset declares `ip` and `nat.ip`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalization marker that turns a field into a repeated value
pub const ARRAY_NORMALIZER: &str = "array";

/// A single field from a fieldset's `fields:` list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Dotted name relative to the owning type (e.g., "nat.ip")
    pub name: String,
    /// Scalar kind: keyword, text, ip, long, date, object, ...
    #[serde(rename = "type", default)]
    pub field_type: String,
    /// core / extended / custom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_yaml::Value>,
    /// Modifiers; "array" marks a repeated field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normalize: Vec<String>,
    /// Alternate indexings of the same value (informational)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_fields: Vec<MultiFieldDef>,
    /// Allowed values constraint (rarely used, mostly on categorization fields)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<AllowedValueDef>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_above: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_factor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

impl FieldDef {
    /// Create a field with a name and scalar type
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as repeated
    pub fn as_array(mut self) -> Self {
        if !self.is_array() {
            self.normalize.push(ARRAY_NORMALIZER.to_string());
        }
        self
    }

    /// Whether the field holds a list of values
    pub fn is_array(&self) -> bool {
        self.normalize.iter().any(|n| n == ARRAY_NORMALIZER)
    }

    /// Whether the name must be routed through intermediate objects
    pub fn is_dotted(&self) -> bool {
        self.name.contains('.')
    }

    /// Path segments of the name ("nat.ip" -> ["nat", "ip"])
    pub fn segments(&self) -> Vec<&str> {
        self.name.split('.').collect()
    }

    /// Last path segment: the name the field has on its owning object
    pub fn local_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Fully qualified name as it appears in documents ("client.nat.ip").
    /// Root types publish their fields unprefixed.
    pub fn flat_name(&self, owner: &TypeDef) -> String {
        if owner.root {
            self.name.clone()
        } else {
            format!("{}.{}", owner.name, self.name)
        }
    }
}

/// Multi-field: the same value indexed a second way
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiFieldDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

/// One accepted value and what it implies for related fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValueDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_event_types: Vec<String>,
}

/// Reuse directive: this type is embedded, by reference, in each listed parent
///
/// `group.yml` declares `expected: [user]`, so the `user` type gains a `group`
/// member typed as the shared `group` object rather than a new `user_group`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReusableDef {
    #[serde(default)]
    pub top_level: bool,
    #[serde(default)]
    pub expected: Vec<String>,
}

/// A top-level type (fieldset) and its ordered field list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub group: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Root fieldsets publish their fields without a type prefix
    #[serde(default)]
    pub root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reusable: Option<ReusableDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    /// Create an empty type definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare the parents this type is reused in
    pub fn reused_in<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reusable = self.reusable.get_or_insert_with(ReusableDef::default);
        reusable.expected.extend(parents.into_iter().map(Into::into));
        self
    }

    /// Parents named by the reuse directive (empty when there is none)
    pub fn expected_parents(&self) -> &[String] {
        self.reusable
            .as_ref()
            .map(|r| r.expected.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a field by its dotted name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Contents of one source document: a list of types, or a single one
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SourceDocument {
    Many(Vec<TypeDef>),
    One(TypeDef),
}

impl SourceDocument {
    pub fn into_types(self) -> Vec<TypeDef> {
        match self {
            SourceDocument::Many(types) => types,
            SourceDocument::One(ty) => vec![ty],
        }
    }
}

/// Type name -> definition, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    types: BTreeMap<String, TypeDef>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, returning the one it displaced
    pub fn insert(&mut self, def: TypeDef) -> Option<TypeDef> {
        self.types.insert(def.name.clone(), def)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }
}

impl FromIterator<TypeDef> for Definitions {
    fn from_iter<I: IntoIterator<Item = TypeDef>>(iter: I) -> Self {
        let mut defs = Definitions::new();
        for def in iter {
            defs.insert(def);
        }
        defs
    }
}

impl<'a> IntoIterator for &'a Definitions {
    type Item = &'a TypeDef;
    type IntoIter = std::collections::btree_map::Values<'a, String, TypeDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.values()
    }
}
