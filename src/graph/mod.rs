//! Type Graph
//!
//! The namespace is the single owner of every [`Object`] in the graph. Objects
//! live in a petgraph arena and are addressed by [`ObjectId`]; `refs` and
//! `nested` links are index-based and never own their target.
//!
//! - refs: intermediate objects created to route a dotted field path
//!   (`tls` -> `tls_server` -> `tls_server_hash`)
//! - nested: explicit reuse links (`user` -> `group`), shared with every other
//!   reference to the same type
//!
//! [`Namespace::find_type`] is the only path that inserts an object, so an
//! identifier always resolves to exactly one object.

pub mod analysis;
pub mod builder;
pub mod snapshot;

pub use analysis::{recursive_types, RecursionInfo};
pub use snapshot::{FieldSnapshot, NamespaceSnapshot, ObjectSnapshot};

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::naming::{sort_identifiers, Identifier};
use crate::schema::{FieldDef, TypeDef};

// =============================================================================
// Handles and Links
// =============================================================================

/// Handle to an object owned by a [`Namespace`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) NodeIndex);

impl ObjectId {
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

/// How one object came to reference another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Intermediate hop on a dotted field path
    Ref,
    /// Explicit reuse directive
    Nested,
}

/// A non-owning edge from one object to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The referenced object
    pub target: ObjectId,
    /// Member name on the referencing object: the path segment for refs,
    /// the reused type's name for nested links
    pub name: Identifier,
}

// =============================================================================
// Field
// =============================================================================

/// A scalar (or array-of-scalar) leaf owned by one object
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) id: Identifier,
    /// Full dotted name -> definition; repeated names converge here
    pub(crate) sources: BTreeMap<String, FieldDef>,
}

impl Field {
    fn new(id: Identifier, def: &FieldDef) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(def.name.clone(), def.clone());
        Self { id, sources }
    }

    /// Local name on the owning object
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn sources(&self) -> &BTreeMap<String, FieldDef> {
        &self.sources
    }

    /// Representative definition (first by dotted name)
    pub fn definition(&self) -> Option<&FieldDef> {
        self.sources.values().next()
    }

    pub fn field_type(&self) -> &str {
        self.definition()
            .map(|def| def.field_type.as_str())
            .unwrap_or_default()
    }

    pub fn is_array(&self) -> bool {
        self.sources.values().any(FieldDef::is_array)
    }

    pub fn description(&self) -> Option<&str> {
        self.sources
            .values()
            .find_map(|def| def.description.as_deref())
    }
}

// =============================================================================
// Object
// =============================================================================

/// A composite type node
#[derive(Debug, Clone)]
pub struct Object {
    pub(crate) id: Identifier,
    pub(crate) fields: BTreeMap<Identifier, Field>,
    pub(crate) refs: BTreeMap<Identifier, Link>,
    pub(crate) nested: BTreeMap<Identifier, Link>,
    pub(crate) source: Option<Arc<TypeDef>>,
}

impl Object {
    fn new(id: Identifier) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
            refs: BTreeMap::new(),
            nested: BTreeMap::new(),
            source: None,
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn fields(&self) -> &BTreeMap<Identifier, Field> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(&Identifier::new(name))
    }

    pub fn refs(&self) -> &BTreeMap<Identifier, Link> {
        &self.refs
    }

    pub fn nested(&self) -> &BTreeMap<Identifier, Link> {
        &self.nested
    }

    /// The type definition this object was declared by, if any
    pub fn source(&self) -> Option<&TypeDef> {
        self.source.as_deref()
    }

    /// True for intermediates and shells that no source declared
    pub fn is_implicit(&self) -> bool {
        self.source.is_none()
    }

    /// Fields ordered by snake-cased name
    pub fn sorted_fields(&self) -> Vec<&Field> {
        sort_identifiers(self.fields.keys())
            .into_iter()
            .map(|id| &self.fields[id])
            .collect()
    }

    /// Ref links ordered by the target's snake-cased identifier
    pub fn sorted_refs(&self) -> Vec<&Link> {
        sorted_links(&self.refs)
    }

    /// Nested links ordered by the target's snake-cased identifier
    pub fn sorted_nested(&self) -> Vec<&Link> {
        sorted_links(&self.nested)
    }
}

fn sorted_links(links: &BTreeMap<Identifier, Link>) -> Vec<&Link> {
    sort_identifiers(links.keys())
        .into_iter()
        .map(|id| &links[id])
        .collect()
}

// =============================================================================
// Namespace
// =============================================================================

/// Graph root: owns every object, indexed by identifier
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    /// Arena of objects; edges mirror every ref and nested link
    pub(crate) graph: DiGraph<Object, LinkKind>,

    /// Identifier -> object handle
    pub(crate) index: HashMap<Identifier, ObjectId>,
}

impl Namespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an object by identifier, creating an empty one if absent.
    pub fn find_type(&mut self, id: &Identifier) -> ObjectId {
        if let Some(&existing) = self.index.get(id) {
            return existing;
        }

        let handle = ObjectId(self.graph.add_node(Object::new(id.clone())));
        self.index.insert(id.clone(), handle);
        debug!(type_id = %id, "created type");
        handle
    }

    /// Attach a field to an object, merging into an existing field that has
    /// the same local name.
    ///
    /// The field's local identifier is the last segment of `def.name`. Its
    /// `sources` map is keyed by the full dotted name, so a repeated
    /// definition of the same path replaces the earlier entry.
    pub fn find_or_create_field(&mut self, owner: ObjectId, def: &FieldDef) -> &Field {
        let field_id = Identifier::new(def.local_name());
        let object = &mut self.graph[owner.0];

        match object.fields.entry(field_id) {
            Entry::Occupied(entry) => {
                let field = entry.into_mut();
                field.sources.insert(def.name.clone(), def.clone());
                field
            }
            Entry::Vacant(entry) => {
                debug!(type_id = %object.id, field = %entry.key(), "new field");
                let field = Field::new(entry.key().clone(), def);
                entry.insert(field)
            }
        }
    }

    /// Resolve (or create) an intermediate object and link it from `owner`
    /// under `refs`. `name` is the path segment the link stands for.
    pub fn find_or_create_ref(
        &mut self,
        owner: ObjectId,
        id: &Identifier,
        name: &Identifier,
    ) -> ObjectId {
        if let Some(link) = self.graph[owner.0].refs.get(id) {
            return link.target;
        }

        let target = self.find_type(id);
        let link = Link {
            target,
            name: name.clone(),
        };
        self.graph[owner.0].refs.insert(id.clone(), link);
        self.graph.add_edge(owner.0, target.0, LinkKind::Ref);
        debug!(type_id = %self.graph[owner.0].id, target = %id, "new ref");
        target
    }

    /// Resolve (or create) a reused object and link it from `owner` under
    /// `nested`. The link points at the shared object, never a copy.
    pub fn find_or_create_nested(&mut self, owner: ObjectId, id: &Identifier) -> ObjectId {
        if let Some(link) = self.graph[owner.0].nested.get(id) {
            return link.target;
        }

        let target = self.find_type(id);
        let link = Link {
            target,
            name: id.clone(),
        };
        self.graph[owner.0].nested.insert(id.clone(), link);
        self.graph.add_edge(owner.0, target.0, LinkKind::Nested);
        debug!(type_id = %self.graph[owner.0].id, target = %id, "new nested");
        target
    }

    /// Record the declaring definition unless one is already set.
    /// Returns whether the source was attached.
    pub fn attach_source(&mut self, owner: ObjectId, source: Arc<TypeDef>) -> bool {
        let object = &mut self.graph[owner.0];
        if object.source.is_some() {
            return false;
        }
        object.source = Some(source);
        true
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    /// Object behind a handle issued by this namespace
    pub fn object(&self, handle: ObjectId) -> &Object {
        &self.graph[handle.0]
    }

    /// Target object of a link
    pub fn resolve(&self, link: &Link) -> &Object {
        self.object(link.target)
    }

    pub fn lookup(&self, id: &Identifier) -> Option<ObjectId> {
        self.index.get(id).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.lookup(&Identifier::new(name)).map(|h| self.object(h))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&Identifier::new(name))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All type identifiers, unordered
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.index.keys()
    }

    /// All type identifiers in snake-case order
    pub fn sorted_ids(&self) -> Vec<&Identifier> {
        sort_identifiers(self.index.keys())
    }

    /// All objects in snake-case order
    pub fn sorted_objects(&self) -> Vec<(ObjectId, &Object)> {
        self.sorted_ids()
            .into_iter()
            .map(|id| {
                let handle = self.index[id];
                (handle, self.object(handle))
            })
            .collect()
    }

    /// Objects that no ref link points at (declared types and reuse shells),
    /// in snake-case order
    pub fn roots(&self) -> Vec<ObjectId> {
        self.sorted_objects()
            .into_iter()
            .filter(|(handle, _)| {
                !self
                    .graph
                    .edges_directed(handle.0, Direction::Incoming)
                    .any(|edge| *edge.weight() == LinkKind::Ref)
            })
            .map(|(handle, _)| handle)
            .collect()
    }
}
