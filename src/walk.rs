//! Depth-first traversal over the type graph
//!
//! Anything that can list its children in order is [`Walkable`]. The namespace
//! lists its root objects; an object lists its fields, then its refs, then its
//! nested links, each sorted by snake-cased name.
//!
//! Nested links are leaves: the embedded object is walked where it appears as
//! a root, which keeps walks finite even when reuse is recursive.

use crate::graph::{Field, Link, Namespace, Object, ObjectId};
use crate::naming::Identifier;

/// Returned by a visit function to steer the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children
    Continue,
    /// Do not visit this node's children
    SkipChildren,
}

/// How a node was reached
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    /// Object listed at the top of the namespace
    Root(ObjectId),
    /// Intermediate object reached through a path segment
    Ref(&'a Link),
    /// Reused object reached through a reuse directive
    Nested(&'a Link),
    Field(&'a Field),
}

/// One visited position in the graph
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    ns: &'a Namespace,
    kind: NodeKind<'a>,
    depth: usize,
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind<'a> {
        self.kind
    }

    /// Distance from the namespace; roots are at depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Member name at this position (type id for roots)
    pub fn name(&self) -> &'a Identifier {
        match self.kind {
            NodeKind::Root(handle) => self.ns.object(handle).id(),
            NodeKind::Ref(link) | NodeKind::Nested(link) => &link.name,
            NodeKind::Field(field) => field.id(),
        }
    }

    /// The object at this position, if it is not a field
    pub fn object(&self) -> Option<&'a Object> {
        match self.kind {
            NodeKind::Root(handle) => Some(self.ns.object(handle)),
            NodeKind::Ref(link) | NodeKind::Nested(link) => Some(self.ns.resolve(link)),
            NodeKind::Field(_) => None,
        }
    }

    pub fn field(&self) -> Option<&'a Field> {
        match self.kind {
            NodeKind::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        self.field().is_none()
    }

    fn child(&self, kind: NodeKind<'a>) -> Node<'a> {
        Node {
            ns: self.ns,
            kind,
            depth: self.depth + 1,
        }
    }
}

/// A node with an ordered, finite, restartable list of children
pub trait Walkable<'a> {
    fn children(&self) -> Vec<Node<'a>>;
}

impl<'a> Walkable<'a> for &'a Namespace {
    fn children(&self) -> Vec<Node<'a>> {
        let ns: &'a Namespace = *self;
        ns.roots()
            .into_iter()
            .map(|handle| Node {
                ns,
                kind: NodeKind::Root(handle),
                depth: 0,
            })
            .collect()
    }
}

impl<'a> Walkable<'a> for Node<'a> {
    fn children(&self) -> Vec<Node<'a>> {
        let object = match self.kind {
            NodeKind::Root(handle) => self.ns.object(handle),
            NodeKind::Ref(link) => self.ns.resolve(link),
            NodeKind::Nested(_) | NodeKind::Field(_) => return Vec::new(),
        };

        let fields = object
            .sorted_fields()
            .into_iter()
            .map(|field| self.child(NodeKind::Field(field)));
        let refs = object
            .sorted_refs()
            .into_iter()
            .map(|link| self.child(NodeKind::Ref(link)));
        let nested = object
            .sorted_nested()
            .into_iter()
            .map(|link| self.child(NodeKind::Nested(link)));

        fields.chain(refs).chain(nested).collect()
    }
}

/// Depth-first pre-order walk below `root`.
///
/// `visit` runs on each child before its subtree. [`Visit::SkipChildren`]
/// prunes the subtree; an `Err` stops the walk and is returned as is.
pub fn walk<'a, W, F, E>(root: W, visit: &mut F) -> Result<(), E>
where
    W: Walkable<'a>,
    F: FnMut(&Node<'a>) -> Result<Visit, E>,
{
    for child in root.children() {
        match visit(&child)? {
            Visit::SkipChildren => continue,
            Visit::Continue => walk(child, visit)?,
        }
    }
    Ok(())
}
