//! Type Graph Analysis
//!
//! Finds recursive types: objects inside a strongly connected component of
//! more than one member, or with a link to themselves. Ref chains can never
//! cycle (each hop extends its parent's identifier), so every cycle runs
//! through at least one nested link.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::{Namespace, ObjectId};
use crate::naming::{sort_identifiers, Identifier};

/// A cycle group in the type graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleGroup {
    pub id: usize,
    /// Members in snake-case order
    pub members: Vec<ObjectId>,
    /// Single object linking to itself
    pub is_self_referential: bool,
}

/// Recursion metadata for a built namespace
#[derive(Debug, Clone, Default)]
pub struct RecursionInfo {
    pub groups: Vec<CycleGroup>,
    group_of: HashMap<ObjectId, usize>,
}

impl RecursionInfo {
    /// Compute cycle groups for a namespace
    pub fn compute(ns: &Namespace) -> Self {
        let mut info = RecursionInfo::default();

        for scc in kosaraju_scc(&ns.graph) {
            let is_self_referential = scc.len() == 1
                && ns
                    .graph
                    .edges_directed(scc[0], Direction::Outgoing)
                    .any(|e| e.target() == scc[0]);

            if scc.len() == 1 && !is_self_referential {
                continue;
            }

            let id = info.groups.len();
            let mut members: Vec<ObjectId> = scc.into_iter().map(ObjectId).collect();
            members.sort_by_cached_key(|m| ns.object(*m).id().sort_key());
            for member in &members {
                info.group_of.insert(*member, id);
            }
            info.groups.push(CycleGroup {
                id,
                members,
                is_self_referential,
            });
        }

        info
    }

    /// Whether an object takes part in any cycle
    pub fn is_recursive(&self, object: ObjectId) -> bool {
        self.group_of.contains_key(&object)
    }

    /// Whether a link from `from` to `to` closes a cycle and must be boxed
    /// (or otherwise indirected) by an emitter.
    pub fn needs_boxing(&self, from: ObjectId, to: ObjectId) -> bool {
        match (self.group_of.get(&from), self.group_of.get(&to)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_acyclic(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Identifiers of every recursive type, in snake-case order
pub fn recursive_types(ns: &Namespace) -> Vec<&Identifier> {
    let info = RecursionInfo::compute(ns);
    sort_identifiers(
        info.group_of
            .keys()
            .map(|handle| ns.object(*handle).id()),
    )
}
