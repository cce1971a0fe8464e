//! Namespace construction
//!
//! Two passes over the ingested definitions:
//!
//! 1. attach every admitted field, routing dotted paths through intermediate
//!    objects whose identifiers are prefixed by the owning type's name
//! 2. link reuse directives, once every explicit and implicit type exists

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::{Namespace, ObjectId};
use crate::error::{Result, SchemaError};
use crate::filter::FieldFilter;
use crate::naming::Identifier;
use crate::schema::{FieldDef, TypeDef};

/// Separator joining path segments into an intermediate type identifier
pub const CHAIN_SEPARATOR: &str = "_";

impl Namespace {
    /// Build the type graph from a set of definitions.
    ///
    /// The filter runs first and only admitted fields are validated. A
    /// malformed name fails the whole build and no partial graph is returned.
    pub fn build<'a, I>(defs: I, filter: &FieldFilter) -> Result<Namespace>
    where
        I: IntoIterator<Item = &'a TypeDef>,
    {
        let defs: Vec<&TypeDef> = defs.into_iter().collect();

        let mut selected: Vec<(&TypeDef, Vec<&FieldDef>)> = Vec::with_capacity(defs.len());
        for &def in &defs {
            validate_type(def)?;
            let fields: Vec<&FieldDef> = def
                .fields
                .iter()
                .filter(|f| filter.admits(&f.flat_name(def)))
                .collect();
            for field in &fields {
                validate_field(def, field)?;
            }

            if fields.is_empty() && !def.fields.is_empty() {
                debug!(type_name = %def.name, "every field filtered out, skipping type");
                continue;
            }
            selected.push((def, fields));
        }

        let mut ns = Namespace::new();

        // Pass 1: fields and path chains
        let mut admitted: HashSet<&str> = HashSet::new();
        for (def, fields) in &selected {
            admitted.insert(def.name.as_str());

            let owner = ns.find_type(&Identifier::new(&def.name));
            ns.attach_source(owner, Arc::new((*def).clone()));
            for field in fields {
                ns.attach_field(owner, def, field);
            }
        }

        // Pass 2: reuse directives
        for &def in &defs {
            if !admitted.contains(def.name.as_str()) {
                continue;
            }
            let reused = Identifier::new(&def.name);
            for parent in def.expected_parents() {
                let parent = ns.find_type(&Identifier::new(parent));
                ns.find_or_create_nested(parent, &reused);
            }
        }

        info!(types = ns.len(), definitions = defs.len(), "built namespace");
        Ok(ns)
    }

    /// Attach one field to `owner`, creating the intermediate chain for a
    /// dotted name (`server.hash.sha1` on `tls` lands on `tls_server_hash`).
    fn attach_field(&mut self, owner: ObjectId, def: &TypeDef, field: &FieldDef) {
        let segments = field.segments();
        let Some((_, path)) = segments.split_last() else {
            return;
        };

        let mut prefix: Vec<&str> = vec![def.name.as_str()];
        let mut current = owner;
        for &segment in path {
            prefix.push(segment);
            let chain_id = Identifier::new(prefix.join(CHAIN_SEPARATOR));
            current = self.find_or_create_ref(current, &chain_id, &Identifier::new(segment));
        }

        self.find_or_create_field(current, field);
    }
}

/// Reject type and reuse parent names that would produce empty identifiers.
fn validate_type(def: &TypeDef) -> Result<()> {
    if def.name.is_empty() {
        return Err(SchemaError::EmptyName {
            what: "type",
            type_name: def.name.clone(),
        });
    }

    if def.expected_parents().iter().any(String::is_empty) {
        return Err(SchemaError::EmptyName {
            what: "reusable parent",
            type_name: def.name.clone(),
        });
    }

    Ok(())
}

/// Reject field paths with empty segments.
fn validate_field(def: &TypeDef, field: &FieldDef) -> Result<()> {
    if field.name.is_empty() {
        return Err(SchemaError::EmptyName {
            what: "field",
            type_name: def.name.clone(),
        });
    }
    if field.name.starts_with('.') {
        return Err(SchemaError::malformed(&def.name, &field.name, "leading dot"));
    }
    if field.name.ends_with('.') {
        return Err(SchemaError::malformed(&def.name, &field.name, "trailing dot"));
    }
    if field.segments().iter().any(|s| s.is_empty()) {
        return Err(SchemaError::malformed(&def.name, &field.name, "empty segment"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(defs: &[TypeDef]) -> Namespace {
        Namespace::build(defs, &FieldFilter::allow_all()).unwrap()
    }

    #[test]
    fn test_plain_fields_attach_directly() {
        let ns = build(&[TypeDef::new("client")
            .with_field(FieldDef::new("ip", "ip"))
            .with_field(FieldDef::new("port", "long"))]);

        assert_eq!(ns.len(), 1);
        let client = ns.get("client").unwrap();
        assert_eq!(client.fields().len(), 2);
        assert!(client.refs().is_empty());
        assert_eq!(client.source().unwrap().name, "client");
    }

    #[test]
    fn test_path_chain() {
        let ns = build(&[TypeDef::new("tls")
            .with_field(FieldDef::new("server.hash.sha1", "keyword"))
            .with_field(FieldDef::new("server.hash.sha256", "keyword"))]);

        let ids: Vec<_> = ns.sorted_ids().iter().map(|i| i.raw()).collect();
        assert_eq!(ids, vec!["tls", "tls_server", "tls_server_hash"]);

        let hash = ns.get("tls_server_hash").unwrap();
        assert!(hash.field("sha1").is_some());
        assert!(hash.field("sha256").is_some());
        assert!(hash.is_implicit());

        let server = ns.get("tls_server").unwrap();
        let link = &server.refs()[&Identifier::new("tls_server_hash")];
        assert_eq!(link.name.raw(), "hash");
    }

    #[test]
    fn test_chains_from_different_types_never_merge() {
        let ns = build(&[
            TypeDef::new("client").with_field(FieldDef::new("hash.sha1", "keyword")),
            TypeDef::new("tls").with_field(FieldDef::new("server.hash.sha1", "keyword")),
        ]);

        let client_hash = ns.lookup(&Identifier::new("client_hash")).unwrap();
        let tls_hash = ns.lookup(&Identifier::new("tls_server_hash")).unwrap();
        assert_ne!(client_hash, tls_hash);
        assert!(ns.get("server_hash").is_none());
        assert!(ns.get("hash").is_none());
    }

    #[test]
    fn test_reuse_links_shared_object() {
        let ns = build(&[
            TypeDef::new("group")
                .with_field(FieldDef::new("id", "keyword"))
                .reused_in(["user"]),
            TypeDef::new("user").with_field(FieldDef::new("name", "keyword")),
        ]);

        let group = ns.lookup(&Identifier::new("group")).unwrap();
        let user = ns.get("user").unwrap();
        assert_eq!(user.nested()[&Identifier::new("group")].target, group);
    }

    #[test]
    fn test_reuse_into_implicit_parent() {
        // `user_target` only exists because of the `target.name` chain
        let ns = build(&[
            TypeDef::new("user").with_field(FieldDef::new("target.name", "keyword")),
            TypeDef::new("group")
                .with_field(FieldDef::new("id", "keyword"))
                .reused_in(["user_target", "host"]),
        ]);

        let group = ns.lookup(&Identifier::new("group")).unwrap();
        let target = ns.get("user_target").unwrap();
        assert_eq!(target.nested()[&Identifier::new("group")].target, group);

        // undeclared parent becomes an empty shell
        let host = ns.get("host").unwrap();
        assert!(host.is_implicit());
        assert!(host.fields().is_empty());
        assert_eq!(host.nested()[&Identifier::new("group")].target, group);
    }

    #[test]
    fn test_pass_order_does_not_matter() {
        let user = TypeDef::new("user").with_field(FieldDef::new("name", "keyword"));
        let group = TypeDef::new("group")
            .with_field(FieldDef::new("id", "keyword"))
            .reused_in(["user"]);

        let forward = build(&[user.clone(), group.clone()]);
        let backward = build(&[group, user]);
        assert_eq!(forward.snapshot(), backward.snapshot());
    }

    #[test]
    fn test_filter_drops_fields_and_empty_types() {
        let filter = FieldFilter::new([r"^client\."], Vec::<String>::new()).unwrap();
        let defs = [
            TypeDef::new("client")
                .with_field(FieldDef::new("ip", "ip"))
                .with_field(FieldDef::new("nat.ip", "ip")),
            TypeDef::new("server").with_field(FieldDef::new("ip", "ip")),
        ];
        let ns = Namespace::build(&defs, &filter).unwrap();

        assert!(ns.get("client").unwrap().field("ip").is_some());
        assert!(ns.get("client_nat").unwrap().field("ip").is_some());
        assert!(ns.get("server").is_none());
    }

    #[test]
    fn test_fieldless_type_is_kept() {
        let ns = build(&[TypeDef::new("marker")]);
        assert!(ns.contains("marker"));
    }

    #[test]
    fn test_malformed_paths_fail() {
        for (name, reason) in [
            (".ip", "leading dot"),
            ("ip.", "trailing dot"),
            ("nat..ip", "empty segment"),
        ] {
            let defs = [TypeDef::new("client").with_field(FieldDef::new(name, "ip"))];
            match Namespace::build(&defs, &FieldFilter::allow_all()) {
                Err(SchemaError::MalformedPath { path, reason: r, .. }) => {
                    assert_eq!(path, name);
                    assert_eq!(r, reason);
                }
                other => panic!("Expected MalformedPath for {name}, got {:?}", other.map(|n| n.len())),
            }
        }
    }

    #[test]
    fn test_filtered_out_fields_are_not_validated() {
        let filter = FieldFilter::new(Vec::<String>::new(), [r"\.\."]).unwrap();
        let defs = [TypeDef::new("client")
            .with_field(FieldDef::new("ip", "ip"))
            .with_field(FieldDef::new("nat..ip", "ip"))];

        let ns = Namespace::build(&defs, &filter).unwrap();
        let client = ns.get("client").unwrap();
        assert!(client.field("ip").is_some());
        assert_eq!(client.fields().len(), 1);
        assert_eq!(ns.len(), 1);

        // admitted, the same field still fails
        assert!(matches!(
            Namespace::build(&defs, &FieldFilter::allow_all()),
            Err(SchemaError::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_empty_names_fail() {
        let empty_field = [TypeDef::new("client").with_field(FieldDef::new("", "ip"))];
        assert!(matches!(
            Namespace::build(&empty_field, &FieldFilter::allow_all()),
            Err(SchemaError::EmptyName { what: "field", .. })
        ));

        let empty_type = [TypeDef::new("")];
        assert!(matches!(
            Namespace::build(&empty_type, &FieldFilter::allow_all()),
            Err(SchemaError::EmptyName { what: "type", .. })
        ));

        let empty_parent = [TypeDef::new("group").reused_in([""])];
        assert!(matches!(
            Namespace::build(&empty_parent, &FieldFilter::allow_all()),
            Err(SchemaError::EmptyName { what: "reusable parent", .. })
        ));
    }
}
