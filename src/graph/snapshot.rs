//! Serializable view of a built namespace
//!
//! Handles are resolved to identifiers and every map is ordered, so two
//! snapshots of equivalent graphs compare (and serialize) identically.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Field, Namespace, Object};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSnapshot {
    pub types: BTreeMap<String, ObjectSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    /// Whether a source declared this type (false for intermediates and shells)
    pub declared: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldSnapshot>,
    /// Target identifier -> member name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub refs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub nested: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
    /// Full dotted names this field was declared under
    pub sources: Vec<String>,
}

impl From<&Field> for FieldSnapshot {
    fn from(field: &Field) -> Self {
        Self {
            field_type: field.field_type().to_string(),
            array: field.is_array(),
            sources: field.sources().keys().cloned().collect(),
        }
    }
}

impl From<&Object> for ObjectSnapshot {
    fn from(object: &Object) -> Self {
        Self {
            declared: !object.is_implicit(),
            fields: object
                .fields()
                .iter()
                .map(|(id, field)| (id.raw().to_string(), field.into()))
                .collect(),
            refs: object
                .refs()
                .iter()
                .map(|(id, link)| (id.raw().to_string(), link.name.raw().to_string()))
                .collect(),
            nested: object
                .nested()
                .keys()
                .map(|id| id.raw().to_string())
                .collect(),
        }
    }
}

impl Namespace {
    /// Ordered, handle-free copy of the graph
    pub fn snapshot(&self) -> NamespaceSnapshot {
        NamespaceSnapshot {
            types: self
                .index
                .iter()
                .map(|(id, handle)| (id.raw().to_string(), self.object(*handle).into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldFilter;
    use crate::schema::{FieldDef, TypeDef};

    #[test]
    fn test_snapshot_shape() {
        let defs = [
            TypeDef::new("client")
                .with_field(FieldDef::new("ip", "ip"))
                .with_field(FieldDef::new("nat.ip", "ip"))
                .with_field(FieldDef::new("domain", "keyword").as_array()),
            TypeDef::new("as")
                .with_field(FieldDef::new("number", "long"))
                .reused_in(["client"]),
        ];
        let snapshot = Namespace::build(&defs, &FieldFilter::allow_all())
            .unwrap()
            .snapshot();

        let client = &snapshot.types["client"];
        assert!(client.declared);
        assert_eq!(client.refs["client_nat"], "nat");
        assert!(client.nested.contains("as"));
        assert!(client.fields["domain"].array);

        let nat = &snapshot.types["client_nat"];
        assert!(!nat.declared);
        assert_eq!(nat.fields["ip"].sources, vec!["nat.ip".to_string()]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["types"]["client"]["fields"]["ip"]["type"], "ip");
        assert!(json["types"]["client"]["fields"]["ip"].get("array").is_none());
    }
}
