//! Avro Schema Emitter
//!
//! Emits a single top-level record whose members are the namespace roots.
//! Each object becomes a nullable nested record the first time it is reached;
//! later occurrences (reuse, recursion) reference it by name.

use std::collections::HashSet;

use serde_json::{json, Value};

use super::{members, GenContext, Generator, GeneratorSettings, Member};
use crate::error::{Result, SchemaError};
use crate::graph::{Field, Namespace, ObjectId};
use crate::naming::Identifier;

pub struct AvroGenerator;

impl Generator for AvroGenerator {
    fn id(&self) -> &'static str {
        "avro"
    }

    fn extension(&self) -> &'static str {
        "avsc"
    }

    fn description(&self) -> &'static str {
        "Avro record schema with one optional record per root type"
    }

    fn validate(&self, settings: &GeneratorSettings) -> Result<()> {
        required(&settings.avro.owner, "owner")?;
        required(&settings.avro.namespace, "namespace")?;
        required(&settings.avro.name, "name")?;
        Ok(())
    }

    fn generate(&self, ctx: &GenContext<'_>) -> Result<String> {
        let avro = &ctx.settings.avro;
        let mut emitter = RecordEmitter {
            ns: ctx.namespace,
            defined: HashSet::new(),
        };

        let mut fields = Vec::new();
        for root in ctx.namespace.roots() {
            let name = ctx.namespace.object(root).id();
            fields.push(optional(name, emitter.record(root)?));
        }

        let schema = json!({
            "type": "record",
            "namespace": required(&avro.namespace, "namespace")?,
            "name": required(&avro.name, "name")?,
            "owner": required(&avro.owner, "owner")?,
            "fields": fields,
        });

        let mut out = serde_json::to_string_pretty(&schema)?;
        out.push('\n');
        Ok(out)
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SchemaError::InvalidSettings {
            generator: "avro".to_string(),
            message: format!("avro.{} must be set", key),
        }),
    }
}

struct RecordEmitter<'a> {
    ns: &'a Namespace,
    defined: HashSet<ObjectId>,
}

impl RecordEmitter<'_> {
    /// Full record definition on first use, its name afterwards
    fn record(&mut self, handle: ObjectId) -> Result<Value> {
        let object = self.ns.object(handle);
        let name = record_name(object.id());
        if !self.defined.insert(handle) {
            return Ok(Value::String(name));
        }

        let mut fields = Vec::new();
        for member in members(object)? {
            match member {
                Member::Field(field) => fields.push(optional(field.id(), scalar(field)?)),
                Member::Link { link, array } => {
                    let mut nested = self.record(link.target)?;
                    if array {
                        nested = json!({"type": "array", "items": nested});
                    }
                    fields.push(optional(&link.name, nested));
                }
            }
        }

        Ok(json!({
            "type": "record",
            "name": name,
            "fields": fields,
        }))
    }
}

/// `{"name": .., "type": ["null", ..], "default": null}`
fn optional(name: &Identifier, avro_type: Value) -> Value {
    json!({
        "name": name.snake(),
        "type": ["null", avro_type],
        "default": null,
    })
}

/// Avro names allow `[A-Za-z0-9_]` only
fn record_name(id: &Identifier) -> String {
    id.snake()
}

fn scalar(field: &Field) -> Result<Value> {
    let kind = field.field_type();
    let avro_type = match kind {
        "keyword" | "text" | "ip" | "geo_point" | "wildcard" | "constant_keyword"
        | "match_only_text" | "version" | "date" | "object" | "flattened" | "nested" => "string",
        "long" => "long",
        "integer" | "short" | "byte" => "int",
        "float" | "half_float" | "scaled_float" | "double" => "double",
        "boolean" => "boolean",
        _ => {
            return Err(SchemaError::UnsupportedType {
                field_type: kind.to_string(),
                field: field
                    .sources()
                    .keys()
                    .next()
                    .cloned()
                    .unwrap_or_else(|| field.id().raw().to_string()),
            })
        }
    };

    if field.is_array() {
        Ok(json!({"type": "array", "items": avro_type}))
    } else {
        Ok(Value::String(avro_type.to_string()))
    }
}
