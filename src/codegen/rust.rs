//! Rust Code Emitter
//!
//! One serde struct per object, in snake-case order. Every member is
//! optional because documents carry any subset of the schema. Links that
//! close a cycle are boxed.

use super::{members, GenContext, Generator, Member};
use crate::error::{Result, SchemaError};
use crate::graph::{Field, Object, ObjectId, RecursionInfo};
use crate::naming::Identifier;

/// First line of every generated file
pub const HEADER: &str = "// Code generated by fieldset-gen; DO NOT EDIT.\n";

pub struct RustGenerator;

impl Generator for RustGenerator {
    fn id(&self) -> &'static str {
        "rust"
    }

    fn extension(&self) -> &'static str {
        "rs"
    }

    fn description(&self) -> &'static str {
        "Serde structs, one per type"
    }

    fn generate(&self, ctx: &GenContext<'_>) -> Result<String> {
        let recursion = RecursionInfo::compute(ctx.namespace);

        let mut output = String::new();
        output.push_str(HEADER);
        output.push('\n');
        output.push_str("use serde::{Deserialize, Serialize};\n");

        for (handle, object) in ctx.namespace.sorted_objects() {
            output.push('\n');
            emit_struct(&mut output, ctx, &recursion, handle, object)?;
        }

        Ok(output)
    }
}

// =============================================================================
// Struct Emission
// =============================================================================

fn emit_struct(
    output: &mut String,
    ctx: &GenContext<'_>,
    recursion: &RecursionInfo,
    handle: ObjectId,
    object: &Object,
) -> Result<()> {
    if let Some(doc) = object
        .source()
        .and_then(|def| def.short.as_deref().or(def.description.as_deref()))
    {
        emit_doc(output, "", doc);
    }
    output.push_str(&format!(
        "#[derive({})]\n",
        ctx.settings.rust.derives.join(", ")
    ));
    output.push_str(&format!("pub struct {} {{\n", object.id().pascal(ctx.casing)));

    for member in members(object)? {
        match member {
            Member::Field(field) => {
                if let Some(doc) = field.description() {
                    emit_doc(output, "    ", doc);
                }
                emit_member(output, field.id(), &field_type(field)?);
            }
            Member::Link { link, array } => {
                let target = ctx.namespace.resolve(link).id().pascal(ctx.casing);
                let rust_type = if array {
                    format!("Vec<{}>", target)
                } else if recursion.needs_boxing(handle, link.target) {
                    format!("Box<{}>", target)
                } else {
                    target
                };
                emit_member(output, &link.name, &rust_type);
            }
        }
    }

    output.push_str("}\n");
    Ok(())
}

fn emit_member(output: &mut String, name: &Identifier, rust_type: &str) {
    let member = escape_keyword(&name.snake());
    // serde drops the `r#` prefix on its own
    if member.trim_start_matches("r#") != name.raw() {
        output.push_str(&format!(
            "    #[serde(rename = \"{}\", skip_serializing_if = \"Option::is_none\")]\n",
            name.raw()
        ));
    } else {
        output.push_str("    #[serde(skip_serializing_if = \"Option::is_none\")]\n");
    }
    output.push_str(&format!("    pub {}: Option<{}>,\n", member, rust_type));
}

/// First line of a description as a doc comment
fn emit_doc(output: &mut String, indent: &str, doc: &str) {
    if let Some(line) = doc.lines().map(str::trim).find(|l| !l.is_empty()) {
        output.push_str(&format!("{}/// {}\n", indent, line));
    }
}

// =============================================================================
// Type Mapping
// =============================================================================

fn field_type(field: &Field) -> Result<String> {
    let scalar = scalar_type(field.field_type()).ok_or_else(|| SchemaError::UnsupportedType {
        field_type: field.field_type().to_string(),
        field: field
            .sources()
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| field.id().raw().to_string()),
    })?;

    if field.is_array() {
        Ok(format!("Vec<{}>", scalar))
    } else {
        Ok(scalar.to_string())
    }
}

/// Rust type for a scalar kind
pub fn scalar_type(kind: &str) -> Option<&'static str> {
    let rust_type = match kind {
        "keyword" | "text" | "ip" | "geo_point" | "wildcard" | "constant_keyword"
        | "match_only_text" | "version" => "String",
        "long" => "i64",
        "integer" => "i32",
        "short" => "i16",
        "byte" => "i8",
        "float" | "half_float" | "scaled_float" | "double" => "f64",
        "date" => "chrono::DateTime<chrono::Utc>",
        "boolean" => "bool",
        "object" => "serde_json::Map<String, serde_json::Value>",
        "flattened" => "std::collections::HashMap<String, String>",
        "nested" => "Vec<serde_json::Value>",
        _ => return None,
    };
    Some(rust_type)
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "async",
    "await", "dyn", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "typeof", "unsized", "virtual", "yield", "try",
];

/// Path keywords cannot be raw identifiers
const PATH_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Escape keywords: `type` -> `r#type`, `crate` -> `crate_`
fn escape_keyword(name: &str) -> String {
    if PATH_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratorSettings;
    use crate::filter::FieldFilter;
    use crate::graph::Namespace;
    use crate::naming::Casing;
    use crate::schema::{FieldDef, TypeDef};

    fn render(defs: &[TypeDef]) -> Result<String> {
        let ns = Namespace::build(defs, &FieldFilter::allow_all())?;
        let casing = Casing::default();
        let settings = GeneratorSettings::default();
        RustGenerator.generate(&GenContext::new(&ns, &casing, &settings))
    }

    #[test]
    fn test_structs_and_links() {
        let out = render(&[
            TypeDef {
                description: Some("Fields about the client side.\nMore detail.".to_string()),
                ..TypeDef::new("client")
            }
            .with_field(FieldDef::new("ip", "ip").with_description("IP of the client."))
            .with_field(FieldDef::new("nat.port", "long"))
            .with_field(FieldDef::new("domains", "keyword").as_array()),
            TypeDef::new("as")
                .with_field(FieldDef::new("number", "long"))
                .reused_in(["client"]),
        ])
        .unwrap();

        assert!(out.starts_with(HEADER));
        assert!(out.contains("/// Fields about the client side.\n#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]\npub struct Client {\n"));
        assert!(out.contains("    /// IP of the client.\n    #[serde(skip_serializing_if = \"Option::is_none\")]\n    pub ip: Option<String>,\n"));
        assert!(out.contains("    pub domains: Option<Vec<String>>,\n"));
        assert!(out.contains("    pub nat: Option<ClientNAT>,\n"));
        assert!(out.contains("    pub r#as: Option<AS>,\n"));
        assert!(out.contains("pub struct ClientNAT {\n"));
        assert!(out.contains("    pub port: Option<i64>,\n"));
        assert!(!out.contains("More detail."));

        // struct order follows snake-case ids
        let as_pos = out.find("pub struct AS ").unwrap();
        let client_pos = out.find("pub struct Client ").unwrap();
        assert!(as_pos < client_pos);
    }

    #[test]
    fn test_renamed_members() {
        let out = render(&[TypeDef {
            root: true,
            ..TypeDef::new("base")
        }
        .with_field(FieldDef::new("@timestamp", "date"))
        .with_field(FieldDef::new("type", "keyword"))])
        .unwrap();

        assert!(out.contains(
            "    #[serde(rename = \"@timestamp\", skip_serializing_if = \"Option::is_none\")]\n    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,\n"
        ));
        assert!(out.contains("    pub r#type: Option<String>,\n"));
    }

    #[test]
    fn test_recursive_link_is_boxed() {
        let out = render(&[TypeDef::new("process")
            .with_field(FieldDef::new("pid", "long"))
            .reused_in(["process"])])
        .unwrap();
        assert!(out.contains("    pub process: Option<Box<Process>>,\n"));
    }

    #[test]
    fn test_unknown_scalar_type() {
        let err = render(&[TypeDef::new("host").with_field(FieldDef::new("uptime.raw", "duration"))])
            .unwrap_err();
        match err {
            SchemaError::UnsupportedType { field_type, field } => {
                assert_eq!(field_type, "duration");
                assert_eq!(field, "uptime.raw");
            }
            other => panic!("Expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_container_field_folds_into_link() {
        let out = render(&[TypeDef::new("dns")
            .with_field(FieldDef::new("answers", "object").as_array())
            .with_field(FieldDef::new("answers.name", "keyword"))
            .with_field(FieldDef::new("log", "object"))
            .with_field(FieldDef::new("log.level", "keyword"))])
        .unwrap();

        let dns = &out[out.find("pub struct DNS {").unwrap()..];
        let dns = &dns[..dns.find("}\n").unwrap()];
        assert_eq!(dns.matches("pub answers:").count(), 1);
        assert!(dns.contains("    pub answers: Option<Vec<DNSAnswers>>,\n"));
        assert!(dns.contains("    pub log: Option<DNSLog>,\n"));
        assert!(out.contains("pub struct DNSAnswers {\n"));
    }

    #[test]
    fn test_member_collision_is_reported() {
        let err = render(&[TypeDef {
            root: true,
            ..TypeDef::new("base")
        }
        .with_field(FieldDef::new("@timestamp", "date"))
        .with_field(FieldDef::new("timestamp", "date"))])
        .unwrap_err();
        match err {
            SchemaError::MemberCollision {
                type_name,
                member,
                first,
                second,
            } => {
                assert_eq!(type_name, "base");
                assert_eq!(member, "timestamp");
                assert_eq!(first, "@timestamp");
                assert_eq!(second, "timestamp");
            }
            other => panic!("Expected MemberCollision, got {:?}", other),
        }

        // a scalar field cannot fold into a link of the same name
        let err = render(&[TypeDef::new("log")
            .with_field(FieldDef::new("syslog", "keyword"))
            .with_field(FieldDef::new("syslog.priority", "long"))])
        .unwrap_err();
        assert!(matches!(err, SchemaError::MemberCollision { .. }));
    }

    #[test]
    fn test_path_keywords_get_suffix() {
        assert_eq!(escape_keyword("crate"), "crate_");
        assert_eq!(escape_keyword("self"), "self_");
        assert_eq!(escape_keyword("super"), "super_");
        assert_eq!(escape_keyword("Self"), "Self_");
        assert_eq!(escape_keyword("type"), "r#type");
        assert_eq!(escape_keyword("name"), "name");

        let out = render(&[TypeDef::new("package")
            .with_field(FieldDef::new("crate", "keyword"))])
        .unwrap();
        assert!(out.contains(
            "    #[serde(rename = \"crate\", skip_serializing_if = \"Option::is_none\")]\n    pub crate_: Option<String>,\n"
        ));
    }

    #[test]
    fn test_custom_derives() {
        let ns = Namespace::build(
            &[TypeDef::new("agent").with_field(FieldDef::new("id", "keyword"))],
            &FieldFilter::allow_all(),
        )
        .unwrap();
        let casing = Casing::default();
        let mut settings = GeneratorSettings::default();
        settings.rust.derives = vec!["Debug".to_string(), "Serialize".to_string()];
        let out = RustGenerator
            .generate(&GenContext::new(&ns, &casing, &settings))
            .unwrap();
        assert!(out.contains("#[derive(Debug, Serialize)]\npub struct Agent {\n"));
    }
}
