//! Indented text dump of the type graph

use super::{GenContext, Generator};
use crate::error::Result;
use crate::walk::{walk, Node, NodeKind, Visit};

pub struct DebugGenerator;

impl Generator for DebugGenerator {
    fn id(&self) -> &'static str {
        "debug"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn description(&self) -> &'static str {
        "Indented tree of every object, field and link"
    }

    fn generate(&self, ctx: &GenContext<'_>) -> Result<String> {
        let ns = ctx.namespace;
        let mut out = String::new();

        walk(ns, &mut |node: &Node<'_>| -> Result<Visit> {
            let line = match node.kind() {
                NodeKind::Root(_) => format!("[object] {}", node.name()),
                NodeKind::Ref(link) => {
                    format!("<ref> {} -> {}", link.name, ns.resolve(link).id())
                }
                NodeKind::Nested(link) => {
                    format!("<nested> {} -> {}", link.name, ns.resolve(link).id())
                }
                NodeKind::Field(field) => {
                    let array = if field.is_array() { "[]" } else { "" };
                    format!("(field) {}: {}{}", field.id(), field.field_type(), array)
                }
            };
            out.push_str(&"  ".repeat(node.depth()));
            out.push_str(&line);
            out.push('\n');
            Ok(Visit::Continue)
        })?;

        Ok(out)
    }
}
