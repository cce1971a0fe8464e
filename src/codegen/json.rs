//! JSON snapshot of the type graph

use super::{GenContext, Generator};
use crate::error::Result;

pub struct JsonGenerator;

impl Generator for JsonGenerator {
    fn id(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn description(&self) -> &'static str {
        "Pretty-printed snapshot of every type, field and link"
    }

    fn generate(&self, ctx: &GenContext<'_>) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&ctx.namespace.snapshot())?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratorSettings;
    use crate::filter::FieldFilter;
    use crate::graph::{Namespace, NamespaceSnapshot};
    use crate::naming::Casing;
    use crate::schema::{FieldDef, TypeDef};

    #[test]
    fn test_json_round_trips_snapshot() {
        let defs = [TypeDef::new("client")
            .with_field(FieldDef::new("ip", "ip"))
            .with_field(FieldDef::new("nat.port", "long"))];
        let ns = Namespace::build(&defs, &FieldFilter::allow_all()).unwrap();
        let casing = Casing::default();
        let settings = GeneratorSettings::default();

        let out = JsonGenerator
            .generate(&GenContext::new(&ns, &casing, &settings))
            .unwrap();
        let parsed: NamespaceSnapshot = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, ns.snapshot());
        assert_eq!(parsed.types["client_nat"].fields["port"].field_type, "long");
    }
}
