//! Graph writer: entity record → triple set
//!
//! Produces the minimal triple set representing one instance. Nested
//! entities contribute only their identifiers (minted on demand); recursing
//! into them is the persistence engine's job, driven by cascade policy.
//!
//! Writing is idempotent: a second call on an unchanged entity yields the
//! same triple set. The identifier is only minted once, and RDF list nodes
//! use labels derived from the subject and predicate rather than fresh
//! random ones.

use crate::identity::{list_label, resolve_identity, validate_entity};
use crate::{codec, MappingContext, Result};
use tessera_graph_ir::{Graph, Term};
use tessera_model::{FieldSchema, Instance, Value};
use tessera_vocab::rdf;
use tracing::debug;

/// Serialize an instance into its triple set
pub fn write(ctx: &MappingContext, instance: &Instance) -> Result<Graph> {
    validate_entity(instance)?;
    let schema = instance.schema();
    let key = resolve_identity(instance)?;
    ctx.registry().ensure_namespaces(&schema);

    let subject = key.as_term();
    let mut graph = Graph::new();

    for class_iri in schema.asserted_types() {
        graph.insert_triple(
            subject.clone(),
            Term::iri(rdf::TYPE),
            Term::iri(class_iri.as_ref()),
        );
    }

    for field in &schema.fields {
        if field.transient {
            continue;
        }
        let value = match instance.get(&field.name) {
            Some(v) if !v.is_empty_string() => v,
            _ => continue,
        };

        match &value {
            Value::Many(items) => {
                if field.rdf_list {
                    write_list(ctx, &mut graph, &subject, field, items)?;
                } else {
                    for item in items {
                        let object = codec::to_rdf(ctx, field, item)?;
                        graph.insert_triple(
                            subject.clone(),
                            Term::iri(field.predicate.as_ref()),
                            object,
                        );
                    }
                }
            }
            scalar => {
                let object = codec::to_rdf(ctx, field, scalar)?;
                graph.insert_triple(subject.clone(), Term::iri(field.predicate.as_ref()), object);
            }
        }
    }

    debug!(instance = %instance, triples = graph.len(), "serialized");
    Ok(graph)
}

/// Emit the elements as an rdf:first/rdf:rest chain off a blank head node
fn write_list(
    ctx: &MappingContext,
    graph: &mut Graph,
    subject: &Term,
    field: &FieldSchema,
    items: &[Value],
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let subject_label = match subject {
        Term::Iri(iri) => iri.as_ref().to_string(),
        other => other.to_string(),
    };

    let mut nodes = Vec::with_capacity(items.len());
    for index in 0..items.len() {
        nodes.push(Term::blank(list_label(
            &subject_label,
            &field.predicate,
            index,
        )));
    }

    graph.insert_triple(
        subject.clone(),
        Term::iri(field.predicate.as_ref()),
        nodes[0].clone(),
    );
    for (index, item) in items.iter().enumerate() {
        let object = codec::to_rdf(ctx, field, item)?;
        graph.insert_triple(nodes[index].clone(), Term::iri(rdf::FIRST), object);
        let rest = if index + 1 < items.len() {
            nodes[index + 1].clone()
        } else {
            Term::iri(rdf::NIL)
        };
        graph.insert_triple(nodes[index].clone(), Term::iri(rdf::REST), rest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_model::{ClassSchema, Container, FieldKind, SchemaRegistry};
    use tessera_vocab::xsd;

    fn context() -> MappingContext {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Spacecraft", "http://purl.org/space/Spacecraft")
                .with_field(FieldSchema::new(
                    "agency",
                    "http://purl.org/space/agency",
                    FieldKind::String,
                ))
                .with_field(
                    FieldSchema::new(
                        "alternateName",
                        "http://purl.org/space/alternateName",
                        FieldKind::String,
                    )
                    .container(Container::List),
                ),
        );
        MappingContext::new(Arc::new(registry))
    }

    fn instance(ctx: &MappingContext) -> Instance {
        Instance::new(ctx.registry().get("Spacecraft").unwrap())
    }

    #[test]
    fn test_mints_and_emits_type_plus_fields() {
        let ctx = context();
        let craft = instance(&ctx);
        craft.set("agency", Value::from("U.S.S.R"));

        let graph = write(&ctx, &craft).unwrap();
        let key = craft.key().expect("identifier assigned by write");
        let subject = key.as_term();

        // One rdf:type assertion plus one triple per non-null mapped field
        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph
                .objects(&subject, tessera_vocab::rdf::TYPE)
                .next()
                .unwrap(),
            &Term::iri("http://purl.org/space/Spacecraft")
        );
        assert_eq!(
            graph
                .objects(&subject, "http://purl.org/space/agency")
                .next()
                .unwrap(),
            &Term::string("U.S.S.R")
        );
    }

    #[test]
    fn test_idempotent() {
        let ctx = context();
        let craft = instance(&ctx);
        craft.set("agency", Value::from("NASA"));
        craft.set(
            "alternateName",
            Value::Many(vec![Value::from("00001"), Value::from("Sputnik")]),
        );

        let first = write(&ctx, &craft).unwrap();
        let key_after_first = craft.key();
        let second = write(&ctx, &craft).unwrap();

        assert_eq!(first, second);
        assert_eq!(craft.key(), key_after_first);
    }

    #[test]
    fn test_null_and_empty_string_skipped() {
        let ctx = context();
        let craft = instance(&ctx);
        craft.set("agency", Value::from(""));

        let graph = write(&ctx, &craft).unwrap();
        // Only the rdf:type assertion remains
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_multi_valued_one_triple_per_element() {
        let ctx = context();
        let craft = instance(&ctx);
        craft.set(
            "alternateName",
            Value::Many(vec![Value::from("00001"), Value::from("Sputnik")]),
        );

        let graph = write(&ctx, &craft).unwrap();
        let subject = craft.key().unwrap().as_term();
        let names: Vec<_> = graph
            .objects(&subject, "http://purl.org/space/alternateName")
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_rdf_list_emission() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Mission", "http://example.org/Mission").with_field(
                FieldSchema::new("stages", "http://example.org/stages", FieldKind::String)
                    .container(Container::List)
                    .rdf_list(),
            ),
        );
        let ctx = MappingContext::new(Arc::new(registry));
        let mission = Instance::new(ctx.registry().get("Mission").unwrap());
        mission.set(
            "stages",
            Value::Many(vec![Value::from("launch"), Value::from("orbit")]),
        );

        let graph = write(&ctx, &mission).unwrap();
        let subject = mission.key().unwrap().as_term();

        // head link + 2 x (first, rest) + rdf:type
        assert_eq!(graph.len(), 6);

        let head = graph
            .objects(&subject, "http://example.org/stages")
            .next()
            .unwrap()
            .clone();
        assert!(head.is_blank());

        let first = graph.objects(&head, rdf::FIRST).next().unwrap();
        assert_eq!(first, &Term::string("launch"));

        let rest = graph.objects(&head, rdf::REST).next().unwrap().clone();
        let second = graph.objects(&rest, rdf::FIRST).next().unwrap();
        assert_eq!(second, &Term::string("orbit"));
        assert_eq!(
            graph.objects(&rest, rdf::REST).next().unwrap(),
            &Term::iri(rdf::NIL)
        );
    }

    #[test]
    fn test_nested_entity_contributes_identifier_only() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Craft", "http://example.org/Craft").with_field(FieldSchema::new(
                "operator",
                "http://example.org/operator",
                FieldKind::Object(Arc::from("Agency")),
            )),
        );
        registry.register(ClassSchema::new("Agency", "http://example.org/Agency"));
        let ctx = MappingContext::new(Arc::new(registry));

        let agency = Instance::new(ctx.registry().get("Agency").unwrap());
        agency
            .assign_key(tessera_graph_ir::RdfKey::iri("http://example.org/nasa"))
            .unwrap();
        let craft = Instance::new(ctx.registry().get("Craft").unwrap());
        craft.set("operator", Value::Entity(agency));

        let graph = write(&ctx, &craft).unwrap();
        let subject = craft.key().unwrap().as_term();
        assert_eq!(
            graph
                .objects(&subject, "http://example.org/operator")
                .next()
                .unwrap(),
            &Term::iri("http://example.org/nasa")
        );
        // The agency's own fields are not inlined
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_weak_typing_writes_untyped() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Reading", "http://example.org/Reading").with_field(
                FieldSchema::new("count", "http://example.org/count", FieldKind::Long),
            ),
        );
        let options = crate::MapperOptions {
            weak_typing: true,
            ..Default::default()
        };
        let ctx = MappingContext::with_options(Arc::new(registry), options);
        let reading = Instance::new(ctx.registry().get("Reading").unwrap());
        reading.set("count", Value::Long(99));

        let graph = write(&ctx, &reading).unwrap();
        let subject = reading.key().unwrap().as_term();
        let object = graph
            .objects(&subject, "http://example.org/count")
            .next()
            .unwrap();
        let (lexical, datatype, _) = object.as_literal().unwrap();
        assert_eq!(lexical, "99");
        assert_eq!(datatype.as_iri(), xsd::STRING);
    }
}
