//! Graph reader: subject description → populated entity record
//!
//! Reconstruction walks the description of one subject: resolve the working
//! type from asserted rdf:type values (strict subtypes only), materialize an
//! instance, then convert each predicate's object set through a grouping
//! conversion into the declared field kind. Nested resources recurse
//! (sharing the in-flight map for cycle safety) or become deferred
//! references on lazy fields; blank-node objects on multi-valued fields are
//! traversed as RDF lists.
//!
//! The in-flight map lives in a [`ReadScope`] created at the top of each
//! top-level read and dropped when it returns, success or failure - entries
//! can never leak into a later call.

use crate::codec::{self, ConvertError};
use crate::{MapperError, MappingContext, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tessera_graph_ir::{Graph, RdfKey, Term};
use tessera_model::{ClassSchema, Container, FieldKind, FieldSchema, Instance, Reference, Value};
use tessera_source::DataSource;
use tessera_vocab::rdf;
use tracing::warn;

/// Per-call-tree state: the in-flight map breaking reference cycles
///
/// One scope spans one top-level `read` and every recursive read beneath it.
#[derive(Default)]
pub struct ReadScope {
    in_flight: FxHashMap<RdfKey, Instance>,
}

impl ReadScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reconstruct the instance identified by `key`, declared as `type_name`
///
/// An empty description yields a bare instance (not an error).
pub fn read(
    ctx: &MappingContext,
    source: &dyn DataSource,
    type_name: &str,
    key: &RdfKey,
) -> Result<Instance> {
    let mut scope = ReadScope::new();
    read_in(ctx, source, type_name, key, &mut scope)
}

/// Recursive entry point sharing the caller's scope
pub(crate) fn read_in(
    ctx: &MappingContext,
    source: &dyn DataSource,
    type_name: &str,
    key: &RdfKey,
    scope: &mut ReadScope,
) -> Result<Instance> {
    // Re-entry for an id already being materialized in this call tree:
    // return the in-flight instance instead of recursing
    if let Some(in_flight) = scope.in_flight.get(key) {
        return Ok(in_flight.clone());
    }

    let description = source.describe(key)?;

    let declared = ctx.registry().get(type_name)?;
    let refined = resolve_subtype(ctx, declared, &description, key);
    let schema = if refined.is_abstract {
        ctx.registry().concrete_for(&refined.name)?
    } else {
        refined
    };

    let instance = Instance::new(schema);
    instance.assign_key(key.clone())?;

    if description.is_empty() {
        return Ok(instance);
    }

    scope.in_flight.insert(key.clone(), instance.clone());
    populate(ctx, source, &instance, description, scope)?;
    Ok(instance)
}

/// Re-describe an already-read instance and repopulate it in place
pub fn refresh(ctx: &MappingContext, source: &dyn DataSource, instance: &Instance) -> Result<()> {
    let key = instance.key().ok_or_else(|| {
        MapperError::invalid_entity(format!("cannot refresh {}: no identifier assigned", instance))
    })?;
    let description = source.describe(&key)?;
    instance.clear_fields();

    let mut scope = ReadScope::new();
    scope.in_flight.insert(key, instance.clone());
    populate(ctx, source, instance, description, &mut scope)
}

/// Walk asserted rdf:type values, adopting only strict subtypes of the
/// current working type, until no further refinement is found
fn resolve_subtype(
    ctx: &MappingContext,
    declared: Arc<ClassSchema>,
    description: &Graph,
    key: &RdfKey,
) -> Arc<ClassSchema> {
    let subject = key.as_term();
    let asserted: Vec<String> = description
        .objects(&subject, rdf::TYPE)
        .filter_map(|t| t.as_iri().map(str::to_string))
        .collect();

    let mut current = declared;
    loop {
        let mut changed = false;
        for class_iri in &asserted {
            for candidate in ctx.registry().resolve_candidates(class_iri) {
                if ctx
                    .registry()
                    .is_strict_subtype(&candidate.name, &current.name)
                {
                    current = candidate;
                    changed = true;
                }
            }
        }
        if !changed {
            return current;
        }
    }
}

/// Convert every mapped predicate group of the description into field values
fn populate(
    ctx: &MappingContext,
    source: &dyn DataSource,
    instance: &Instance,
    description: Graph,
    scope: &mut ReadScope,
) -> Result<()> {
    let schema = instance.schema();
    let key = instance
        .key()
        .ok_or_else(|| MapperError::invalid_entity("populating an instance with no identifier"))?;
    let subject = key.as_term();

    // Object sets per predicate, in first-encounter (SPO) order
    let mut groups: Vec<(Arc<str>, Vec<Term>)> = Vec::new();
    for triple in description.matching(&subject) {
        let Some(predicate) = triple.p.as_iri() else {
            continue;
        };
        match groups.iter_mut().find(|(p, _)| p.as_ref() == predicate) {
            Some((_, objects)) => objects.push(triple.o.clone()),
            None => groups.push((Arc::from(predicate), vec![triple.o.clone()])),
        }
    }

    let mut populator = Populator {
        ctx,
        source,
        description: &description,
        scope,
        consumed: Graph::new(),
    };

    for (predicate, objects) in &groups {
        if predicate.as_ref() == rdf::TYPE {
            // Consumed by subtype resolution
            for object in objects {
                populator
                    .consumed
                    .insert_triple(subject.clone(), Term::iri(rdf::TYPE), object.clone());
            }
            continue;
        }
        // Predicates with no mapped accessor are dropped - lossy by design
        let Some(field) = schema.field_by_predicate(predicate) else {
            continue;
        };

        if let Some(value) = populator.convert_group(field, objects)? {
            instance.set(field.name.clone(), value);
            for object in objects {
                populator.consumed.insert_triple(
                    subject.clone(),
                    Term::iri(predicate.as_ref()),
                    object.clone(),
                );
            }
        }
    }

    let consumed = populator.consumed;
    instance.set_instance_triples(consumed);
    instance.set_all_triples(description);
    Ok(())
}

/// One populate pass over a single description
struct Populator<'a> {
    ctx: &'a MappingContext,
    source: &'a dyn DataSource,
    description: &'a Graph,
    scope: &'a mut ReadScope,
    consumed: Graph,
}

impl Populator<'_> {
    /// Grouping conversion of one predicate's object set
    ///
    /// `None` means the whole group was skipped on tolerated schema drift.
    fn convert_group(&mut self, field: &FieldSchema, objects: &[Term]) -> Result<Option<Value>> {
        if field.container.is_multi() {
            let mut items = Vec::new();
            for object in objects {
                items.extend(self.convert_element(field, object)?);
            }
            let items = shape_container(field.container, items);
            return Ok(Some(Value::Many(items)));
        }

        // Literal-set disambiguation for a single-valued accessor
        let chosen: &Term = if objects.len() == 1 {
            &objects[0]
        } else {
            let has_resource = objects.iter().any(|o| o.is_resource());
            let pool: Vec<&Term> = if has_resource {
                objects.iter().collect()
            } else {
                self.filter_language(objects)
            };
            if pool.len() > 1 && !self.ctx.options().first_of_ambiguous {
                return Err(MapperError::AmbiguousScalar {
                    predicate: field.predicate.to_string(),
                    count: pool.len(),
                });
            }
            pool[0]
        };

        let mut converted = self.convert_element(field, chosen)?;
        Ok(match converted.len() {
            0 => None,
            _ => Some(converted.swap_remove(0)),
        })
    }

    /// Literals not matching the active language are filtered out when any
    /// matching one exists; otherwise the full set is kept
    fn filter_language<'t>(&self, objects: &'t [Term]) -> Vec<&'t Term> {
        let Some(active) = &self.ctx.options().language else {
            return objects.iter().collect();
        };
        let matching: Vec<&Term> = objects
            .iter()
            .filter(|o| matches!(o.as_literal(), Some((_, _, Some(lang))) if lang == active.as_str()))
            .collect();
        if matching.is_empty() {
            objects.iter().collect()
        } else {
            matching
        }
    }

    /// Convert one object term; a list traversal may yield several values
    /// (nested collections flatten), tolerated drift yields none
    fn convert_element(&mut self, field: &FieldSchema, object: &Term) -> Result<Vec<Value>> {
        match object {
            Term::Literal {
                lexical,
                datatype,
                language,
            } => match codec::from_literal(self.ctx, field, lexical, datatype, language.as_deref())
            {
                Ok(value) => Ok(vec![value]),
                Err(ConvertError::Mismatch(reason)) => {
                    warn!(field = %field.name, %reason, "skipping value on type mismatch");
                    Ok(Vec::new())
                }
                Err(ConvertError::Hard(err)) => Err(err),
            },
            // A blank node under a multi-valued accessor is the head of an
            // ordered list structure
            Term::Blank(_) if field.container.is_multi() => self.read_list(field, object),
            resource => Ok(self.convert_resource(field, resource)?.into_iter().collect()),
        }
    }

    /// Resource object → nested entity, deferred reference, or URI value
    fn convert_resource(&mut self, field: &FieldSchema, term: &Term) -> Result<Option<Value>> {
        let Some(key) = RdfKey::from_term(term) else {
            return Ok(None);
        };
        match &field.kind {
            FieldKind::Object(target) => {
                if field.lazy {
                    Ok(Some(Value::Ref(Reference::deferred(key, target.as_ref()))))
                } else {
                    let nested = read_in(self.ctx, self.source, target, &key, self.scope)?;
                    Ok(Some(Value::Entity(nested)))
                }
            }
            FieldKind::Uri => match term.as_iri() {
                Some(iri) => Ok(Some(Value::Uri(iri.to_string()))),
                None => {
                    warn!(field = %field.name, "skipping blank node for uri field");
                    Ok(None)
                }
            },
            other => {
                warn!(
                    field = %field.name,
                    kind = ?other,
                    "skipping resource object for non-reference field"
                );
                Ok(None)
            }
        }
    }

    /// Traverse an rdf:first/rdf:rest chain starting at `head`
    ///
    /// Nodes not covered by the subject description (the store convention is
    /// a single extra hop) are fetched with follow-up describe calls.
    fn read_list(&mut self, field: &FieldSchema, head: &Term) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut fetched = Graph::new();
        let mut visited: FxHashSet<Term> = FxHashSet::default();
        let mut node = head.clone();

        loop {
            if node.as_iri() == Some(rdf::NIL) {
                break;
            }
            if !visited.insert(node.clone()) {
                warn!(field = %field.name, "cyclic list structure, stopping traversal");
                break;
            }

            let covered = self.description.matching(&node).next().is_some()
                || fetched.matching(&node).next().is_some();
            if !covered {
                if let Some(node_key) = RdfKey::from_term(&node) {
                    fetched.merge(self.source.describe(&node_key)?);
                }
            }

            let first = self
                .description
                .objects(&node, rdf::FIRST)
                .next()
                .or_else(|| fetched.objects(&node, rdf::FIRST).next())
                .cloned();
            let rest = self
                .description
                .objects(&node, rdf::REST)
                .next()
                .or_else(|| fetched.objects(&node, rdf::REST).next())
                .cloned();

            match first {
                Some(element) => {
                    self.consumed.insert_triple(
                        node.clone(),
                        Term::iri(rdf::FIRST),
                        element.clone(),
                    );
                    items.extend(self.convert_element(field, &element)?);
                }
                None => {
                    warn!(field = %field.name, "list node without rdf:first, stopping traversal");
                    break;
                }
            }

            match rest {
                Some(next) => {
                    self.consumed
                        .insert_triple(node.clone(), Term::iri(rdf::REST), next.clone());
                    node = next;
                }
                None => break,
            }
        }
        Ok(items)
    }
}

/// Apply the declared container kind: lists keep everything in order, sets
/// dedupe, sorted sets rely on the SPO-ordered input
fn shape_container(container: Container, items: Vec<Value>) -> Vec<Value> {
    match container {
        Container::Single | Container::List => items,
        Container::Set | Container::SortedSet => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !out.contains(&item) {
                    out.push(item);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_model::{CascadePolicy, ClassSchema, SchemaRegistry};
    use tessera_source::MemoryStore;

    fn spacecraft_registry() -> SchemaRegistry {
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
        registry
    }

    fn ctx(registry: SchemaRegistry) -> MappingContext {
        MappingContext::new(Arc::new(registry))
    }

    fn seed_craft(store: &MemoryStore) {
        let mut graph = Graph::new();
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://purl.org/space/agency"),
            Term::string("U.S.S.R"),
        );
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://purl.org/space/alternateName"),
            Term::string("00001"),
        );
        store.add(&graph).unwrap();
    }

    #[test]
    fn test_spacecraft_scenario() {
        let store = MemoryStore::new();
        seed_craft(&store);
        let ctx = ctx(spacecraft_registry());

        let craft = read(
            &ctx,
            &store,
            "Spacecraft",
            &RdfKey::iri("http://example.org/craft/1"),
        )
        .unwrap();

        assert_eq!(craft.get("agency"), Some(Value::from("U.S.S.R")));
        assert_eq!(
            craft.get("alternateName"),
            Some(Value::Many(vec![Value::from("00001")]))
        );
    }

    #[test]
    fn test_empty_description_yields_bare_instance() {
        let store = MemoryStore::new();
        let ctx = ctx(spacecraft_registry());

        let craft = read(
            &ctx,
            &store,
            "Spacecraft",
            &RdfKey::iri("http://example.org/craft/none"),
        )
        .unwrap();
        assert_eq!(
            craft.key(),
            Some(RdfKey::iri("http://example.org/craft/none"))
        );
        assert!(craft.fields().is_empty());
        assert!(craft.instance_triples().is_none());
    }

    #[test]
    fn test_unmapped_predicate_dropped() {
        let store = MemoryStore::new();
        seed_craft(&store);
        let mut extra = Graph::new();
        extra.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://example.org/untracked"),
            Term::string("elsewhere"),
        );
        store.add(&extra).unwrap();

        let ctx = ctx(spacecraft_registry());
        let craft = read(
            &ctx,
            &store,
            "Spacecraft",
            &RdfKey::iri("http://example.org/craft/1"),
        )
        .unwrap();

        // Dropped from the fields, absent from the consumed triples, but
        // still present in the full description
        assert_eq!(craft.fields().len(), 2);
        let consumed = craft.instance_triples().unwrap();
        assert_eq!(consumed.len(), 2);
        assert_eq!(craft.all_triples().unwrap().len(), 3);
    }

    #[test]
    fn test_ambiguous_scalar() {
        let store = MemoryStore::new();
        let mut graph = Graph::new();
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://purl.org/space/agency"),
            Term::string("NASA"),
        );
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://purl.org/space/agency"),
            Term::string("U.S.S.R"),
        );
        store.add(&graph).unwrap();

        let ctx = ctx(spacecraft_registry());
        let err = read(
            &ctx,
            &store,
            "Spacecraft",
            &RdfKey::iri("http://example.org/craft/1"),
        )
        .unwrap_err();
        assert!(matches!(err, MapperError::AmbiguousScalar { count: 2, .. }));

        // Permissive mode takes the first candidate instead
        let permissive = MappingContext::with_options(
            Arc::new(spacecraft_registry()),
            crate::MapperOptions {
                first_of_ambiguous: true,
                ..Default::default()
            },
        );
        let craft = read(
            &permissive,
            &store,
            "Spacecraft",
            &RdfKey::iri("http://example.org/craft/1"),
        )
        .unwrap();
        assert!(craft.get("agency").is_some());
    }

    #[test]
    fn test_language_disambiguation() {
        let store = MemoryStore::new();
        let mut graph = Graph::new();
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://purl.org/space/agency"),
            Term::lang_string("NASA", "en"),
        );
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://purl.org/space/agency"),
            Term::lang_string("la NASA", "fr"),
        );
        store.add(&graph).unwrap();

        let ctx = MappingContext::with_options(
            Arc::new(spacecraft_registry()),
            crate::MapperOptions {
                language: Some("fr".into()),
                ..Default::default()
            },
        );
        let craft = read(
            &ctx,
            &store,
            "Spacecraft",
            &RdfKey::iri("http://example.org/craft/1"),
        )
        .unwrap();
        assert_eq!(craft.get("agency"), Some(Value::from("la NASA")));
    }

    #[test]
    fn test_cycle_safe_eager_references() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Craft", "http://example.org/Craft").with_field(
                FieldSchema::new(
                    "partner",
                    "http://example.org/partner",
                    FieldKind::Object(Arc::from("Craft")),
                )
                .cascade(CascadePolicy::all()),
            ),
        );
        let ctx = ctx(registry);

        let store = MemoryStore::new();
        let mut graph = Graph::new();
        graph.insert_triple(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/partner"),
            Term::iri("http://example.org/b"),
        );
        graph.insert_triple(
            Term::iri("http://example.org/b"),
            Term::iri("http://example.org/partner"),
            Term::iri("http://example.org/a"),
        );
        store.add(&graph).unwrap();

        let a = read(&ctx, &store, "Craft", &RdfKey::iri("http://example.org/a")).unwrap();
        let b = match a.get("partner") {
            Some(Value::Entity(b)) => b,
            other => panic!("expected eager entity, got {:?}", other),
        };
        // b's partner is the very same in-flight instance as a
        match b.get("partner") {
            Some(Value::Entity(back)) => assert_eq!(back, a),
            other => panic!("expected cycle back to a, got {:?}", other),
        }
    }

    #[test]
    fn test_lazy_reference_deferred() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Craft", "http://example.org/Craft").with_field(
                FieldSchema::new(
                    "operator",
                    "http://example.org/operator",
                    FieldKind::Object(Arc::from("Agency")),
                )
                .lazy(),
            ),
        );
        registry.register(
            ClassSchema::new("Agency", "http://example.org/Agency").with_field(FieldSchema::new(
                "name",
                "http://example.org/name",
                FieldKind::String,
            )),
        );
        let ctx = ctx(registry);

        let store = MemoryStore::new();
        let mut graph = Graph::new();
        graph.insert_triple(
            Term::iri("http://example.org/craft/1"),
            Term::iri("http://example.org/operator"),
            Term::iri("http://example.org/nasa"),
        );
        graph.insert_triple(
            Term::iri("http://example.org/nasa"),
            Term::iri("http://example.org/name"),
            Term::string("NASA"),
        );
        store.add(&graph).unwrap();

        let craft = read(
            &ctx,
            &store,
            "Craft",
            &RdfKey::iri("http://example.org/craft/1"),
        )
        .unwrap();
        let reference = match craft.get("operator") {
            Some(Value::Ref(r)) => r,
            other => panic!("expected deferred reference, got {:?}", other),
        };
        assert!(!reference.is_resolved());
        assert_eq!(reference.key(), RdfKey::iri("http://example.org/nasa"));

        // First access performs the deferred read and caches it
        let agency = reference
            .resolve_with(|key| read(&ctx, &store, reference.target(), key))
            .unwrap();
        assert_eq!(agency.get("name"), Some(Value::from("NASA")));
        assert!(reference.is_resolved());
    }

    #[test]
    fn test_subtype_resolution() {
        let registry = SchemaRegistry::new();
        registry.register(ClassSchema::new("Craft", "http://example.org/Craft"));
        registry.register(
            ClassSchema::new("Probe", "http://example.org/Probe")
                .with_super("Craft")
                .with_field(FieldSchema::new(
                    "target",
                    "http://example.org/target",
                    FieldKind::String,
                )),
        );
        // An unrelated type asserting the same class IRI must not be adopted
        registry.register(ClassSchema::new("Unrelated", "http://example.org/Probe"));
        let ctx = ctx(registry);

        let store = MemoryStore::new();
        let mut graph = Graph::new();
        graph.insert_triple(
            Term::iri("http://example.org/p1"),
            Term::iri(rdf::TYPE),
            Term::iri("http://example.org/Probe"),
        );
        graph.insert_triple(
            Term::iri("http://example.org/p1"),
            Term::iri("http://example.org/target"),
            Term::string("Jupiter"),
        );
        store.add(&graph).unwrap();

        let read_back = read(&ctx, &store, "Craft", &RdfKey::iri("http://example.org/p1")).unwrap();
        assert_eq!(read_back.type_name().as_ref(), "Probe");
        assert_eq!(read_back.get("target"), Some(Value::from("Jupiter")));
    }

    #[test]
    fn test_abstract_realized_through_factory() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Vessel", "http://example.org/Vessel").abstract_type(),
        );
        registry.register(
            ClassSchema::new("VesselImpl", "http://example.org/Vessel").with_super("Vessel"),
        );
        registry.register_factory("Vessel", "VesselImpl");
        let ctx = ctx(registry);

        let store = MemoryStore::new();
        let instance = read(
            &ctx,
            &store,
            "Vessel",
            &RdfKey::iri("http://example.org/v1"),
        )
        .unwrap();
        assert_eq!(instance.type_name().as_ref(), "VesselImpl");
    }

    #[test]
    fn test_refresh_replaces_fields() {
        let store = MemoryStore::new();
        seed_craft(&store);
        let ctx = ctx(spacecraft_registry());
        let key = RdfKey::iri("http://example.org/craft/1");

        let craft = read(&ctx, &store, "Spacecraft", &key).unwrap();
        assert_eq!(craft.get("agency"), Some(Value::from("U.S.S.R")));

        // Change the store out from under the instance
        let described = store.describe(&key).unwrap();
        store.remove(&described).unwrap();
        let mut updated = Graph::new();
        updated.insert_triple(
            key.as_term(),
            Term::iri("http://purl.org/space/agency"),
            Term::string("Roscosmos"),
        );
        store.add(&updated).unwrap();

        refresh(&ctx, &store, &craft).unwrap();
        assert_eq!(craft.get("agency"), Some(Value::from("Roscosmos")));
        assert_eq!(craft.get("alternateName"), None);
    }
}
