//! Schema registry: type table, prefix table, subtype lattice
//!
//! The registry is process-wide and effectively append-only: registration
//! calls are idempotent and serialized behind an `RwLock`; reads take a
//! shared lock and see snapshot-consistent state.

use crate::{ClassSchema, ModelError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

#[derive(Default)]
struct Inner {
    /// type name -> schema
    types: FxHashMap<Arc<str>, Arc<ClassSchema>>,
    /// class IRI -> type names asserting it (registration order)
    by_class_iri: FxHashMap<Arc<str>, Vec<Arc<str>>>,
    /// prefix -> namespace IRI
    prefixes: FxHashMap<Arc<str>, Arc<str>>,
    /// type names whose namespace declarations were already processed
    namespaced: FxHashSet<Arc<str>>,
    /// abstract type name -> concrete type name
    factories: FxHashMap<Arc<str>, Arc<str>>,
}

/// Process-wide mapping registry
///
/// Holds the forward (type name → schema) and reverse (class IRI → candidate
/// types) maps, the prefix table, and the concrete-factory table for
/// abstract types. The reverse map is many-to-many: one class IRI may
/// resolve to several candidate native types.
pub struct SchemaRegistry {
    inner: RwLock<Inner>,
}

impl SchemaRegistry {
    /// Create a registry seeded with the baseline prefix table
    pub fn new() -> Self {
        let mut inner = Inner::default();
        for (prefix, ns) in tessera_vocab::prefixes::BASELINE {
            inner.prefixes.insert(Arc::from(*prefix), Arc::from(*ns));
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Register a type's mapping metadata
    ///
    /// The schema's namespace declarations are applied first (idempotently),
    /// then its class IRI, extra types, named-graph IRI, and field
    /// predicates are expanded against the prefix table. Registration is
    /// idempotent per type name: re-registering replaces the entry.
    pub fn register(&self, schema: ClassSchema) -> Arc<ClassSchema> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        apply_namespaces(&mut inner, &schema);

        let mut schema = schema;
        schema.class_iri = expand_in(&inner, &schema.class_iri);
        schema.extra_types = schema
            .extra_types
            .iter()
            .map(|t| expand_in(&inner, t))
            .collect();
        schema.graph = schema.graph.as_ref().map(|g| expand_in(&inner, g));
        for field in &mut schema.fields {
            field.predicate = expand_in(&inner, &field.predicate);
        }

        let schema = Arc::new(schema);
        for class_iri in schema.asserted_types() {
            let names = inner.by_class_iri.entry(class_iri.clone()).or_default();
            if !names.contains(&schema.name) {
                names.push(schema.name.clone());
            }
        }
        inner.types.insert(schema.name.clone(), schema.clone());
        schema
    }

    /// Apply a type's namespace declarations without re-registering it
    ///
    /// Idempotent per type name; the graph writer calls this on every write.
    pub fn ensure_namespaces(&self, schema: &ClassSchema) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        apply_namespaces(&mut inner, schema);
    }

    /// Register the concrete type to instantiate for an abstract type
    pub fn register_factory(&self, abstract_name: impl AsRef<str>, concrete_name: impl AsRef<str>) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        inner.factories.insert(
            Arc::from(abstract_name.as_ref()),
            Arc::from(concrete_name.as_ref()),
        );
    }

    /// Look up a schema by type name
    pub fn get(&self, name: &str) -> Result<Arc<ClassSchema>> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))
    }

    /// All candidate native types asserting the given class IRI
    pub fn resolve_candidates(&self, class_iri: &str) -> Vec<Arc<ClassSchema>> {
        let inner = self.inner.read().expect("registry lock poisoned");
        inner
            .by_class_iri
            .get(class_iri)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| inner.types.get(n).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Expand a prefixed name against the prefix table
    ///
    /// Names that already look expanded (contain `://` or use the `urn:` /
    /// `tag:` schemes) and names with an unknown prefix pass through
    /// unchanged.
    pub fn expand(&self, name: &str) -> String {
        let inner = self.inner.read().expect("registry lock poisoned");
        expand_in(&inner, name).to_string()
    }

    /// Check whether `sub` is a strict subtype of `sup` (never equal, never
    /// unrelated)
    pub fn is_strict_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return false;
        }
        let inner = self.inner.read().expect("registry lock poisoned");
        let mut pending: Vec<Arc<str>> = match inner.types.get(sub) {
            Some(schema) => schema.supers.clone(),
            None => return false,
        };
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        while let Some(name) = pending.pop() {
            if name.as_ref() == sup {
                return true;
            }
            if seen.insert(name.clone()) {
                if let Some(schema) = inner.types.get(&name) {
                    pending.extend(schema.supers.iter().cloned());
                }
            }
        }
        false
    }

    /// The concrete schema to instantiate for the given type
    ///
    /// Non-abstract types resolve to themselves. Abstract types follow the
    /// factory table (transitively) until a non-abstract schema is found.
    pub fn concrete_for(&self, name: &str) -> Result<Arc<ClassSchema>> {
        let inner = self.inner.read().expect("registry lock poisoned");
        let mut current: Arc<str> = Arc::from(name);
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        loop {
            let schema = inner
                .types
                .get(&current)
                .cloned()
                .ok_or_else(|| ModelError::UnknownType(current.to_string()))?;
            if !schema.is_abstract {
                return Ok(schema);
            }
            if !seen.insert(current.clone()) {
                return Err(ModelError::NotInstantiable(name.to_string()));
            }
            current = inner
                .factories
                .get(&current)
                .cloned()
                .ok_or_else(|| ModelError::NotInstantiable(current.to_string()))?;
        }
    }

    /// Snapshot of the prefix table, in prefix order
    pub fn prefixes(&self) -> BTreeMap<String, String> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .prefixes
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a schema's namespace declarations, at most once per type name
///
/// Redefining an existing prefix to a different namespace is not rejected:
/// last write wins, logged at warn.
fn apply_namespaces(inner: &mut Inner, schema: &ClassSchema) {
    if !inner.namespaced.insert(schema.name.clone()) {
        return;
    }
    for (prefix, ns) in &schema.namespaces {
        if let Some(previous) = inner.prefixes.get(prefix) {
            if previous != ns {
                warn!(
                    prefix = prefix.as_ref(),
                    previous = previous.as_ref(),
                    new = ns.as_ref(),
                    "prefix redefined, last write wins"
                );
            }
        }
        inner.prefixes.insert(prefix.clone(), ns.clone());
    }
}

fn expand_in(inner: &Inner, name: &str) -> Arc<str> {
    if name.contains("://") || name.starts_with("urn:") || name.starts_with("tag:") {
        return Arc::from(name);
    }
    if let Some((prefix, local)) = name.split_once(':') {
        if let Some(ns) = inner.prefixes.get(prefix) {
            return Arc::from(format!("{}{}", ns, local));
        }
    }
    Arc::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldKind, FieldSchema};

    fn registry_with_craft() -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("Spacecraft", "space:Spacecraft")
                .with_namespace("space", "http://purl.org/space/")
                .with_field(FieldSchema::new("agency", "space:agency", FieldKind::String)),
        );
        registry
    }

    #[test]
    fn test_expansion_at_registration() {
        let registry = registry_with_craft();
        let schema = registry.get("Spacecraft").unwrap();
        assert_eq!(schema.class_iri.as_ref(), "http://purl.org/space/Spacecraft");
        assert_eq!(
            schema.fields[0].predicate.as_ref(),
            "http://purl.org/space/agency"
        );
    }

    #[test]
    fn test_reverse_lookup() {
        let registry = registry_with_craft();
        let candidates = registry.resolve_candidates("http://purl.org/space/Spacecraft");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name.as_ref(), "Spacecraft");
        assert!(registry.resolve_candidates("http://example.org/none").is_empty());
    }

    #[test]
    fn test_namespace_registration_idempotent() {
        let registry = registry_with_craft();
        let before = registry.prefixes();
        // Re-registering the same type must not change the prefix table
        registry.register(
            ClassSchema::new("Spacecraft", "space:Spacecraft")
                .with_namespace("space", "http://example.org/other/"),
        );
        assert_eq!(registry.prefixes(), before);
    }

    #[test]
    fn test_prefix_redefinition_last_write_wins() {
        let registry = SchemaRegistry::new();
        registry.register(
            ClassSchema::new("A", "ex:A").with_namespace("ex", "http://example.org/a/"),
        );
        registry.register(
            ClassSchema::new("B", "ex:B").with_namespace("ex", "http://example.org/b/"),
        );
        assert_eq!(
            registry.expand("ex:thing"),
            "http://example.org/b/thing".to_string()
        );
    }

    #[test]
    fn test_strict_subtype() {
        let registry = SchemaRegistry::new();
        registry.register(ClassSchema::new("Vehicle", "http://example.org/Vehicle"));
        registry.register(
            ClassSchema::new("Craft", "http://example.org/Craft").with_super("Vehicle"),
        );
        registry.register(
            ClassSchema::new("Probe", "http://example.org/Probe").with_super("Craft"),
        );

        assert!(registry.is_strict_subtype("Craft", "Vehicle"));
        assert!(registry.is_strict_subtype("Probe", "Vehicle"));
        assert!(!registry.is_strict_subtype("Vehicle", "Craft"));
        assert!(!registry.is_strict_subtype("Craft", "Craft"));
        assert!(!registry.is_strict_subtype("Craft", "Probe"));
    }

    #[test]
    fn test_concrete_factory() {
        let registry = SchemaRegistry::new();
        registry.register(ClassSchema::new("Named", "http://example.org/Named").abstract_type());
        registry.register(
            ClassSchema::new("NamedImpl", "http://example.org/Named").with_super("Named"),
        );

        assert!(registry.concrete_for("Named").is_err());
        registry.register_factory("Named", "NamedImpl");
        assert_eq!(
            registry.concrete_for("Named").unwrap().name.as_ref(),
            "NamedImpl"
        );
        // Non-abstract resolves to itself
        assert_eq!(
            registry.concrete_for("NamedImpl").unwrap().name.as_ref(),
            "NamedImpl"
        );
    }

    #[test]
    fn test_expand_passthrough() {
        let registry = SchemaRegistry::new();
        assert_eq!(
            registry.expand("http://example.org/x"),
            "http://example.org/x"
        );
        assert_eq!(registry.expand("urn:tessera:abc"), "urn:tessera:abc");
        assert_eq!(registry.expand("nope:thing"), "nope:thing");
    }
}
