//! In-memory reference store
//!
//! Named-graph partitions over plain triple sets, with snapshot-based
//! transactions. This is the store the integration suites run against; it is
//! not a query engine, so the query methods keep their unsupported defaults.

use crate::{DataSource, Result, SourceError};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tessera_graph_ir::{Graph, RdfKey, Term};

#[derive(Default, Clone)]
struct Partitions {
    /// named graph IRI (None = default graph) -> triples
    graphs: BTreeMap<Option<String>, Graph>,
}

impl Partitions {
    fn subject_triples(&self, subject: &Term) -> Graph {
        let mut out = Graph::new();
        for graph in self.graphs.values() {
            out.extend(graph.matching(subject).cloned());
        }
        out
    }

    fn has_subject(&self, subject: &Term) -> bool {
        self.graphs
            .values()
            .any(|g| g.matching(subject).next().is_some())
    }
}

#[derive(Default)]
struct StoreInner {
    live: Partitions,
    /// Snapshot taken at begin(); present while a transaction is open
    snapshot: Option<Partitions>,
}

/// In-memory triple store with named graphs and snapshot transactions
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total triple count across all graphs
    pub fn len(&self) -> usize {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.live.graphs.values().map(|g| g.len()).sum()
    }

    /// Check if the store holds no triples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of one graph partition (None = default graph)
    pub fn partition(&self, graph_iri: Option<&str>) -> Graph {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .live
            .graphs
            .get(&graph_iri.map(str::to_string))
            .cloned()
            .unwrap_or_default()
    }

    fn add_into(&self, name: Option<String>, graph: &Graph) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner
            .live
            .graphs
            .entry(name)
            .or_default()
            .extend(graph.iter().cloned());
    }

    fn remove_from(&self, name: Option<String>, graph: &Graph) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if let Some(target) = inner.live.graphs.get_mut(&name) {
            for triple in graph.iter() {
                target.remove(triple);
            }
        }
    }
}

impl DataSource for MemoryStore {
    fn describe(&self, key: &RdfKey) -> Result<Graph> {
        let inner = self.inner.read().expect("store lock poisoned");
        let subject = key.as_term();
        let mut out = inner.live.subject_triples(&subject);

        // One additional hop for blank-node objects, so list heads and other
        // anonymous structures arrive with their subject's description.
        let hop: Vec<Term> = out
            .iter()
            .filter(|t| t.o.is_blank())
            .map(|t| t.o.clone())
            .collect();
        for blank in hop {
            out.merge(inner.live.subject_triples(&blank));
        }
        Ok(out)
    }

    fn add(&self, graph: &Graph) -> Result<()> {
        self.add_into(None, graph);
        Ok(())
    }

    fn add_named(&self, graph_iri: &str, graph: &Graph) -> Result<()> {
        self.add_into(Some(graph_iri.to_string()), graph);
        Ok(())
    }

    fn remove(&self, graph: &Graph) -> Result<()> {
        self.remove_from(None, graph);
        Ok(())
    }

    fn remove_named(&self, graph_iri: &str, graph: &Graph) -> Result<()> {
        self.remove_from(Some(graph_iri.to_string()), graph);
        Ok(())
    }

    fn exists(&self, key: &RdfKey) -> Result<bool> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.live.has_subject(&key.as_term()))
    }

    fn begin(&self) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.snapshot.is_some() {
            return Err(SourceError::transaction("transaction already open"));
        }
        inner.snapshot = Some(inner.live.clone());
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.snapshot.take().is_none() {
            return Err(SourceError::transaction("no open transaction"));
        }
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        match inner.snapshot.take() {
            Some(snapshot) => {
                inner.live = snapshot;
                Ok(())
            }
            None => Err(SourceError::transaction("no open transaction")),
        }
    }

    fn supports_named_graphs(&self) -> bool {
        true
    }

    fn supports_transactions(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_graph_ir::Triple;

    fn triple(s: &str, p: &str, o: Term) -> Triple {
        Triple::new(Term::iri(s), Term::iri(p), o)
    }

    fn seed() -> MemoryStore {
        let store = MemoryStore::new();
        let mut g = Graph::new();
        g.insert(triple(
            "http://example.org/craft/1",
            "http://purl.org/space/agency",
            Term::string("U.S.S.R"),
        ));
        g.insert(triple(
            "http://example.org/craft/1",
            "http://purl.org/space/alternateName",
            Term::string("00001"),
        ));
        store.add(&g).unwrap();
        store
    }

    #[test]
    fn test_describe_subject() {
        let store = seed();
        let described = store
            .describe(&RdfKey::iri("http://example.org/craft/1"))
            .unwrap();
        assert_eq!(described.len(), 2);

        let absent = store
            .describe(&RdfKey::iri("http://example.org/craft/2"))
            .unwrap();
        assert!(absent.is_empty());
    }

    #[test]
    fn test_describe_includes_blank_hop() {
        let store = MemoryStore::new();
        let mut g = Graph::new();
        g.insert(triple(
            "http://example.org/s",
            "http://example.org/p",
            Term::blank("b0"),
        ));
        g.insert(Triple::new(
            Term::blank("b0"),
            Term::iri("http://example.org/q"),
            Term::string("inner"),
        ));
        store.add(&g).unwrap();

        let described = store.describe(&RdfKey::iri("http://example.org/s")).unwrap();
        assert_eq!(described.len(), 2);
    }

    #[test]
    fn test_exists_and_remove() {
        let store = seed();
        let key = RdfKey::iri("http://example.org/craft/1");
        assert!(store.exists(&key).unwrap());

        let described = store.describe(&key).unwrap();
        store.remove(&described).unwrap();
        assert!(!store.exists(&key).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_named_graph_isolation() {
        let store = MemoryStore::new();
        let mut g = Graph::new();
        g.insert(triple(
            "http://example.org/s",
            "http://example.org/p",
            Term::string("x"),
        ));
        store.add_named("http://example.org/graphs/a", &g).unwrap();

        assert!(store.partition(None).is_empty());
        assert_eq!(store.partition(Some("http://example.org/graphs/a")).len(), 1);
        // describe sees all partitions
        assert!(store.exists(&RdfKey::iri("http://example.org/s")).unwrap());
    }

    #[test]
    fn test_transaction_rollback() {
        let store = seed();
        store.begin().unwrap();
        let mut g = Graph::new();
        g.insert(triple(
            "http://example.org/extra",
            "http://example.org/p",
            Term::string("x"),
        ));
        store.add(&g).unwrap();
        assert_eq!(store.len(), 3);

        store.rollback().unwrap();
        assert_eq!(store.len(), 2);

        // Commit path keeps the writes
        store.begin().unwrap();
        store.add(&g).unwrap();
        store.commit().unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_query_capabilities_unsupported() {
        // MemoryStore is not a query engine; the dialect methods keep their
        // unsupported defaults
        let store = MemoryStore::new();
        assert!(matches!(
            store.select_query("SELECT * WHERE { ?s ?p ?o }"),
            Err(SourceError::Unsupported(_))
        ));
        assert!(matches!(
            store.graph_query("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }"),
            Err(SourceError::Unsupported(_))
        ));
    }

    #[test]
    fn test_transaction_state_errors() {
        let store = MemoryStore::new();
        assert!(store.commit().is_err());
        assert!(store.rollback().is_err());
        store.begin().unwrap();
        assert!(store.begin().is_err());
        store.commit().unwrap();
    }
}
