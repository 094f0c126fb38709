//! The consumed `DataSource` capability
//!
//! Everything the engines need from a triple store. Implementations wrap a
//! concrete store (SPARQL endpoint, embedded store, the in-memory reference
//! store); the engines never see the store's wire protocol or query dialect.

use crate::{Result, SourceError};
use std::collections::BTreeMap;
use tessera_graph_ir::{Graph, RdfKey, Term};

/// One row of a select-query result: variable name → bound term
pub type Binding = BTreeMap<String, Term>;

/// Blocking triple store capability
///
/// Named-graph and transaction support are optional; the `supports_*`
/// probes tell the persistence engine which execution path to take. A store
/// without transaction support makes each add/remove independently durable,
/// so `begin`/`commit`/`rollback` default to no-ops.
pub trait DataSource {
    /// All triples with the given subject, plus (conventionally) one
    /// additional hop for blank-node objects
    fn describe(&self, key: &RdfKey) -> Result<Graph>;

    /// Add a graph to the default graph
    fn add(&self, graph: &Graph) -> Result<()>;

    /// Add a graph to a named graph
    fn add_named(&self, graph_iri: &str, graph: &Graph) -> Result<()> {
        let _ = (graph_iri, graph);
        Err(SourceError::unsupported("named graphs"))
    }

    /// Remove a graph from the default graph
    fn remove(&self, graph: &Graph) -> Result<()>;

    /// Remove a graph from a named graph
    fn remove_named(&self, graph_iri: &str, graph: &Graph) -> Result<()> {
        let _ = (graph_iri, graph);
        Err(SourceError::unsupported("named graphs"))
    }

    /// Evaluate a select query in the store's own dialect
    fn select_query(&self, query: &str) -> Result<Vec<Binding>> {
        let _ = query;
        Err(SourceError::unsupported("select queries"))
    }

    /// Evaluate a graph query in the store's own dialect
    fn graph_query(&self, query: &str) -> Result<Graph> {
        let _ = query;
        Err(SourceError::unsupported("graph queries"))
    }

    /// Check whether any triple asserts the given subject
    fn exists(&self, key: &RdfKey) -> Result<bool>;

    /// Begin a transaction (no-op without transaction support)
    fn begin(&self) -> Result<()> {
        Ok(())
    }

    /// Commit the current transaction (no-op without transaction support)
    fn commit(&self) -> Result<()> {
        Ok(())
    }

    /// Roll back the current transaction (no-op without transaction support)
    fn rollback(&self) -> Result<()> {
        Ok(())
    }

    /// Whether add/remove can be scoped to named graphs
    fn supports_named_graphs(&self) -> bool {
        false
    }

    /// Whether begin/commit/rollback are real transactions
    fn supports_transactions(&self) -> bool {
        false
    }
}
