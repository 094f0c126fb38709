//! The pending operation batch
//!
//! Add/remove triple sets partitioned by named graph, plus the instances
//! whose presence or absence must be verified once the store mutation
//! commits. One batch per top-level operation: nested cascade calls stage
//! into the batch their caller created, and the batch executes exactly once.

use crate::{PersistError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tessera_graph_ir::{Graph, RdfKey};
use tessera_source::DataSource;
use tracing::debug;

/// Staged mutations and verification obligations of one top-level operation
#[derive(Default)]
pub struct PendingOp {
    /// named graph (None = default graph) -> triples to add
    adds: BTreeMap<Option<Arc<str>>, Graph>,
    /// named graph (None = default graph) -> triples to remove
    removes: BTreeMap<Option<Arc<str>>, Graph>,
    /// (key, label) pairs that must pass an existence check afterwards
    must_exist: Vec<(RdfKey, String)>,
    /// (key, label) pairs that must fail an existence check afterwards
    must_not_exist: Vec<(RdfKey, String)>,
}

impl PendingOp {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage triples for addition
    pub fn stage_add(&mut self, graph_name: Option<Arc<str>>, graph: Graph) {
        self.adds.entry(graph_name).or_default().merge(graph);
    }

    /// Stage triples for removal
    pub fn stage_remove(&mut self, graph_name: Option<Arc<str>>, graph: Graph) {
        self.removes.entry(graph_name).or_default().merge(graph);
    }

    /// Register an instance that must exist after execution
    pub fn assert_present(&mut self, key: RdfKey, label: String) {
        self.must_exist.push((key, label));
    }

    /// Register an instance that must no longer exist after execution
    pub fn assert_absent(&mut self, key: RdfKey, label: String) {
        self.must_not_exist.push((key, label));
    }

    /// Check whether anything was staged
    pub fn is_empty(&self) -> bool {
        self.adds.values().all(Graph::is_empty) && self.removes.values().all(Graph::is_empty)
    }

    /// Apply the batch and verify the outcome
    ///
    /// All removals execute before all additions, regardless of the order
    /// cascaded sub-operations staged them. Named partitions fall back to
    /// the default graph on stores without named-graph support. With
    /// transaction support the mutation runs inside begin/commit, rolled
    /// back on failure; verification runs after the commit.
    pub fn execute(&self, source: &dyn DataSource) -> Result<()> {
        let transactional = source.supports_transactions();
        if transactional {
            source.begin()?;
        }

        if let Err(err) = self.apply(source) {
            if transactional {
                // Best effort; the original failure is the one to surface
                let _ = source.rollback();
            }
            return Err(err.into());
        }

        if transactional {
            source.commit()?;
        }

        for (key, label) in &self.must_not_exist {
            if source.exists(key)? {
                return Err(PersistError::Verification {
                    instance: label.clone(),
                    problem: "still present after removal".to_string(),
                });
            }
        }
        for (key, label) in &self.must_exist {
            if !source.exists(key)? {
                return Err(PersistError::Verification {
                    instance: label.clone(),
                    problem: "absent after write".to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply(&self, source: &dyn DataSource) -> tessera_source::Result<()> {
        let named_ok = source.supports_named_graphs();

        for (name, graph) in &self.removes {
            if graph.is_empty() {
                continue;
            }
            match name {
                Some(graph_iri) if named_ok => source.remove_named(graph_iri, graph)?,
                _ => source.remove(graph)?,
            }
        }
        for (name, graph) in &self.adds {
            if graph.is_empty() {
                continue;
            }
            match name {
                Some(graph_iri) if named_ok => source.add_named(graph_iri, graph)?,
                _ => source.add(graph)?,
            }
        }
        debug!(
            removes = self.removes.values().map(Graph::len).sum::<usize>(),
            adds = self.adds.values().map(Graph::len).sum::<usize>(),
            "applied pending operation"
        );
        Ok(())
    }
}
