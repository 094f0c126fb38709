//! The entity manager: persist / merge / remove / find / refresh
//!
//! Every public operation is a top-level call: it opens an operation scope
//! (pending batch + cascade-pending guard set), runs the per-call state
//! machine - precondition, pre-hook, delta, batch join, cascade - and
//! executes the batch exactly once before dispatching its own post-hook.
//! Nested cascade calls run the same state machine but join the outer batch
//! instead of executing.

use crate::{LifecycleEvent, LifecycleListener, PendingOp, PersistError, Result};
use rustc_hash::FxHashSet;
use tessera_graph_ir::{Graph, RdfKey};
use tessera_mapper::{read, refresh, resolve_identity, write, MapperError, MappingContext};
use tessera_model::{Instance, Value};
use tessera_source::DataSource;
use tracing::debug;

/// Operation kind, for cascade policy lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpKind {
    Persist,
    Merge,
    Remove,
}

/// Per-top-level-call state
///
/// Created at the top of each persist/merge/remove and dropped when it
/// returns, success or failure; nothing in it outlives the call.
struct OpScope {
    pending: PendingOp,
    /// Cascade-pending guard: instance identities already being processed
    in_progress: FxHashSet<usize>,
    /// Instances whose captured triples become the staged graph once the
    /// batch has executed and verified
    capture_updates: Vec<(Instance, Graph)>,
}

impl OpScope {
    fn new() -> Self {
        Self {
            pending: PendingOp::new(),
            in_progress: FxHashSet::default(),
            capture_updates: Vec::new(),
        }
    }

    /// Guard against infinite recursion on cyclic object graphs
    fn enter(&mut self, instance: &Instance) -> bool {
        self.in_progress.insert(instance.identity())
    }
}

/// Coordinates entity lifecycle operations against one data source
pub struct EntityManager<S: DataSource> {
    ctx: MappingContext,
    source: S,
    listeners: Vec<Box<dyn LifecycleListener>>,
}

impl<S: DataSource> EntityManager<S> {
    /// Create a manager over a mapping context and a store
    pub fn new(ctx: MappingContext, source: S) -> Self {
        Self {
            ctx,
            source,
            listeners: Vec::new(),
        }
    }

    /// Register a lifecycle listener
    pub fn add_listener(&mut self, listener: Box<dyn LifecycleListener>) {
        self.listeners.push(listener);
    }

    /// The mapping context
    pub fn context(&self) -> &MappingContext {
        &self.ctx
    }

    /// The underlying store
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Create: write the entity (and everything its persist-cascades reach)
    /// into the store
    pub fn persist(&self, instance: &Instance) -> Result<()> {
        let mut scope = OpScope::new();
        self.persist_in(instance, &mut scope, true)
    }

    /// Update: replace the entity's previously-written triples with its
    /// current state
    pub fn merge(&self, instance: &Instance) -> Result<()> {
        let mut scope = OpScope::new();
        self.merge_in(instance, &mut scope, true)
    }

    /// Delete: erase everything the store asserts about the entity's subject
    pub fn remove(&self, instance: &Instance) -> Result<()> {
        let mut scope = OpScope::new();
        self.remove_in(instance, &mut scope, true)
    }

    /// Load the entity with the given identifier, or `None` when the store
    /// does not know the subject
    pub fn find(&self, type_name: &str, key: &RdfKey) -> Result<Option<Instance>> {
        if !self.source.exists(key)? {
            return Ok(None);
        }
        Ok(Some(read(&self.ctx, &self.source, type_name, key)?))
    }

    /// Re-describe the instance's subject and repopulate it in place
    pub fn refresh(&self, instance: &Instance) -> Result<()> {
        refresh(&self.ctx, &self.source, instance)?;
        Ok(())
    }

    /// The verification-step existence check, exposed to callers
    pub fn exists(&self, instance: &Instance) -> Result<bool> {
        match instance.key() {
            Some(key) => Ok(self.source.exists(&key)?),
            None => Ok(false),
        }
    }

    fn persist_in(&self, instance: &Instance, scope: &mut OpScope, top: bool) -> Result<()> {
        if !scope.enter(instance) {
            return Ok(());
        }
        self.validate(instance)?;
        let key = resolve_identity(instance).map_err(PersistError::from)?;
        if self.source.exists(&key)? {
            return Err(PersistError::EntityExists(instance.to_string()));
        }

        self.dispatch(LifecycleEvent::PrePersist, instance);

        let graph = write(&self.ctx, instance)?;
        let graph_name = instance.schema().graph.clone();
        scope.pending.assert_present(key, instance.to_string());
        scope
            .capture_updates
            .push((instance.clone(), graph.clone()));
        scope.pending.stage_add(graph_name, graph);

        self.cascade(OpKind::Persist, instance, scope)?;
        if top {
            self.execute(scope)?;
        }
        self.dispatch(LifecycleEvent::PostPersist, instance);
        Ok(())
    }

    fn merge_in(&self, instance: &Instance, scope: &mut OpScope, top: bool) -> Result<()> {
        if !scope.enter(instance) {
            return Ok(());
        }
        self.validate(instance)?;
        let key = instance
            .key()
            .ok_or_else(|| PersistError::EntityNotFound(instance.to_string()))?;

        // Previously captured triples double as the existence witness and
        // the deletion baseline, saving a store round-trip
        let baseline = instance.instance_triples();
        if baseline.is_none() && !self.source.exists(&key)? {
            return Err(PersistError::EntityNotFound(instance.to_string()));
        }

        self.dispatch(LifecycleEvent::PreUpdate, instance);

        let new_graph = write(&self.ctx, instance)?;
        let removal = match baseline {
            Some(captured) => captured,
            None => self.source.describe(&key)?,
        };
        let graph_name = instance.schema().graph.clone();
        scope.pending.stage_remove(graph_name.clone(), removal);
        scope.pending.assert_present(key, instance.to_string());
        scope
            .capture_updates
            .push((instance.clone(), new_graph.clone()));
        scope.pending.stage_add(graph_name, new_graph);

        self.cascade(OpKind::Merge, instance, scope)?;
        if top {
            self.execute(scope)?;
        }
        self.dispatch(LifecycleEvent::PostUpdate, instance);
        Ok(())
    }

    fn remove_in(&self, instance: &Instance, scope: &mut OpScope, top: bool) -> Result<()> {
        if !scope.enter(instance) {
            return Ok(());
        }
        self.validate(instance)?;
        let key = instance
            .key()
            .ok_or_else(|| PersistError::EntityNotFound(instance.to_string()))?;
        if !self.source.exists(&key)? {
            return Err(PersistError::EntityNotFound(instance.to_string()));
        }

        self.dispatch(LifecycleEvent::PreRemove, instance);

        // The full current description, not just what this mapping wrote:
        // removal must erase assertions from other writers and views too
        let removal = self.source.describe(&key)?;
        let graph_name = instance.schema().graph.clone();
        scope.pending.stage_remove(graph_name, removal);
        scope.pending.assert_absent(key, instance.to_string());

        self.cascade(OpKind::Remove, instance, scope)?;
        if top {
            self.execute(scope)?;
        }
        self.dispatch(LifecycleEvent::PostRemove, instance);
        Ok(())
    }

    /// Recurse into related entities through fields whose cascade policy
    /// includes the current operation kind
    fn cascade(&self, kind: OpKind, instance: &Instance, scope: &mut OpScope) -> Result<()> {
        let schema = instance.schema();
        for field in &schema.fields {
            let applies = match kind {
                OpKind::Persist => field.cascade.persist,
                OpKind::Merge => field.cascade.merge,
                OpKind::Remove => field.cascade.remove,
            };
            if !applies {
                continue;
            }
            let Some(value) = instance.get(&field.name) else {
                continue;
            };
            let elements = match value {
                Value::Many(items) => items,
                single => vec![single],
            };
            for element in elements {
                let related = match element {
                    Value::Entity(entity) => Some(entity),
                    // A still-deferred reference was never loaded; there is
                    // nothing to cascade onto
                    Value::Ref(reference) => reference.cached(),
                    // Cascading onto non-mappable values is a no-op
                    _ => None,
                };
                let Some(related) = related else {
                    continue;
                };
                debug!(from = %instance, to = %related, kind = ?kind, "cascading");
                match kind {
                    OpKind::Persist => self.persist_in(&related, scope, false)?,
                    OpKind::Merge => {
                        // Merge-cascade persists values absent from the store
                        let absent = match related.key() {
                            Some(related_key) => !self.source.exists(&related_key)?,
                            None => true,
                        };
                        if absent {
                            self.persist_in(&related, scope, false)?;
                        } else {
                            self.merge_in(&related, scope, false)?;
                        }
                    }
                    OpKind::Remove => self.remove_in(&related, scope, false)?,
                }
            }
        }
        Ok(())
    }

    /// Execute and verify the batch, then settle captured triples and clear
    /// the cascade-pending set
    fn execute(&self, scope: &mut OpScope) -> Result<()> {
        scope.pending.execute(&self.source)?;
        for (instance, graph) in scope.capture_updates.drain(..) {
            instance.set_instance_triples(graph);
        }
        scope.in_progress.clear();
        Ok(())
    }

    fn validate(&self, instance: &Instance) -> Result<()> {
        if instance.schema().class_iri.is_empty() {
            return Err(MapperError::invalid_entity(format!(
                "type {} declares no ontology class",
                instance.type_name()
            ))
            .into());
        }
        Ok(())
    }

    fn dispatch(&self, event: LifecycleEvent, instance: &Instance) {
        for listener in &self.listeners {
            listener.on_event(event, instance);
        }
    }
}
