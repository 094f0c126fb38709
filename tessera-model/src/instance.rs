//! Dynamic entity records
//!
//! An [`Instance`] is a shared handle over a typed record: its registered
//! schema, an optional write-once identifier, the current field values, and
//! the triples captured at read time for later merge diffing.

use crate::{ClassSchema, ModelError, Result, Value};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tessera_graph_ir::{Graph, RdfKey};

struct InstanceInner {
    schema: Arc<ClassSchema>,
    key: Option<RdfKey>,
    fields: FxHashMap<Arc<str>, Value>,
    /// Triples the reader actually consumed (mapped predicates only)
    instance_triples: Option<Graph>,
    /// The full description the reader saw
    all_triples: Option<Graph>,
}

/// Shared handle over a dynamic entity record
///
/// Cloning an `Instance` clones the handle, not the record: object graphs in
/// this domain are cyclic, and every holder must observe the same state.
/// `PartialEq` is handle identity; use [`Instance::fields_equal`] for
/// structural comparison in tests.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<RefCell<InstanceInner>>,
}

impl Instance {
    /// Create a bare record of the given schema
    pub fn new(schema: Arc<ClassSchema>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(InstanceInner {
                schema,
                key: None,
                fields: FxHashMap::default(),
                instance_triples: None,
                all_triples: None,
            })),
        }
    }

    /// The registered schema of this record
    pub fn schema(&self) -> Arc<ClassSchema> {
        self.inner.borrow().schema.clone()
    }

    /// Native type name
    pub fn type_name(&self) -> Arc<str> {
        self.inner.borrow().schema.name.clone()
    }

    /// The assigned identifier, if any
    pub fn key(&self) -> Option<RdfKey> {
        self.inner.borrow().key.clone()
    }

    /// Assign the identifier, exactly once
    ///
    /// Re-assigning the same key is a no-op; assigning a different key over
    /// an existing one fails.
    pub fn assign_key(&self, key: RdfKey) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        match &inner.key {
            None => {
                inner.key = Some(key);
                Ok(())
            }
            Some(existing) if *existing == key => Ok(()),
            Some(existing) => Err(ModelError::IdentityConflict {
                existing: existing.to_string(),
                attempted: key.to_string(),
            }),
        }
    }

    /// Get a field value (cloned handle/scalar)
    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.borrow().fields.get(field).cloned()
    }

    /// Set a field value
    pub fn set(&self, field: impl AsRef<str>, value: Value) {
        self.inner
            .borrow_mut()
            .fields
            .insert(Arc::from(field.as_ref()), value);
    }

    /// Remove all field values (used by refresh before repopulating)
    pub fn clear_fields(&self) {
        self.inner.borrow_mut().fields.clear();
    }

    /// Snapshot of (field name, value) pairs
    pub fn fields(&self) -> Vec<(Arc<str>, Value)> {
        self.inner
            .borrow()
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Triples the reader consumed for this record, if it was read
    pub fn instance_triples(&self) -> Option<Graph> {
        self.inner.borrow().instance_triples.clone()
    }

    /// Record the consumed triples
    pub fn set_instance_triples(&self, graph: Graph) {
        self.inner.borrow_mut().instance_triples = Some(graph);
    }

    /// The full description the reader saw, if it was read
    pub fn all_triples(&self) -> Option<Graph> {
        self.inner.borrow().all_triples.clone()
    }

    /// Record the full description
    pub fn set_all_triples(&self, graph: Graph) {
        self.inner.borrow_mut().all_triples = Some(graph);
    }

    /// Process-unique identity of this record (handle pointer)
    ///
    /// Keys the cascade-pending set: two clones of one handle collide, two
    /// records never do.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// Structural comparison for tests: same type, same key, and
    /// field-by-field equal values, with nested entities compared by key
    /// (cycle-safe)
    pub fn fields_equal(&self, other: &Instance) -> bool {
        if self.type_name() != other.type_name() || self.key() != other.key() {
            return false;
        }
        let a = self.fields();
        let b = other.fields();
        if a.len() != b.len() {
            return false;
        }
        a.iter().all(|(name, va)| match other.get(name) {
            Some(vb) => values_equal(va, &vb),
            None => false,
        })
    }
}

/// Value comparison with entities and references compared by key
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Entity(x), Value::Entity(y)) => x.key() == y.key(),
        (Value::Ref(x), Value::Ref(y)) => x.key() == y.key(),
        (Value::Entity(x), Value::Ref(y)) | (Value::Ref(y), Value::Entity(x)) => {
            x.key().as_ref() == Some(&y.key())
        }
        (Value::Many(xs), Value::Many(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

impl PartialEq for Instance {
    /// Handle identity, not structural equality
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Instance {}

impl std::fmt::Debug for Instance {
    /// Shallow rendering; field values may cycle back to this record
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        match &inner.key {
            Some(key) => write!(f, "{}{}", inner.schema.name, key),
            None => write!(f, "{}<unassigned>", inner.schema.name),
        }
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
