//! Lazy entity references
//!
//! The explicit tagged variant replacing runtime-generated lazy proxies: a
//! [`Reference`] starts `Deferred` (identifier + target type only) and is
//! resolved through a caller-supplied loader on first access. Equality,
//! hashing, and display go through the identifier and never trigger a load.

use crate::Instance;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tessera_graph_ir::RdfKey;

/// Deferred-resolution reference to a mapped entity
///
/// Clones share the resolution cache: resolving any clone resolves them all.
#[derive(Clone)]
pub struct Reference {
    key: RdfKey,
    target: Arc<str>,
    cell: Rc<RefCell<Option<Instance>>>,
}

impl Reference {
    /// Create a deferred reference to `key`, declared as type `target`
    pub fn deferred(key: RdfKey, target: impl AsRef<str>) -> Self {
        Self {
            key,
            target: Arc::from(target.as_ref()),
            cell: Rc::new(RefCell::new(None)),
        }
    }

    /// The referenced identifier (never triggers resolution)
    pub fn key(&self) -> RdfKey {
        self.key.clone()
    }

    /// The declared target type name
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check whether the reference has been resolved
    pub fn is_resolved(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// The cached instance, if already resolved
    pub fn cached(&self) -> Option<Instance> {
        self.cell.borrow().clone()
    }

    /// Resolve through `loader` on first access; cached afterwards
    ///
    /// The loader receives the identifier and is expected to perform the
    /// deferred read. It is not invoked when a cached instance exists.
    pub fn resolve_with<F, E>(&self, loader: F) -> std::result::Result<Instance, E>
    where
        F: FnOnce(&RdfKey) -> std::result::Result<Instance, E>,
    {
        if let Some(cached) = self.cell.borrow().clone() {
            return Ok(cached);
        }
        let instance = loader(&self.key)?;
        *self.cell.borrow_mut() = Some(instance.clone());
        Ok(instance)
    }
}

impl PartialEq for Reference {
    /// Identifier equality; no resolution
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Reference {}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_resolved() {
            "resolved"
        } else {
            "deferred"
        };
        write!(f, "Reference({}, {}, {})", self.target, self.key, state)
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}
