//! Lifecycle callbacks
//!
//! Listeners observe every entity flowing through the persistence engine.
//! Pre-events fire before the delta is produced; post-events fire after the
//! call's cascade completes - for the top-level entity that is after the
//! batch executed and verified.

use tessera_model::Instance;

/// Lifecycle stage of a persistence operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Before a persist produces its triples
    PrePersist,
    /// After a persist completes
    PostPersist,
    /// Before a merge produces its delta
    PreUpdate,
    /// After a merge completes
    PostUpdate,
    /// Before a remove produces its removal set
    PreRemove,
    /// After a remove completes
    PostRemove,
}

/// Observer of entity lifecycle events
pub trait LifecycleListener {
    /// Called for every event on every entity in an operation's cascade tree
    fn on_event(&self, event: LifecycleEvent, instance: &Instance);
}
