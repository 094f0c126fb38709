//! Persistence cascade engine for Tessera
//!
//! [`EntityManager`] coordinates create/merge/remove operations against a
//! triple store through the mapping engine:
//!
//! - each top-level operation opens one operation scope holding the pending
//!   batch and the cascade-pending guard set;
//! - per-field cascade policy drives recursion into related entities, which
//!   join the same batch instead of executing immediately;
//! - the batch executes exactly once per top-level call - all removals
//!   before all additions, per named graph where supported, inside a store
//!   transaction where available - and the outcome is verified with
//!   existence checks before lifecycle listeners see the post-events.

mod error;
mod events;
mod manager;
mod pending;

pub use error::{PersistError, Result};
pub use events::{LifecycleEvent, LifecycleListener};
pub use manager::EntityManager;
pub use pending::PendingOp;
