//! Triple store capability for Tessera
//!
//! The mapping and persistence engines consume an external triple store
//! through the [`DataSource`] trait: describe a subject, add/remove graphs
//! (optionally into named graphs), run queries in the store's own dialect,
//! and check subject existence. All interaction is blocking request/response
//! on the caller's thread; there is no suspension point in the engines.
//!
//! [`MemoryStore`] is the in-memory reference implementation used by the
//! test suites, with named-graph partitions and snapshot-based transactions.

mod error;
mod memory;
mod source;

pub use error::{Result, SourceError};
pub use memory::MemoryStore;
pub use source::{Binding, DataSource};
