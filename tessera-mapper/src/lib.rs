//! Object-to-graph serialization and deserialization for Tessera
//!
//! The mapping engine converts entity records to RDF triple sets and back:
//!
//! - [`write`] produces the minimal triple set representing an instance,
//!   minting and assigning its identifier on the way (exactly once).
//! - [`read`] reconstructs a populated instance from a subject description,
//!   resolving subtypes, collections, nested entities, and lazy references,
//!   cycle-safe through a per-call in-flight map.
//! - [`refresh`] repopulates an already-read instance in place.
//!
//! Both directions consult the [`SchemaRegistry`](tessera_model::SchemaRegistry)
//! for mapping metadata and the value codec for scalar conversion; neither
//! holds state between calls beyond the registry itself.

mod codec;
mod error;
mod identity;
mod reader;
mod writer;

pub use error::{MapperError, Result};
pub use identity::resolve_identity;
pub use reader::{read, refresh, ReadScope};
pub use writer::write;

use std::sync::Arc;
use tessera_model::SchemaRegistry;

/// Engine-wide conversion options
#[derive(Clone, Debug, Default)]
pub struct MapperOptions {
    /// Convert scalars to plain untyped string literals instead of typed
    /// ones, for stores that keep no datatypes; on read, attempt
    /// kind-directed parsing of plain literals
    pub weak_typing: bool,
    /// Permissively take the first candidate instead of failing with
    /// `AmbiguousScalar` when several values survive filtering
    pub first_of_ambiguous: bool,
    /// Active language for literal-set disambiguation
    pub language: Option<String>,
}

/// Shared state of one mapping engine: the registry plus options
///
/// Passed by reference into every engine call; per-call scopes
/// ([`ReadScope`], the persistence engine's operation scope) are created at
/// the top of each top-level operation and never outlive it.
#[derive(Clone)]
pub struct MappingContext {
    registry: Arc<SchemaRegistry>,
    options: MapperOptions,
}

impl MappingContext {
    /// Create a context with default options
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            options: MapperOptions::default(),
        }
    }

    /// Create a context with explicit options
    pub fn with_options(registry: Arc<SchemaRegistry>, options: MapperOptions) -> Self {
        Self { registry, options }
    }

    /// The schema registry
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The conversion options
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }
}
