//! Canonical RDF triple representation for Tessera
//!
//! This crate provides the types the mapping and persistence engines exchange
//! with a triple store: terms, triples, graphs, and subject identifiers.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form. Prefix
//!    expansion happens once, in the schema registry.
//!
//! 2. **Explicit datatypes** - Literals always carry an explicit datatype.
//!    Plain strings use `xsd:string`, language-tagged strings use
//!    `rdf:langString`.
//!
//! 3. **Set semantics** - `Graph` is an unordered set of triples. Inserting a
//!    duplicate is a no-op, and iteration order is the SPO term order.
//!
//! # Example
//!
//! ```
//! use tessera_graph_ir::{Graph, Term};
//!
//! let mut graph = Graph::new();
//! graph.insert_triple(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! );
//! assert_eq!(graph.len(), 1);
//! ```

mod datatype;
mod graph;
mod key;
mod term;
mod triple;

pub use datatype::Datatype;
pub use graph::Graph;
pub use key::RdfKey;
pub use term::{BlankId, Term};
pub use triple::Triple;
