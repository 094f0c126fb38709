//! A single (subject, predicate, object) fact

use crate::Term;
use serde::{Deserialize, Serialize};

/// An RDF triple
///
/// The subject must be a resource (IRI or blank node) and the predicate must
/// be an IRI; this is not enforced by construction but is assumed by every
/// consumer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject term
    pub s: Term,
    /// Predicate term
    pub p: Term,
    /// Object term
    pub o: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }
}

impl std::fmt::Display for Triple {
    /// N-Triples rendering (one statement, trailing dot)
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}
