//! Subject identifiers
//!
//! An entity is addressed either by a global resource name (IRI) or by a
//! locally-scoped anonymous identifier (blank node). Two keys are equal iff
//! they are the same variant with the same underlying value.

use crate::{BlankId, Term};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier of a mapped entity: a global IRI or a local blank node
///
/// Immutable once assigned to an instance (enforced by the instance, not
/// here).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RdfKey {
    /// Global resource name
    Iri(Arc<str>),
    /// Locally-scoped anonymous identifier
    Blank(BlankId),
}

impl RdfKey {
    /// Create a key from an expanded IRI
    pub fn iri(iri: impl AsRef<str>) -> Self {
        RdfKey::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a key from a blank node label (without `_:` prefix)
    pub fn blank(label: impl AsRef<str>) -> Self {
        RdfKey::Blank(BlankId::new(label))
    }

    /// Check if this is a global IRI key
    pub fn is_iri(&self) -> bool {
        matches!(self, RdfKey::Iri(_))
    }

    /// Render this key as a term for the subject or object position
    pub fn as_term(&self) -> Term {
        match self {
            RdfKey::Iri(iri) => Term::Iri(iri.clone()),
            RdfKey::Blank(id) => Term::Blank(id.clone()),
        }
    }

    /// Try to build a key from a resource term
    ///
    /// Returns `None` for literals.
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Iri(iri) => Some(RdfKey::Iri(iri.clone())),
            Term::Blank(id) => Some(RdfKey::Blank(id.clone())),
            Term::Literal { .. } => None,
        }
    }
}

impl std::fmt::Display for RdfKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RdfKey::Iri(iri) => write!(f, "<{}>", iri),
            RdfKey::Blank(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_variant_and_value() {
        assert_eq!(RdfKey::iri("http://a"), RdfKey::iri("http://a"));
        assert_ne!(RdfKey::iri("http://a"), RdfKey::iri("http://b"));
        assert_ne!(RdfKey::iri("b0"), RdfKey::blank("b0"));
    }

    #[test]
    fn test_term_round_trip() {
        let key = RdfKey::iri("http://example.org/x");
        assert_eq!(RdfKey::from_term(&key.as_term()), Some(key));

        let blank = RdfKey::blank("b1");
        assert_eq!(RdfKey::from_term(&blank.as_term()), Some(blank));

        assert_eq!(RdfKey::from_term(&Term::string("lit")), None);
    }
}
