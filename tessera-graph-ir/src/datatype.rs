//! RDF literal datatype
//!
//! Datatypes are always explicit in this IR - there is no "untyped" literal.
//! Plain strings default to `xsd:string`, language-tagged strings use
//! `rdf:langString`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_vocab::{rdf, xsd};

/// RDF literal datatype, stored as an expanded IRI
///
/// Use the constructors for the common XSD/RDF types; `Datatype::from_iri`
/// accepts any expanded IRI for store-declared datatypes the mapper does not
/// recognize.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from an expanded IRI
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        Datatype(Arc::from(iri.as_ref()))
    }

    /// xsd:string - default for plain string literals
    pub fn xsd_string() -> Self {
        Self::from_iri(xsd::STRING)
    }

    /// xsd:boolean
    pub fn xsd_boolean() -> Self {
        Self::from_iri(xsd::BOOLEAN)
    }

    /// xsd:int
    pub fn xsd_int() -> Self {
        Self::from_iri(xsd::INT)
    }

    /// xsd:long
    pub fn xsd_long() -> Self {
        Self::from_iri(xsd::LONG)
    }

    /// xsd:short
    pub fn xsd_short() -> Self {
        Self::from_iri(xsd::SHORT)
    }

    /// xsd:double
    pub fn xsd_double() -> Self {
        Self::from_iri(xsd::DOUBLE)
    }

    /// xsd:float
    pub fn xsd_float() -> Self {
        Self::from_iri(xsd::FLOAT)
    }

    /// xsd:date
    pub fn xsd_date() -> Self {
        Self::from_iri(xsd::DATE)
    }

    /// xsd:dateTime
    pub fn xsd_date_time() -> Self {
        Self::from_iri(xsd::DATE_TIME)
    }

    /// xsd:anyURI
    pub fn xsd_any_uri() -> Self {
        Self::from_iri(xsd::ANY_URI)
    }

    /// rdf:langString - for language-tagged literals
    pub fn rdf_lang_string() -> Self {
        Self::from_iri(rdf::LANG_STRING)
    }

    /// Get the IRI of this datatype
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is the xsd:string datatype
    pub fn is_xsd_string(&self) -> bool {
        self.as_iri() == xsd::STRING
    }

    /// Check if this is the rdf:langString datatype
    pub fn is_lang_string(&self) -> bool {
        self.as_iri() == rdf::LANG_STRING
    }

    /// Check if this is a numeric type (integer family, float family)
    pub fn is_numeric(&self) -> bool {
        xsd::is_integer_family(self.as_iri()) || xsd::is_float_family(self.as_iri())
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_iri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Datatype::xsd_string().as_iri(), xsd::STRING);
        assert_eq!(Datatype::xsd_boolean().as_iri(), xsd::BOOLEAN);
        assert_eq!(Datatype::rdf_lang_string().as_iri(), rdf::LANG_STRING);
    }

    #[test]
    fn test_predicates() {
        assert!(Datatype::xsd_string().is_xsd_string());
        assert!(!Datatype::xsd_long().is_xsd_string());
        assert!(Datatype::rdf_lang_string().is_lang_string());
        assert!(Datatype::xsd_long().is_numeric());
        assert!(Datatype::xsd_double().is_numeric());
        assert!(!Datatype::xsd_string().is_numeric());
    }

    #[test]
    fn test_equality_via_iri() {
        assert_eq!(Datatype::xsd_long(), Datatype::from_iri(xsd::LONG));
        assert_ne!(Datatype::xsd_long(), Datatype::xsd_int());
    }
}
