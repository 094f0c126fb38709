//! RDF vocabulary constants for Tessera
//!
//! Centralized IRI constants and datatype classification helpers used by the
//! mapping and persistence crates.
//!
//! # Organization
//!
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `local` - Tessera's own namespace for minted identifiers
//! - `prefixes` - baseline prefix table seeded into every schema registry

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:short IRI
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";

    /// xsd:byte IRI
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:time IRI
    pub const TIME: &str = "http://www.w3.org/2001/XMLSchema#time";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    // ========================================================================
    // Classification Helpers
    // ========================================================================

    /// Check if a datatype IRI is an integer-family type
    ///
    /// XSD defines int, short, byte and long as subtypes of integer. The
    /// mapper accepts any of them wherever an integer-kinded accessor is
    /// declared, subject to range bounds.
    #[inline]
    pub fn is_integer_family(datatype_iri: &str) -> bool {
        matches!(datatype_iri, INTEGER | LONG | INT | SHORT | BYTE)
    }

    /// Check if a datatype IRI is a floating-point family type
    #[inline]
    pub fn is_float_family(datatype_iri: &str) -> bool {
        matches!(datatype_iri, FLOAT | DOUBLE | DECIMAL)
    }

    /// Check if a datatype IRI is a string-like type
    ///
    /// String-like literals can always be delivered into a string-kinded
    /// accessor without loss.
    #[inline]
    pub fn is_string_like(datatype_iri: &str) -> bool {
        matches!(datatype_iri, STRING | ANY_URI)
    }

    /// Check if a datatype IRI is a temporal type
    #[inline]
    pub fn is_temporal(datatype_iri: &str) -> bool {
        matches!(datatype_iri, DATE_TIME | DATE | TIME)
    }

    /// Get the valid range bounds for a bounded integer subtype as
    /// (min, max) inclusive.
    ///
    /// Returns `None` for xsd:integer (unbounded) and non-integer types.
    #[inline]
    pub fn integer_bounds(datatype_iri: &str) -> Option<(i64, i64)> {
        match datatype_iri {
            BYTE => Some((i8::MIN as i64, i8::MAX as i64)),
            SHORT => Some((i16::MIN as i64, i16::MAX as i64)),
            INT => Some((i32::MIN as i64, i32::MAX as i64)),
            LONG => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Get the local name portion of a datatype IRI (e.g. "integer" from
    /// xsd:integer)
    #[inline]
    pub fn local_name(datatype_iri: &str) -> &str {
        datatype_iri.rsplit('#').next().unwrap_or(datatype_iri)
    }
}

/// Tessera's own namespace for minted identifiers
pub mod local {
    /// Prefix for identifiers minted by the graph writer
    ///
    /// Randomly minted subjects are `urn:tessera:<ulid>`, identifiers derived
    /// from an identity-source value are `urn:tessera:sha256:<hex>`.
    pub const ID: &str = "urn:tessera:";

    /// Prefix for hash-derived identifiers
    pub const HASHED: &str = "urn:tessera:sha256:";
}

/// Baseline prefix table
///
/// Every schema registry is seeded with these before any per-type namespace
/// declarations are applied.
pub mod prefixes {
    /// (prefix, namespace IRI) pairs seeded into a fresh registry
    pub const BASELINE: &[(&str, &str)] = &[
        ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ("owl", "http://www.w3.org/2002/07/owl#"),
    ];
}
