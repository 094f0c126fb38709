//! Error types for tessera-mapper

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, MapperError>;

/// Mapping engine error
///
/// Conversion and metadata errors abort the whole read/write call: no
/// partial entity is ever returned. The one tolerated case - a type
/// mismatch while delivering a converted value into a field - is downgraded
/// to a logged warning inside the reader and never surfaces here.
#[derive(Error, Debug)]
pub enum MapperError {
    /// Missing or unusable mapping metadata, identity violation, or
    /// construction failure
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// A value the codec has no RDF rendition for
    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(String),

    /// A literal whose datatype has no native counterpart for the target
    /// field
    #[error("unknown datatype {datatype} for field {field}")]
    UnknownDatatype {
        /// The declared datatype IRI
        datatype: String,
        /// The target field name
        field: String,
    },

    /// Several candidate values for a single-valued accessor
    #[error("ambiguous scalar for predicate {predicate}: {count} candidate values")]
    AmbiguousScalar {
        /// The predicate in question
        predicate: String,
        /// How many candidates survived filtering
        count: usize,
    },

    /// Failure propagated from the store collaborator
    #[error("query failure: {0}")]
    Query(#[from] tessera_source::SourceError),
}

impl MapperError {
    /// Create an invalid-entity error
    pub fn invalid_entity(msg: impl Into<String>) -> Self {
        MapperError::InvalidEntity(msg.into())
    }

    /// Create an unsupported-conversion error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        MapperError::UnsupportedConversion(msg.into())
    }
}

impl From<tessera_model::ModelError> for MapperError {
    /// Model violations (identity overwrite, unknown or uninstantiable
    /// types) surface as invalid-entity failures with the cause inline
    fn from(err: tessera_model::ModelError) -> Self {
        MapperError::InvalidEntity(err.to_string())
    }
}
