//! Error types for tessera-persist

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, PersistError>;

/// Persistence engine error
#[derive(Error, Debug)]
pub enum PersistError {
    /// Persist precondition violation: the subject is already in the store
    #[error("entity already exists: {0}")]
    EntityExists(String),

    /// Merge/remove precondition violation: the subject is not in the store
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// Post-commit verification mismatch
    #[error("persistence verification failed for {instance}: {problem}")]
    Verification {
        /// The offending instance
        instance: String,
        /// What the existence check contradicted
        problem: String,
    },

    /// Mapping engine error
    #[error(transparent)]
    Mapper(#[from] tessera_mapper::MapperError),

    /// Failure propagated from the store collaborator
    #[error("query failure: {0}")]
    Source(#[from] tessera_source::SourceError),
}
