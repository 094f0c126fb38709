//! Error types for tessera-model

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, ModelError>;

/// Object model error
#[derive(Error, Debug)]
pub enum ModelError {
    /// Attempt to overwrite an already-assigned identifier
    #[error("identity already assigned: {existing} (attempted {attempted})")]
    IdentityConflict {
        /// The identifier already on the instance
        existing: String,
        /// The identifier the caller tried to assign
        attempted: String,
    },

    /// Type name not present in the registry
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// Abstract type with no registered concrete factory
    #[error("type {0} is abstract and has no concrete factory registered")]
    NotInstantiable(String),
}
