//! Error types for tessera-source

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, SourceError>;

/// Triple store collaborator error
#[derive(Error, Debug)]
pub enum SourceError {
    /// Store-side failure during add/remove/describe
    #[error("store error: {0}")]
    Store(String),

    /// Query evaluation failure
    #[error("query error: {0}")]
    Query(String),

    /// Capability not provided by this store
    #[error("unsupported by this data source: {0}")]
    Unsupported(String),

    /// Transaction state violation (nested begin, commit without begin)
    #[error("transaction error: {0}")]
    Transaction(String),
}

impl SourceError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        SourceError::Store(msg.into())
    }

    /// Create a query error
    pub fn query(msg: impl Into<String>) -> Self {
        SourceError::Query(msg.into())
    }

    /// Create an unsupported-capability error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        SourceError::Unsupported(msg.into())
    }

    /// Create a transaction state error
    pub fn transaction(msg: impl Into<String>) -> Self {
        SourceError::Transaction(msg.into())
    }
}
