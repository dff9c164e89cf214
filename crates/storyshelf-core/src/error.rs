use thiserror::Error;

/// Errors raised by a `RecordStore` backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by repositories and the reconciliation engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Profile id missing, non-numeric or not positive. Raised before any I/O.
    #[error("Invalid profile namespace: {0}")]
    InvalidNamespace(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
