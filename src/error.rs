//! Error taxonomy for the application.
//!
//! Only two kinds of failure exist: contract violations (`InvalidArgument`),
//! which are programmer errors and surface loudly at the violating call, and
//! storage failures. Missing or malformed persisted data is *not* an error;
//! the library degrades to an empty collection instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FotagError {
    /// A caller violated an API contract, e.g. a rating outside 0..=5.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The catalog database could not be opened or written.
    #[error("catalog storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The collection could not be serialized for storage.
    #[error("catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FotagError>;
