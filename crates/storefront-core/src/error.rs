//! Error types for storefront-core.
//!
//! This module defines the errors raised by the external collaborators the
//! search engine consumes: the inventory catalog and the vector search
//! service. Neither ever reaches a search caller; each stage converts them
//! into an empty ranked list. Search-level errors live in
//! [`search::types`](crate::search::types).

use thiserror::Error;

/// Errors that can occur while reading the product catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Backing inventory service is unreachable or refused the request
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    /// Failed to read a catalog snapshot
    #[error("I/O error: {0}")]
    Io(String),
    /// Catalog data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Internal lock was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

/// Errors that can occur during semantic (vector) search.
#[derive(Debug, Clone, Error)]
pub enum VectorSearchError {
    /// Vector store or embedding service is unreachable
    #[error("Vector search unavailable: {0}")]
    Unavailable(String),
    /// Failed to embed the query text
    #[error("Embedding failed: {0}")]
    Embedding(String),
    /// The backend answered with an error
    #[error("Vector search backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VectorSearchError {
    fn from(err: serde_json::Error) -> Self {
        VectorSearchError::Backend(err.to_string())
    }
}
