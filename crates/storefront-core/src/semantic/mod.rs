//! Vector search abstraction consumed by the semantic stage.
//!
//! Embedding generation and the vector index are external services. The
//! engine only needs "top-k products similar to this text", expressed by
//! [`VectorSearchClient`].
//!
//! # Implementations
//!
//! - [`StaticVectorIndex`] - replays recorded hits per query (tests, CLI)
//! - Vector store adapters - live in the hosting application

mod static_index;

pub use static_index::StaticVectorIndex;

use crate::error::VectorSearchError;
use crate::search::types::{Candidate, ProductId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One similarity-scored product returned by the vector search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorHit {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    /// May be blank; the semantic stage substitutes a generic image
    #[serde(default)]
    pub image_url: String,
    pub price: f64,
    #[serde(default)]
    pub available_stock: u32,
    /// Raw similarity from the index, higher is closer
    pub similarity_score: f64,
}

impl VectorHit {
    /// Projects the hit into a search candidate, keeping the raw similarity.
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            id: self.product_id,
            name: self.product_name.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            available_stock: self.available_stock,
            relevance_score: self.similarity_score,
        }
    }
}

/// Semantic similarity search over the product catalog.
#[async_trait::async_trait]
pub trait VectorSearchClient: Send + Sync {
    /// Returns up to `max_results` hits ordered by similarity, descending.
    #[must_use = "Vector search failures should be handled"]
    async fn semantic_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VectorHit>, VectorSearchError>;
}

#[async_trait::async_trait]
impl<T: VectorSearchClient + ?Sized> VectorSearchClient for Arc<T> {
    async fn semantic_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VectorHit>, VectorSearchError> {
        (**self).semantic_search(query, max_results).await
    }
}
