//! Hybrid product search combining keyword and semantic retrieval.
//!
//! This module implements the ranking pipeline behind product discovery:
//! - **Keyword stage** (lexical scoring of product names)
//! - **Semantic stage** (similarity hits from the vector search service)
//! - **Weighted Reciprocal Rank Fusion** (RRF) with lexical boosts and a
//!   relevance cutoff
//!
//! # Architecture
//!
//! - `types`: Core types (ProductId, Candidate, RankedList, SearchError, FusionError)
//! - `analyzer`: Query normalization, terms and model-number trigrams
//! - `keyword`: Additive keyword scoring of product names
//! - `fusion`: Weighted RRF merging of the two stage lists
//! - `filter`: Structured filters applied before or after each stage
//! - `engine`: HybridSearchEngine orchestrating both stages and fusion
//!
//! # Usage
//!
//! ```
//! use storefront_core::catalog::{InMemoryCatalog, Product};
//! use storefront_core::config::SearchConfig;
//! use storefront_core::search::{HybridSearchEngine, ProductId};
//! use storefront_core::semantic::StaticVectorIndex;
//!
//! # tokio_test_block_on(async {
//! let catalog = InMemoryCatalog::from_products(vec![
//!     Product::new(ProductId::from_u64(1), "Wireless Mouse", 29.0, 5),
//!     Product::new(ProductId::from_u64(2), "Wool Beanie", 19.0, 3),
//! ]);
//! let engine =
//!     HybridSearchEngine::new(catalog, StaticVectorIndex::new(), SearchConfig::default()).unwrap();
//!
//! let results = engine.search("wireless mouse", None, 10).await.unwrap();
//! assert_eq!(results.ids(), vec![ProductId::from_u64(1)]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! # Failure model
//!
//! Callers only see validation errors. A stage whose collaborator fails or
//! times out contributes an empty list, and a fusion failure degrades the
//! search to keyword-only results.

pub mod analyzer;
mod engine;
pub mod filter;
pub mod fusion;
pub mod keyword;
pub mod types;

pub use analyzer::{analyze, AnalyzedQuery};
pub use engine::HybridSearchEngine;
pub use filter::SearchFilters;
pub use fusion::RankFusion;
pub use types::{Candidate, FusionError, ProductId, RankedList, SearchError, SearchStage};
