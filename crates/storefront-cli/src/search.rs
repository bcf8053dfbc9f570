//! Search command implementation.
//!
//! Loads the catalog snapshot and recorded vector hits, builds the hybrid
//! engine and runs one query.

use crate::config;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use storefront_core::catalog::InMemoryCatalog;
use storefront_core::error::VectorSearchError;
use storefront_core::search::{HybridSearchEngine, RankedList, SearchFilters};
use storefront_core::semantic::{StaticVectorIndex, VectorHit, VectorSearchClient};
use tracing::info;

/// File inputs for a search, straight from the command line.
#[derive(Debug, Default)]
pub struct SearchInputs {
    pub catalog: Option<PathBuf>,
    pub semantic: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Stands in for the vector service when no recorded hits were given.
struct UnavailableVectorSearch;

#[async_trait]
impl VectorSearchClient for UnavailableVectorSearch {
    async fn semantic_search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<VectorHit>, VectorSearchError> {
        Err(VectorSearchError::Unavailable(
            "no semantic hits file provided".to_string(),
        ))
    }
}

/// Builds search filters from the command-line flags.
///
/// Returns `None` when nothing restricts the search.
pub fn build_filters(
    category: Option<String>,
    brand: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    include_out_of_stock: bool,
) -> Option<SearchFilters> {
    let filters = SearchFilters {
        category,
        brand,
        min_price,
        max_price,
        in_stock_only: !include_out_of_stock,
        ..SearchFilters::none()
    };
    (!filters.is_unrestricted()).then_some(filters)
}

/// Performs a hybrid search over a catalog snapshot.
///
/// This function:
/// 1. Resolves and loads the catalog snapshot
/// 2. Loads recorded vector hits, if any
/// 3. Loads engine settings
/// 4. Runs the keyword and semantic stages and fuses them
///
/// A missing semantic file is not an error: the semantic stage then fails
/// and the search continues on keyword results alone.
pub async fn execute_search(
    query: &str,
    limit: usize,
    filters: Option<&SearchFilters>,
    inputs: &SearchInputs,
) -> Result<RankedList> {
    let catalog_path = config::resolve_catalog_path(inputs.catalog.as_ref())?;
    if !catalog_path.exists() {
        return Err(anyhow!(
            "No catalog found at {}.\n\
             Pass --catalog or set ${}.",
            catalog_path.display(),
            config::CATALOG_ENV
        ));
    }

    info!("Loading catalog: {}", catalog_path.display());
    let catalog = InMemoryCatalog::from_json_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog: {}", catalog_path.display()))?;
    info!("Loaded {} products", catalog.len());

    let vector: Arc<dyn VectorSearchClient> = match &inputs.semantic {
        Some(path) => {
            let index = StaticVectorIndex::from_json_file(path).with_context(|| {
                format!("Failed to load semantic hits: {}", path.display())
            })?;
            info!("Loaded semantic hits for {} queries", index.len());
            Arc::new(index)
        }
        None => Arc::new(UnavailableVectorSearch),
    };

    let search_config = config::load_search_config(inputs.config.as_deref())?;
    let engine = HybridSearchEngine::new(catalog, vector, search_config)
        .context("Failed to create search engine")?;

    let results = engine
        .search(query, filters, limit)
        .await
        .context("Search failed")?;

    info!("Found {} results", results.len());
    Ok(results)
}
