//! Hybrid search orchestration.
//!
//! [`HybridSearchEngine`] runs the keyword and semantic stages concurrently,
//! fuses their lists and degrades instead of failing:
//!
//! 1. Both stages over-fetch `overfetch_factor × max_results` candidates and
//!    are joined before fusion starts.
//! 2. A stage whose collaborator errors or exceeds the stage timeout
//!    contributes an empty list.
//! 3. If fusion itself fails, the search is answered by a fresh keyword-only
//!    pass at the original `max_results`.
//!
//! Dropping the future returned by [`HybridSearchEngine::search`] drops both
//! stage futures with it; a cancelled search produces nothing.


use super::analyzer::{analyze, AnalyzedQuery};
use super::filter::SearchFilters;
use super::fusion::RankFusion;
use super::keyword::rank_products;
use super::types::{Candidate, ProductId, RankedList, SearchError, SearchStage};
use crate::catalog::{resolve_image_url, CatalogProvider};
use crate::config::SearchConfig;
use crate::error::{CatalogError, VectorSearchError};
use crate::metrics::{elapsed_ms, global_metrics, SearchMetrics, SearchTimings};
use crate::semantic::VectorSearchClient;
use instant::Instant;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Why a stage produced no candidates.
#[derive(Debug, Error)]
enum StageError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Vector(#[from] VectorSearchError),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Hybrid search engine combining keyword scoring and semantic retrieval.
///
/// Generic over the two collaborators so hosts can plug in their own
/// inventory and vector search adapters. The engine holds no mutable state;
/// share it behind an `Arc` to serve concurrent searches.
///
/// # Type Parameters
///
/// * `C` - Catalog implementation (e.g. [`InMemoryCatalog`](crate::catalog::InMemoryCatalog))
/// * `V` - Vector search implementation (e.g. [`StaticVectorIndex`](crate::semantic::StaticVectorIndex))
pub struct HybridSearchEngine<C: CatalogProvider, V: VectorSearchClient> {
    catalog: C,
    vector: V,
    fusion: RankFusion,
    config: SearchConfig,
    metrics: SearchMetrics,
}

impl<C: CatalogProvider, V: VectorSearchClient> HybridSearchEngine<C, V> {
    /// Creates an engine that records to the global metrics collector.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if the fusion settings are
    /// invalid.
    pub fn new(catalog: C, vector: V, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let fusion = RankFusion::new(config.fusion)?;
        Ok(Self {
            catalog,
            vector,
            fusion,
            config,
            metrics: global_metrics().clone(),
        })
    }

    /// Records to `metrics` instead of the global collector.
    pub fn with_metrics(mut self, metrics: SearchMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn vector_client(&self) -> &V {
        &self.vector
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Searches products with both stages and fuses the results.
    ///
    /// # Arguments
    /// * `query` - Shopper's free-text query
    /// * `filters` - Optional restrictions; `None` restricts nothing
    /// * `max_results` - Result limit, `0` means the configured default
    ///
    /// # Returns
    /// At most `max_results` candidates sorted by fused score (descending).
    /// Collaborator failures and fusion failures degrade the result instead
    /// of surfacing as errors.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidQuery`] if `query` is empty or
    /// whitespace-only.
    #[must_use = "Search results should be used or errors handled"]
    #[instrument(skip_all, fields(query_len = query.len(), max_results = max_results))]
    pub async fn search(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        max_results: usize,
    ) -> Result<RankedList, SearchError> {
        validate_query(query)?;
        let start = Instant::now();
        let max_results = self.config.resolve_max_results(max_results);
        let fetch_size = self.config.stage_fetch_size(max_results);
        let analyzed = analyze(query);

        let (keyword_outcome, semantic_outcome) = tokio::join!(
            self.run_stage(
                SearchStage::Keyword,
                self.keyword_candidates(&analyzed, filters, fetch_size),
            ),
            self.run_stage(
                SearchStage::Semantic,
                self.semantic_candidates(query, filters, fetch_size),
            ),
        );
        let (keyword, keyword_ms) = keyword_outcome;
        let (semantic, semantic_ms) = semantic_outcome;

        let fusion_start = Instant::now();
        let results = match self.fusion.fuse(&keyword, &semantic, max_results, query) {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "Rank fusion failed, falling back to keyword-only search");
                let (fallback, _) = self
                    .run_stage(
                        SearchStage::Keyword,
                        self.keyword_candidates(&analyzed, filters, max_results),
                    )
                    .await;
                self.metrics.record_fallback(fallback.len(), elapsed_ms(start));
                return Ok(fallback);
            }
        };
        let fusion_ms = elapsed_ms(fusion_start);

        info!(
            keyword = keyword.len(),
            semantic = semantic.len(),
            results = results.len(),
            "Hybrid search completed"
        );

        self.metrics.record_search(
            SearchTimings {
                keyword_ms,
                semantic_ms,
                fusion_ms,
                total_ms: elapsed_ms(start),
            },
            keyword.len(),
            semantic.len(),
            results.len(),
            results.top_score(),
        );

        Ok(results)
    }

    /// Runs only the keyword stage.
    ///
    /// Scores are keyword scores in `[0.0, 1.0]`. A catalog failure or
    /// timeout yields an empty list.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidQuery`] for an empty query.
    #[must_use = "Search results should be used or errors handled"]
    pub async fn search_keyword(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        max_results: usize,
    ) -> Result<RankedList, SearchError> {
        validate_query(query)?;
        let max_results = self.config.resolve_max_results(max_results);
        let analyzed = analyze(query);
        let (results, _) = self
            .run_stage(
                SearchStage::Keyword,
                self.keyword_candidates(&analyzed, filters, max_results),
            )
            .await;
        Ok(results)
    }

    /// Runs only the semantic stage.
    ///
    /// Scores are the vector service's raw similarities. A collaborator
    /// failure or timeout yields an empty list.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidQuery`] for an empty query.
    #[must_use = "Search results should be used or errors handled"]
    pub async fn search_semantic(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        max_results: usize,
    ) -> Result<RankedList, SearchError> {
        validate_query(query)?;
        let max_results = self.config.resolve_max_results(max_results);
        let (results, _) = self
            .run_stage(
                SearchStage::Semantic,
                self.semantic_candidates(query, filters, max_results),
            )
            .await;
        Ok(results)
    }

    /// Awaits a stage under the configured timeout, absorbing failures.
    ///
    /// Returns the stage list (empty on failure) and its duration in ms.
    async fn run_stage<F>(&self, stage: SearchStage, work: F) -> (RankedList, f64)
    where
        F: Future<Output = Result<RankedList, StageError>>,
    {
        let start = Instant::now();
        let outcome = match self.config.stage_timeout() {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or_else(|_| Err(StageError::Timeout(limit))),
            None => work.await,
        };
        let duration_ms = elapsed_ms(start);

        match outcome {
            Ok(list) => {
                debug!(%stage, results = list.len(), duration_ms, "Stage completed");
                (list, duration_ms)
            }
            Err(e) => {
                warn!(%stage, error = %e, "Search stage failed, continuing without its results");
                self.metrics.record_stage_failure(stage);
                (RankedList::new(), duration_ms)
            }
        }
    }

    #[instrument(skip_all, fields(limit = limit))]
    async fn keyword_candidates(
        &self,
        query: &AnalyzedQuery,
        filters: Option<&SearchFilters>,
        limit: usize,
    ) -> Result<RankedList, StageError> {
        let mut products = self.catalog.list_products().await?;
        if let Some(filters) = filters {
            products.retain(|product| filters.matches_product(product));
        }
        Ok(rank_products(&products, query, limit))
    }

    #[instrument(skip_all, fields(limit = limit))]
    async fn semantic_candidates(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        limit: usize,
    ) -> Result<RankedList, StageError> {
        let hits = self.vector.semantic_search(query, limit).await?;
        // Kept in the service's order: position is the semantic rank
        let mut candidates: Vec<Candidate> = hits
            .iter()
            .filter_map(|hit| {
                if !hit.similarity_score.is_finite() {
                    warn!(product = %hit.product_id, "Dropping vector hit with non-finite similarity");
                    return None;
                }
                let mut candidate = hit.to_candidate();
                if candidate.image_url.trim().is_empty() {
                    candidate.image_url = resolve_image_url(&candidate.name);
                }
                Some(candidate)
            })
            .collect();

        if let Some(filters) = filters {
            candidates.retain(|c| filters.matches_price_and_stock(c.price, c.available_stock));

            // Hits carry no attributes; check them on the catalog records
            if filters.has_attribute_constraints() && !candidates.is_empty() {
                let ids: Vec<ProductId> = candidates.iter().map(|c| c.id).collect();
                let allowed: HashSet<ProductId> = self
                    .catalog
                    .get_products_batch(&ids)
                    .await?
                    .into_iter()
                    .filter(|product| filters.matches_product(product))
                    .map(|product| product.id)
                    .collect();
                candidates.retain(|c| allowed.contains(&c.id));
            }
        }

        Ok(RankedList::from_ranked(candidates, limit))
    }
}

fn validate_query(query: &str) -> Result<(), SearchError> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidQuery(
            "Query text cannot be empty".to_string(),
        ));
    }
    Ok(())
}
