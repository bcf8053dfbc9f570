//! End-to-end tests for the hybrid search pipeline.
//!
//! These tests exercise the full workflow through the public API:
//! query analysis → keyword stage over an in-memory catalog → semantic stage
//! over recorded vector hits → weighted RRF fusion → cutoff.
//!
//! Run with: `cargo test -p storefront-core --test integration_tests`

use async_trait::async_trait;
use storefront_core::catalog::{CatalogProvider, InMemoryCatalog, Product};
use storefront_core::config::{FusionConfig, SearchConfig, MODEL_TRIGRAM_WEIGHT, RRF_K};
use storefront_core::error::{CatalogError, VectorSearchError};
use storefront_core::metrics::SearchMetrics;
use storefront_core::search::keyword::score_product_name;
use storefront_core::search::{
    analyze, HybridSearchEngine, ProductId, RankFusion, RankedList, SearchFilters,
};
use storefront_core::semantic::{StaticVectorIndex, VectorHit, VectorSearchClient};

// ============================================================================
// Fixtures
// ============================================================================

fn id(raw: u64) -> ProductId {
    ProductId::from_u64(raw)
}

fn ids(list: &RankedList) -> Vec<u64> {
    list.iter().map(|c| c.id.as_u64()).collect()
}

fn storefront_catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_products(vec![
        Product::new(id(1), "Logitech Wireless Mouse Pro", 59.99, 12)
            .with_category("electronics")
            .with_brand("Logitech"),
        Product::new(id(2), "Gaming Mouse", 39.99, 4).with_category("electronics"),
        Product::new(id(3), "Mouse Pad XL", 14.99, 30).with_category("accessories"),
        Product::new(id(4), "ASUS RTX 4080 GPU", 1199.0, 2)
            .with_category("electronics")
            .with_brand("ASUS"),
        Product::new(id(5), "Mechanical Keyboard", 89.0, 7).with_category("electronics"),
        Product::new(id(6), "NorthPeak Winter Jacket", 99.0, 3)
            .with_category("clothing")
            .with_color("navy")
            .with_sizes(["S", "M", "L"])
            .with_tags(["outdoor", "winter"]),
        Product::new(id(7), "Retired Trackpad", 45.0, 9).inactive(),
    ])
}

fn hit(raw: u64, name: &str, similarity: f64) -> VectorHit {
    VectorHit {
        product_id: id(raw),
        product_name: name.to_string(),
        description: String::new(),
        image_url: format!("/img/{raw}.png"),
        price: 20.0,
        available_stock: 5,
        similarity_score: similarity,
    }
}

fn five_hits() -> Vec<VectorHit> {
    vec![
        hit(2, "Gaming Mouse", 0.91),
        hit(1, "Logitech Wireless Mouse Pro", 0.88),
        hit(3, "Mouse Pad XL", 0.75),
        hit(5, "Mechanical Keyboard", 0.61),
        hit(8, "Vertical Mouse", 0.55),
    ]
}

fn vector_index() -> StaticVectorIndex {
    StaticVectorIndex::new()
        .with_response("wireless mouse", five_hits())
        .with_response("gaming mouse", five_hits())
        .with_response("mouse", five_hits())
        .with_response("logitech wireless mouse pro", five_hits())
}

fn engine<C: CatalogProvider, V: VectorSearchClient>(
    catalog: C,
    vector: V,
    config: SearchConfig,
) -> HybridSearchEngine<C, V> {
    HybridSearchEngine::new(catalog, vector, config)
        .expect("valid config")
        .with_metrics(SearchMetrics::new())
}

struct UnavailableCatalog;

#[async_trait]
impl CatalogProvider for UnavailableCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }
}

struct ThrowingVectorSearch;

#[async_trait]
impl VectorSearchClient for ThrowingVectorSearch {
    async fn semantic_search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<VectorHit>, VectorSearchError> {
        Err(VectorSearchError::Backend("index shard crashed".to_string()))
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_substring_and_term_bonuses() {
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let results = engine
        .search_keyword("wireless mouse", None, 10)
        .await
        .unwrap();

    let top = &results.as_slice()[0];
    assert_eq!(top.id, id(1));
    assert!(top.relevance_score > 0.8);
}

#[tokio::test]
async fn test_scenario_exact_name_wins_after_fusion() {
    // Semantic ranks "Gaming Mouse" first, the exact match second
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let results = engine
        .search("logitech wireless mouse pro", None, 10)
        .await
        .unwrap();

    assert_eq!(results.as_slice()[0].id, id(1));
    assert!(results.as_slice()[0].relevance_score > 1.0);
    // Keyword stage alone scores it exactly 1.0
    let keyword = engine
        .search_keyword("Logitech Wireless Mouse Pro", None, 1)
        .await
        .unwrap();
    assert_eq!(keyword.top_score(), Some(1.0));
}

#[tokio::test]
async fn test_scenario_catalog_down_uses_semantic_ranks() {
    let config = SearchConfig {
        fusion: FusionConfig {
            min_absolute_score: 0.0,
            ..FusionConfig::default()
        },
        ..SearchConfig::default()
    };
    let engine = engine(UnavailableCatalog, vector_index(), config);
    let results = engine.search("wireless mouse", None, 10).await.unwrap();

    // Same order as the semantic list, rescored by rank only
    assert_eq!(ids(&results), vec![2, 1, 3, 5, 8]);
    for (position, candidate) in results.iter().enumerate() {
        let expected = 0.6 / (RRF_K + position + 1) as f64;
        assert!((candidate.relevance_score - expected).abs() < 1e-12);
    }
    // All five survive the relative cutoff: 61 / 65 > 0.7
    let top = results.top_score().unwrap();
    assert!(results.iter().all(|c| c.relevance_score >= top * 0.7));
}

#[tokio::test]
async fn test_scenario_catalog_down_default_floor() {
    // With the default 0.01 floor, semantic-only fusion scores are all too low
    let engine = engine(UnavailableCatalog, vector_index(), SearchConfig::default());
    let results = engine.search("wireless mouse", None, 10).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_scenario_semantic_failure_returns_keyword_ranking() {
    let engine = engine(
        storefront_catalog(),
        ThrowingVectorSearch,
        SearchConfig::default(),
    );

    let hybrid = engine.search("mouse", None, 10).await.unwrap();
    let keyword = engine.search_keyword("mouse", None, 10).await.unwrap();

    assert!(!hybrid.is_empty());
    assert_eq!(hybrid.ids(), keyword.ids());
    assert_eq!(engine.metrics().snapshot().semantic_stage_failures, 1);
}

#[tokio::test]
async fn test_scenario_model_number_trigrams() {
    let query = analyze("rtx4080 graphics card");
    let score = score_product_name("ASUS RTX 4080 GPU", &query);
    assert!(score > 0.0);
    assert!((score - (10.0 / 17.0) * MODEL_TRIGRAM_WEIGHT).abs() < 1e-9);

    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let results = engine
        .search_keyword("rtx4080 graphics card", None, 5)
        .await
        .unwrap();
    assert_eq!(ids(&results), vec![4]);
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn test_keyword_scores_bounded_over_catalog() {
    let catalog = storefront_catalog();
    let products = catalog.list_products().await.unwrap();
    let queries = [
        "mouse",
        "wireless mouse",
        "logitech wireless mouse pro",
        "rtx 4080",
        "rtx-4080 asus gpu",
        "x",
        "jacket winter navy",
        "!!!",
    ];

    for product in &products {
        for query in queries {
            let score = score_product_name(&product.name, &analyze(query));
            assert!(
                (0.0..=1.0).contains(&score),
                "{} / {query} -> {score}",
                product.name
            );
        }
    }
}

#[tokio::test]
async fn test_hybrid_output_sorted_and_above_cutoff() {
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());

    for query in ["mouse", "gaming mouse", "wireless mouse", "keyboard"] {
        let results = engine.search(query, None, 10).await.unwrap();
        let Some(top) = results.top_score() else {
            continue;
        };
        let cutoff = (top * 0.7).max(0.01);
        assert!(results
            .as_slice()
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert!(results.iter().all(|c| c.relevance_score >= cutoff), "{query}");
        assert!(results.len() <= 10);
    }
}

#[tokio::test]
async fn test_repeated_search_is_identical() {
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let first = engine.search("gaming mouse", None, 10).await.unwrap();
    for _ in 0..5 {
        assert_eq!(engine.search("gaming mouse", None, 10).await.unwrap(), first);
    }
}

#[test]
fn test_fusing_two_empty_lists() {
    let fused = RankFusion::default()
        .fuse(&RankedList::new(), &RankedList::new(), 10, "anything")
        .unwrap();
    assert!(fused.is_empty());
}

#[tokio::test]
async fn test_inactive_products_never_returned() {
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let results = engine.search_keyword("trackpad", None, 10).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_filtered_search_end_to_end() {
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let filters = SearchFilters {
        category: Some("clothing".to_string()),
        color: Some("NAVY".to_string()),
        size: Some("m".to_string()),
        persona_tags: vec!["winter".to_string()],
        ..SearchFilters::default()
    };

    let results = engine
        .search("winter jacket", Some(&filters), 10)
        .await
        .unwrap();
    assert_eq!(ids(&results), vec![6]);

    let mouse = engine.search("mouse", Some(&filters), 10).await.unwrap();
    assert!(mouse.is_empty());
}

#[tokio::test]
async fn test_semantic_only_search_keeps_service_order() {
    let engine = engine(storefront_catalog(), vector_index(), SearchConfig::default());
    let results = engine
        .search_semantic("wireless mouse", None, 3)
        .await
        .unwrap();

    assert_eq!(ids(&results), vec![2, 1, 3]);
    assert_eq!(results.as_slice()[0].image_url, "/img/2.png");
}
