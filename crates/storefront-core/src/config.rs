//! Ranking constants and engine configuration.
//!
//! Every weight, boost and cutoff used by the search pipeline is defined here
//! once. The keyword scorer reads the scoring constants directly; the fusion
//! engine and orchestrator receive them through [`FusionConfig`] and
//! [`SearchConfig`] so that tests and deployments can tune them without
//! touching the ranking code.
//!
//! # Usage
//!
//! ```
//! use storefront_core::config::{FusionConfig, SearchConfig, RRF_K};
//!
//! let fusion = FusionConfig::default();
//! assert_eq!(fusion.rrf_k, RRF_K);
//!
//! let config = SearchConfig {
//!     fusion,
//!     ..SearchConfig::default()
//! };
//! assert_eq!(config.resolve_max_results(0), 10);
//! ```

use crate::search::types::SearchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Rank Fusion
// =============================================================================

/// Weight of the keyword stage's reciprocal rank term.
pub const KEYWORD_WEIGHT: f64 = 0.4;

/// Weight of the semantic stage's reciprocal rank term.
pub const SEMANTIC_WEIGHT: f64 = 0.6;

/// RRF smoothing constant (Cormack, Clarke & Buettcher, SIGIR 2009).
///
/// Larger values flatten the difference between adjacent ranks.
pub const RRF_K: usize = 60;

/// Fused results must score at least this fraction of the top result.
pub const MIN_RELATIVE_TO_TOP: f64 = 0.7;

/// Absolute floor on fused scores, drops near-zero noise.
///
/// Note that a candidate seen by only one stage, without a lexical boost, can
/// never clear this floor: `0.6 / 61 ≈ 0.0098`.
pub const MIN_ABSOLUTE_SCORE: f64 = 0.01;

/// Fused-score boost when the product name equals the query (case-insensitive).
pub const EXACT_MATCH_BOOST: f64 = 1.0;

/// Fused-score boost when the product name contains the query.
pub const CONTAINS_BOOST: f64 = 0.2;

/// Fused-score boost when the product name starts with the query.
pub const PREFIX_BOOST: f64 = 0.1;

// =============================================================================
// Keyword Scoring
// =============================================================================

/// Score of a product whose name equals the query. Short-circuits scoring.
pub const EXACT_NAME_SCORE: f64 = 1.0;

/// Bonus when the lowercased name contains the lowercased query.
pub const SUBSTRING_BONUS: f64 = 0.8;

/// Total bonus shared evenly across the query terms found in the name.
pub const TERM_BONUS_TOTAL: f64 = 0.3;

/// Bonus when the lowercased name starts with the lowercased query.
pub const PREFIX_BONUS: f64 = 0.1;

/// Bonus when the compact (alphanumeric-only) name contains the compact query.
pub const COMPACT_BONUS: f64 = 0.5;

/// Multiplier applied to the Dice coefficient of model-token trigrams.
pub const MODEL_TRIGRAM_WEIGHT: f64 = 0.6;

/// Upper bound of a keyword score.
pub const MAX_KEYWORD_SCORE: f64 = 1.0;

/// Minimum length of a model-like token (e.g. `rtx4080`).
pub const MODEL_TOKEN_MIN_LEN: usize = 5;

/// Character n-gram size used for fuzzy model matching.
pub const NGRAM_SIZE: usize = 3;

// =============================================================================
// Orchestration
// =============================================================================

/// Result count used when the caller asks for zero results.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Each stage fetches `max_results * OVERFETCH_FACTOR` candidates.
pub const OVERFETCH_FACTOR: usize = 2;

/// Upper bound on how long a single stage may wait for its collaborator.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Weights, boosts and cutoffs of the Rank Fusion Engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub keyword_weight: f64,
    pub semantic_weight: f64,
    pub rrf_k: usize,
    pub min_relative_to_top: f64,
    pub min_absolute_score: f64,
    pub exact_match_boost: f64,
    pub contains_boost: f64,
    pub prefix_boost: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            keyword_weight: KEYWORD_WEIGHT,
            semantic_weight: SEMANTIC_WEIGHT,
            rrf_k: RRF_K,
            min_relative_to_top: MIN_RELATIVE_TO_TOP,
            min_absolute_score: MIN_ABSOLUTE_SCORE,
            exact_match_boost: EXACT_MATCH_BOOST,
            contains_boost: CONTAINS_BOOST,
            prefix_boost: PREFIX_BOOST,
        }
    }
}

impl FusionConfig {
    /// Checks that every value can produce a finite, ordered fused score.
    pub fn validate(&self) -> Result<(), SearchError> {
        let non_negative = [
            ("keyword_weight", self.keyword_weight),
            ("semantic_weight", self.semantic_weight),
            ("min_absolute_score", self.min_absolute_score),
            ("exact_match_boost", self.exact_match_boost),
            ("contains_boost", self.contains_boost),
            ("prefix_boost", self.prefix_boost),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if self.rrf_k == 0 {
            return Err(SearchError::InvalidConfig(
                "rrf_k must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.min_relative_to_top) {
            return Err(SearchError::InvalidConfig(format!(
                "min_relative_to_top must be within [0, 1], got {}",
                self.min_relative_to_top
            )));
        }

        Ok(())
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fusion weights and cutoffs.
    pub fusion: FusionConfig,
    /// Result count used when a search asks for zero results.
    pub default_max_results: usize,
    /// Over-fetch multiplier applied to each stage.
    pub overfetch_factor: usize,
    /// Per-stage collaborator timeout in milliseconds. `None` waits forever.
    pub stage_timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fusion: FusionConfig::default(),
            default_max_results: DEFAULT_MAX_RESULTS,
            overfetch_factor: OVERFETCH_FACTOR,
            stage_timeout_ms: Some(DEFAULT_STAGE_TIMEOUT.as_millis() as u64),
        }
    }
}

impl SearchConfig {
    /// Per-stage timeout as a [`Duration`].
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_ms.map(Duration::from_millis)
    }

    /// Maps a requested result count to the effective one (`0` means default).
    pub fn resolve_max_results(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_max_results.max(1)
        } else {
            requested
        }
    }

    /// Number of candidates each stage fetches for `max_results` final results.
    pub fn stage_fetch_size(&self, max_results: usize) -> usize {
        max_results.saturating_mul(self.overfetch_factor.max(1))
    }

    /// Validates the fusion settings.
    pub fn validate(&self) -> Result<(), SearchError> {
        self.fusion.validate()
    }
}
