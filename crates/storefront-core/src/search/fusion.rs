//! Weighted Reciprocal Rank Fusion of the keyword and semantic lists.
//!
//! Each stage contributes `weight / (k + rank)` for every product it ranked
//! (rank is 1-based). Products found by the keyword stage also receive a
//! lexical boost when their name matches the original query:
//!
//! | Name vs. query (case-insensitive) | Boost  |
//! |-----------------------------------|--------|
//! | equal                             | `+1.0` |
//! | contains                          | `+0.2` |
//! | starts with                       | `+0.1` |
//!
//! Only the first matching boost applies. Because containment is checked
//! before prefix, a prefix match always also counts as containment, so the
//! prefix boost only fires for names that cannot contain the query.
//!
//! After scoring, candidates are sorted by fused score and everything below
//! `max(top × 0.7, 0.01)` is dropped, so results stay close to the best match.

use super::types::{Candidate, FusionError, ProductId, RankedList, SearchError, SearchStage};
use crate::config::FusionConfig;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Transient merge state for one product.
struct FusionRecord<'a> {
    /// Keyword record when present, otherwise the semantic one
    primary: &'a Candidate,
    available_stock: u32,
    score: f64,
}

/// Merges the two stage lists into the final ranking.
///
/// Holds a validated [`FusionConfig`]; construct it once and reuse it for
/// every search.
#[derive(Debug, Clone, Copy)]
pub struct RankFusion {
    config: FusionConfig,
}

impl Default for RankFusion {
    fn default() -> Self {
        Self {
            config: FusionConfig::default(),
        }
    }
}

impl RankFusion {
    /// Creates a fusion engine after validating the configuration.
    pub fn new(config: FusionConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuses the keyword and semantic lists into at most `max_results`
    /// candidates.
    ///
    /// Output candidates are new values carrying the fused score; the input
    /// lists are left untouched. Candidates with equal fused scores keep the
    /// order of the id union: keyword list order first, then products only
    /// the semantic stage found, in semantic order.
    ///
    /// # Errors
    ///
    /// - [`FusionError::DuplicateCandidate`] if either list ranks a product twice
    /// - [`FusionError::NonFiniteScore`] if a fused score overflows
    #[instrument(skip_all, fields(keyword = keyword.len(), semantic = semantic.len(), max_results = max_results))]
    pub fn fuse(
        &self,
        keyword: &RankedList,
        semantic: &RankedList,
        max_results: usize,
        query: &str,
    ) -> Result<RankedList, FusionError> {
        let query_lower = query.to_lowercase();
        let mut records: Vec<FusionRecord<'_>> =
            Vec::with_capacity(keyword.len() + semantic.len());
        let mut index: HashMap<ProductId, usize> = HashMap::new();

        for (position, candidate) in keyword.iter().enumerate() {
            if index.contains_key(&candidate.id) {
                return Err(FusionError::DuplicateCandidate {
                    stage: SearchStage::Keyword,
                    id: candidate.id,
                });
            }
            let score = self.rrf_term(self.config.keyword_weight, position + 1)
                + self.lexical_boost(&candidate.name, &query_lower);
            index.insert(candidate.id, records.len());
            records.push(FusionRecord {
                primary: candidate,
                available_stock: candidate.available_stock,
                score,
            });
        }

        let mut seen_semantic = HashSet::new();
        for (position, candidate) in semantic.iter().enumerate() {
            if !seen_semantic.insert(candidate.id) {
                return Err(FusionError::DuplicateCandidate {
                    stage: SearchStage::Semantic,
                    id: candidate.id,
                });
            }
            let contribution = self.rrf_term(self.config.semantic_weight, position + 1);
            match index.get(&candidate.id) {
                Some(&slot) => {
                    let record = &mut records[slot];
                    record.score += contribution;
                    // Stock is the one field the semantic record can override
                    if record.available_stock == 0 && candidate.available_stock > 0 {
                        record.available_stock = candidate.available_stock;
                    }
                }
                None => {
                    index.insert(candidate.id, records.len());
                    records.push(FusionRecord {
                        primary: candidate,
                        available_stock: candidate.available_stock,
                        score: contribution,
                    });
                }
            }
        }

        if let Some(bad) = records.iter().find(|r| !r.score.is_finite()) {
            return Err(FusionError::NonFiniteScore { id: bad.primary.id });
        }

        // Stable: ties keep union order
        records.sort_by(|a, b| b.score.total_cmp(&a.score));

        let Some(top_score) = records.first().map(|r| r.score) else {
            return Ok(RankedList::new());
        };
        let cutoff =
            (top_score * self.config.min_relative_to_top).max(self.config.min_absolute_score);

        let fused: Vec<Candidate> = records
            .into_iter()
            .filter(|r| r.score >= cutoff)
            .take(max_results)
            .map(|r| Candidate {
                available_stock: r.available_stock,
                ..r.primary.with_score(r.score)
            })
            .collect();

        debug!(
            top_score,
            cutoff,
            returned = fused.len(),
            "Fused keyword and semantic rankings"
        );

        Ok(RankedList::from_candidates(fused))
    }

    /// Boost for a keyword-stage candidate whose name matches the query.
    ///
    /// `query_lower` must already be lowercased.
    pub fn lexical_boost(&self, name: &str, query_lower: &str) -> f64 {
        let name_lower = name.to_lowercase();
        if name_lower == query_lower {
            self.config.exact_match_boost
        } else if name_lower.contains(query_lower) {
            self.config.contains_boost
        } else if name_lower.starts_with(query_lower) {
            self.config.prefix_boost
        } else {
            0.0
        }
    }

    fn rrf_term(&self, weight: f64, rank: usize) -> f64 {
        weight * (1.0 / (self.config.rrf_k as f64 + rank as f64))
    }
}
