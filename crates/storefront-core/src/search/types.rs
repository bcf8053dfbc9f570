use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Catalog product identifier.
///
/// The fusion key: a product ranked by both stages is merged into one
/// candidate by its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Creates a ProductId from a raw u64 value.
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value of this ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which stage of the hybrid pipeline produced a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStage {
    /// Lexical matching of product names
    Keyword,
    /// Embedding similarity via the vector search service
    Semantic,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStage::Keyword => f.write_str("keyword"),
            SearchStage::Semantic => f.write_str("semantic"),
        }
    }
}

/// A product projection carried through the search pipeline.
///
/// `relevance_score` means different things at different points:
/// - keyword stage: keyword score in `[0.0, 1.0]`
/// - semantic stage: raw similarity from the vector service (unnormalized)
/// - after fusion: the fused RRF score including lexical boosts
///
/// This is also the row returned to search callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Product identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Product image location
    pub image_url: String,
    /// Unit price
    pub price: f64,
    /// Units available for sale
    pub available_stock: u32,
    /// Stage-dependent relevance, see type docs
    pub relevance_score: f64,
}

impl Candidate {
    /// Returns a copy of this candidate carrying a different score.
    pub fn with_score(&self, relevance_score: f64) -> Self {
        Self {
            relevance_score,
            ..self.clone()
        }
    }
}

/// Candidates ordered by non-increasing relevance score.
///
/// Rank is implied by position (1-based). Constructors and deserialization
/// sort by score, except [`RankedList::from_ranked`], which keeps an order
/// the producer already ranked. Sorting is stable: candidates with equal
/// scores keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedList(Vec<Candidate>);

impl RankedList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sorts candidates by descending score and wraps them.
    pub fn from_candidates(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        Self(candidates)
    }

    /// Wraps candidates already ranked by their producer, keeping at most
    /// `limit` of them.
    ///
    /// The order is taken as-is; position defines rank even if scores
    /// disagree with it.
    pub fn from_ranked(mut candidates: Vec<Candidate>, limit: usize) -> Self {
        candidates.truncate(limit);
        Self(candidates)
    }

    /// Sorts, then keeps at most `limit` candidates.
    pub fn top_k(candidates: Vec<Candidate>, limit: usize) -> Self {
        let mut list = Self::from_candidates(candidates);
        list.0.truncate(limit);
        list
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.0
    }

    /// Score of the first candidate, if any.
    pub fn top_score(&self) -> Option<f64> {
        self.0.first().map(|c| c.relevance_score)
    }

    /// Product ids in rank order.
    pub fn ids(&self) -> Vec<ProductId> {
        self.0.iter().map(|c| c.id).collect()
    }
}

impl<'de> Deserialize<'de> for RankedList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Candidate>::deserialize(deserializer).map(Self::from_candidates)
    }
}

impl IntoIterator for RankedList {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Error types for search operations.
///
/// Only validation problems surface to callers. Collaborator failures are
/// absorbed by the stages and fusion failures by the keyword-only fallback.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// Invalid search query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while fusing the two stage lists.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FusionError {
    /// A stage ranked the same product more than once
    #[error("Product {id} appears more than once in the {stage} list")]
    DuplicateCandidate {
        /// Stage whose list holds the duplicate
        stage: SearchStage,
        /// Duplicated product
        id: ProductId,
    },
    /// A fused score came out NaN or infinite
    #[error("Fused score for product {id} is not finite")]
    NonFiniteScore {
        /// Product with the bad score
        id: ProductId,
    },
}
