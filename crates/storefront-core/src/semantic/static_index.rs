//! Recorded vector search responses.

use super::{VectorHit, VectorSearchClient};
use crate::error::VectorSearchError;
use std::collections::HashMap;
use std::path::Path;

/// A vector search client that replays hits recorded per query.
///
/// Queries are matched after trimming and lowercasing. Unknown queries get
/// no hits, like an index with nothing close enough.
#[derive(Debug, Clone, Default)]
pub struct StaticVectorIndex {
    responses: HashMap<String, Vec<VectorHit>>,
}

impl StaticVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the hits returned for `query`. Hits are stored sorted by similarity.
    pub fn with_response(mut self, query: &str, mut hits: Vec<VectorHit>) -> Self {
        hits.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        self.responses.insert(normalize(query), hits);
        self
    }

    /// Parses a JSON object mapping query text to an array of hits.
    pub fn from_json(json: &str) -> Result<Self, VectorSearchError> {
        let responses: HashMap<String, Vec<VectorHit>> = serde_json::from_str(json)?;
        Ok(responses
            .into_iter()
            .fold(Self::new(), |index, (query, hits)| index.with_response(&query, hits)))
    }

    /// Reads recorded responses from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VectorSearchError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VectorSearchError::Unavailable(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Number of recorded queries.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

#[async_trait::async_trait]
impl VectorSearchClient for StaticVectorIndex {
    async fn semantic_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VectorHit>, VectorSearchError> {
        Ok(self
            .responses
            .get(&normalize(query))
            .map(|hits| hits.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}
