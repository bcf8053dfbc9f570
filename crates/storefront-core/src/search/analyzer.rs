//! Query analysis for keyword scoring.
//!
//! Turns a raw query into the normalized pieces the keyword scorer needs:
//! the lowercased text, a compact form with every separator removed, the
//! alphanumeric terms, and character trigrams of model-like terms.
//!
//! # Model-like tokens
//!
//! Shoppers type SKUs and model numbers in many spellings (`RTX 4080`,
//! `rtx-4080`, `rtx4080`). A term is treated as a model number when it is at
//! least [`MODEL_TOKEN_MIN_LEN`] characters long and mixes letters with
//! digits. Its trigrams are later compared with the trigrams of the compact
//! product name, so spacing and punctuation differences still match.

use crate::config::{MODEL_TOKEN_MIN_LEN, NGRAM_SIZE};
use std::collections::{BTreeSet, HashSet};

/// A query broken down for keyword scoring.
///
/// Created once per search and shared read-only by every product score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedQuery {
    /// Original query text
    pub original: String,
    /// Lowercased query text, separators kept
    pub lowercased: String,
    /// Lowercased letters and digits only
    pub compact: String,
    /// Maximal letter/digit runs of the lowercased query, in order
    pub terms: Vec<String>,
    /// Trigrams of the model-like terms
    pub model_trigrams: HashSet<String>,
}

impl AnalyzedQuery {
    /// Analyzes a raw query string.
    ///
    /// Pure and infallible: empty or whitespace-only input yields empty
    /// terms and an empty trigram set.
    pub fn new(query: &str) -> Self {
        let lowercased = query.to_lowercase();
        let terms = tokenize(&lowercased);
        let compact = compact(query);

        // BTreeSet dedupes the model tokens
        let model_tokens: BTreeSet<String> = terms
            .iter()
            .filter(|term| is_model_like(term))
            .map(|term| compact_lowercase(term))
            .filter(|token| token.chars().count() >= NGRAM_SIZE)
            .collect();

        let mut model_trigrams = HashSet::new();
        for token in &model_tokens {
            model_trigrams.extend(ngrams(token, NGRAM_SIZE));
        }

        Self {
            original: query.to_string(),
            lowercased,
            compact,
            terms,
            model_trigrams,
        }
    }

    /// True when the query has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Analyzes a raw query string. See [`AnalyzedQuery::new`].
pub fn analyze(query: &str) -> AnalyzedQuery {
    AnalyzedQuery::new(query)
}

/// Splits text into maximal runs of letters and digits.
///
/// Any other character ends the current term. Case is preserved; callers
/// lowercase first when they need case-insensitive terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercases text and drops everything except letters and digits.
///
/// `"RTX-4080 Ti"` becomes `"rtx4080ti"`.
pub fn compact(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    compact_lowercase(&text.to_lowercase())
}

fn compact_lowercase(lowercased: &str) -> String {
    lowercased.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// True for probable product codes: long enough, with letters and digits.
pub fn is_model_like(term: &str) -> bool {
    if term.chars().count() < MODEL_TOKEN_MIN_LEN {
        return false;
    }
    let has_letter = term.chars().any(char::is_alphabetic);
    let has_digit = term.chars().any(char::is_numeric);
    has_letter && has_digit
}

/// All contiguous `n`-character substrings of `value`, as a set.
///
/// A non-empty value no longer than `n` yields itself as its only gram, so
/// short compact names can still overlap with short query tokens.
pub fn ngrams(value: &str, n: usize) -> HashSet<String> {
    let mut grams = HashSet::new();
    if value.trim().is_empty() || n == 0 {
        return grams;
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= n {
        grams.insert(value.to_string());
        return grams;
    }

    for window in chars.windows(n) {
        grams.insert(window.iter().collect());
    }
    grams
}
