//! Keyword scoring of product names.
//!
//! Scores a product name against an [`AnalyzedQuery`] with additive lexical
//! signals, then clamps the sum to `[0.0, 1.0]`.
//!
//! # Algorithm
//!
//! | Signal                                          | Contribution            |
//! |-------------------------------------------------|-------------------------|
//! | name equals query (case-insensitive)            | `1.0`, returned at once |
//! | name contains query                             | `+0.8`                  |
//! | each query term found in name                   | `+0.3 / term_count`     |
//! | name starts with query                          | `+0.1`                  |
//! | compact name contains compact query             | `+0.5`                  |
//! | Dice overlap of model-token trigrams            | `+dice × 0.6`           |
//!
//! Scores of zero mean "no lexical evidence"; [`rank_products`] drops them.
//!
//! # Usage
//!
//! ```
//! use storefront_core::search::analyzer::analyze;
//! use storefront_core::search::keyword::score_product_name;
//!
//! let query = analyze("wireless mouse");
//! let score = score_product_name("Logitech Wireless Mouse Pro", &query);
//! assert!(score > 0.8 && score <= 1.0);
//! ```

use super::analyzer::{compact, ngrams, AnalyzedQuery};
use super::types::{Candidate, RankedList};
use crate::catalog::Product;
use crate::config::{
    COMPACT_BONUS, EXACT_NAME_SCORE, MAX_KEYWORD_SCORE, MODEL_TRIGRAM_WEIGHT, NGRAM_SIZE,
    PREFIX_BONUS, SUBSTRING_BONUS, TERM_BONUS_TOTAL,
};
use std::collections::HashSet;
use tracing::instrument;

/// Scores a product name against an analyzed query.
///
/// Deterministic and side-effect free. The result is always within
/// `[0.0, 1.0]`.
pub fn score_product_name(product_name: &str, query: &AnalyzedQuery) -> f64 {
    let name_lower = product_name.to_lowercase();

    if name_lower == query.lowercased {
        return EXACT_NAME_SCORE;
    }

    let mut score = 0.0;

    if name_lower.contains(query.lowercased.as_str()) {
        score += SUBSTRING_BONUS;
    }

    if !query.terms.is_empty() {
        let per_term = TERM_BONUS_TOTAL / query.terms.len() as f64;
        for term in &query.terms {
            if name_lower.contains(term.as_str()) {
                score += per_term;
            }
        }
    }

    if name_lower.starts_with(query.lowercased.as_str()) {
        score += PREFIX_BONUS;
    }

    // Handles spacing and punctuation differences ("usb-c hub" vs "USB C Hub")
    let compact_name = compact(product_name);
    if !query.compact.is_empty() && compact_name.contains(query.compact.as_str()) {
        score += COMPACT_BONUS;
    }

    if !query.model_trigrams.is_empty() {
        let name_trigrams = ngrams(&compact_name, NGRAM_SIZE);
        let overlap = count_overlap(&name_trigrams, &query.model_trigrams);
        if overlap > 0 {
            let dice = (2.0 * overlap as f64)
                / (name_trigrams.len() + query.model_trigrams.len()) as f64;
            score += dice * MODEL_TRIGRAM_WEIGHT;
        }
    }

    score.min(MAX_KEYWORD_SCORE)
}

/// Number of grams present in both sets.
fn count_overlap(left: &HashSet<String>, right: &HashSet<String>) -> usize {
    let (smaller, larger) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    smaller.iter().filter(|gram| larger.contains(*gram)).count()
}

/// Scores every product, drops zero scores and returns the best `limit`.
///
/// Products with equal scores keep their catalog order.
#[instrument(skip_all, fields(products = products.len(), limit))]
pub fn rank_products(products: &[Product], query: &AnalyzedQuery, limit: usize) -> RankedList {
    let scored: Vec<Candidate> = products
        .iter()
        .filter_map(|product| {
            let score = score_product_name(&product.name, query);
            (score > 0.0).then(|| product.to_candidate(score))
        })
        .collect();

    RankedList::top_k(scored, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::analyzer::analyze;
    use crate::search::types::ProductId;

    fn product(id: u64, name: &str) -> Product {
        Product::new(ProductId::from_u64(id), name, 25.0, 5)
    }

    #[test]
    fn test_exact_match_scores_one() {
        let query = analyze("Logitech MX Master 3S");
        assert_eq!(score_product_name("logitech mx master 3s", &query), 1.0);
    }

    #[test]
    fn test_substring_and_terms() {
        // 0.8 substring + 0.3 terms + 0.5 compact, clamped
        let query = analyze("wireless mouse");
        let score = score_product_name("Logitech Wireless Mouse Pro", &query);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_partial_terms_only() {
        // Only "mouse" matches: 0.3 / 2
        let query = analyze("gaming mouse");
        let score = score_product_name("Ergonomic Mouse Pad", &query);
        assert!((score - 0.15).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_prefix_match_is_clamped() {
        // "usb" prefix: 0.8 substring + 0.3 term + 0.1 prefix + 0.5 compact -> 1.0
        let query = analyze("usb");
        assert_eq!(score_product_name("USB Hub", &query), 1.0);
    }

    #[test]
    fn test_compact_containment_bridges_separators() {
        // No substring match ("usb-c" vs "usb c"), but compact forms match
        let query = analyze("usb-c");
        let score = score_product_name("Anker USB C Charger", &query);
        // terms "usb" and "c" both found (0.3) + compact (0.5)
        assert!((score - 0.8).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_model_trigram_boost() {
        let query = analyze("rtx4080 graphics card");
        let score = score_product_name("ASUS RTX 4080 GPU", &query);
        // 5 shared trigrams, 12 in name, 5 in query: dice = 10 / 17
        let expected = (10.0 / 17.0) * MODEL_TRIGRAM_WEIGHT;
        assert!((score - expected).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_no_match_scores_zero() {
        let query = analyze("espresso machine");
        assert_eq!(score_product_name("Wool Beanie", &query), 0.0);
    }

    #[test]
    fn test_score_is_bounded() {
        let names = [
            "",
            "a",
            "Logitech Wireless Mouse Pro",
            "mouse mouse mouse mouse",
            "RTX4080 RTX4080 RTX 4080",
        ];
        let queries = ["mouse", "rtx4080 rtx 4080", "a", "wireless mouse pro max", " "];
        for name in names {
            for q in queries {
                let score = score_product_name(name, &analyze(q));
                assert!((0.0..=1.0).contains(&score), "{name:?} / {q:?} -> {score}");
            }
        }
    }

    #[test]
    fn test_count_overlap() {
        let a: HashSet<String> = ["abc", "bcd"].into_iter().map(String::from).collect();
        let b: HashSet<String> = ["bcd", "cde", "def"].into_iter().map(String::from).collect();
        assert_eq!(count_overlap(&a, &b), 1);
        assert_eq!(count_overlap(&b, &a), 1);
        assert_eq!(count_overlap(&a, &HashSet::new()), 0);
    }

    #[test]
    fn test_rank_products_drops_zero_and_truncates() {
        let products = vec![
            product(1, "Wool Beanie"),
            product(2, "Wireless Mouse"),
            product(3, "Ergonomic Mouse Pad"),
            product(4, "Gaming Mouse"),
        ];
        let query = analyze("mouse");
        let ranked = rank_products(&products, &query, 2);

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|c| c.relevance_score > 0.0));
        assert!(!ranked.ids().contains(&ProductId::from_u64(1)));
    }

    #[test]
    fn test_rank_products_keeps_catalog_order_on_ties() {
        let products = vec![
            product(9, "Gaming Mouse"),
            product(2, "Office Mouse"),
            product(5, "Travel Mouse"),
        ];
        let ranked = rank_products(&products, &analyze("mouse"), 10);
        assert_eq!(
            ranked.ids(),
            vec![
                ProductId::from_u64(9),
                ProductId::from_u64(2),
                ProductId::from_u64(5)
            ]
        );
    }
}
