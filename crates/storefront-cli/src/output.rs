//! Output formatting for search results.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use serde::Serialize;
use storefront_core::search::{Candidate, RankedList};

/// Maximum characters of a product name shown in terminal output
const NAME_MAX_LEN: usize = 60;

/// JSON output structure for search results
#[derive(Serialize)]
pub struct JsonOutput {
    pub query: String,
    pub results: Vec<JsonResult>,
}

/// One ranked product in JSON format
#[derive(Serialize)]
pub struct JsonResult {
    /// 1-based position in the result list
    pub rank: usize,
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub available_stock: u32,
    pub image_url: String,
    /// Fused relevance score
    pub score: f64,
}

impl JsonResult {
    fn new(rank: usize, candidate: &Candidate) -> Self {
        Self {
            rank,
            id: candidate.id.as_u64(),
            name: candidate.name.clone(),
            price: candidate.price,
            available_stock: candidate.available_stock,
            image_url: candidate.image_url.clone(),
            score: candidate.relevance_score,
        }
    }
}

/// Formats search results as JSON.
pub fn format_json(query: &str, results: &RankedList) -> String {
    let output = JsonOutput {
        query: query.to_string(),
        results: results
            .iter()
            .enumerate()
            .map(|(i, candidate)| JsonResult::new(i + 1, candidate))
            .collect(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats search results for human-readable terminal output.
pub fn format_human(query: &str, results: &RankedList) -> String {
    if results.is_empty() {
        return format!("No products found for \"{}\"", query);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} product{} for \"{}\":\n\n",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        query
    ));

    for (i, candidate) in results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} (score: {:.2})\n",
            i + 1,
            truncate_text(&candidate.name, NAME_MAX_LEN),
            candidate.relevance_score
        ));
        let stock = if candidate.available_stock == 0 {
            "out of stock".to_string()
        } else {
            format!("{} in stock", candidate.available_stock)
        };
        output.push_str(&format!(
            "   #{} | ${:.2} | {}\n",
            candidate.id, candidate.price, stock
        ));
        if !candidate.image_url.is_empty() {
            output.push_str(&format!("   Image: {}\n", candidate.image_url));
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Truncates text to at most `max_len` characters, adding ellipsis if needed.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_len).collect();
    // Prefer a word boundary near max_len
    match truncated.rfind(' ') {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}
