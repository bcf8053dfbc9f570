//! Structured search filters.
//!
//! Filters narrow the set of products each stage searches over. They never
//! enter the fusion math: the keyword stage filters the catalog before
//! scoring, the semantic stage drops hits that fail the filter.

use crate::catalog::Product;
use serde::{Deserialize, Serialize};

/// Optional restrictions on the products a search may return.
///
/// Text constraints compare case-insensitively; blank strings are ignored.
/// Price bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Only products with stock left
    pub in_stock_only: bool,
    /// Product must carry at least one of these tags
    pub persona_tags: Vec<String>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            category: None,
            subcategory: None,
            brand: None,
            color: None,
            size: None,
            min_price: None,
            max_price: None,
            in_stock_only: true,
            persona_tags: Vec::new(),
        }
    }
}

impl SearchFilters {
    /// Filters that let every product through.
    pub fn none() -> Self {
        Self {
            in_stock_only: false,
            ..Self::default()
        }
    }

    /// True if some constraint needs catalog attributes (not just price/stock).
    pub fn has_attribute_constraints(&self) -> bool {
        [
            &self.category,
            &self.subcategory,
            &self.brand,
            &self.color,
            &self.size,
        ]
        .iter()
        .any(|value| non_blank(value).is_some())
            || self.persona_tags.iter().any(|t| !t.trim().is_empty())
    }

    /// True if no constraint is set at all.
    pub fn is_unrestricted(&self) -> bool {
        !self.in_stock_only
            && self.min_price.is_none()
            && self.max_price.is_none()
            && !self.has_attribute_constraints()
    }

    /// Checks the price and stock constraints.
    pub fn matches_price_and_stock(&self, price: f64, available_stock: u32) -> bool {
        if self.in_stock_only && available_stock == 0 {
            return false;
        }
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }
        true
    }

    /// Checks every constraint against a catalog record.
    pub fn matches_product(&self, product: &Product) -> bool {
        if !self.matches_price_and_stock(product.price, product.available_stock) {
            return false;
        }

        let text_checks = [
            (&self.category, Some(product.category.as_str())),
            (&self.subcategory, Some(product.subcategory.as_str())),
            (&self.brand, Some(product.brand.as_str())),
            (&self.color, product.attributes.color.as_deref()),
        ];
        for (wanted, actual) in text_checks {
            if let Some(wanted) = non_blank(wanted) {
                if !actual.is_some_and(|actual| eq_ignore_case(wanted, actual)) {
                    return false;
                }
            }
        }

        if let Some(size) = non_blank(&self.size) {
            if !product
                .attributes
                .sizes
                .iter()
                .any(|offered| eq_ignore_case(size, offered))
            {
                return false;
            }
        }

        let wanted_tags: Vec<&str> = self
            .persona_tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !wanted_tags.is_empty()
            && !product
                .tags
                .iter()
                .any(|tag| wanted_tags.iter().any(|w| eq_ignore_case(w, tag.trim())))
        {
            return false;
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
