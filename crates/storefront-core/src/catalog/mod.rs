//! Inventory catalog abstraction consumed by the keyword stage.
//!
//! The search engine never talks to a database. It reads product snapshots
//! through the [`CatalogProvider`] trait, which the hosting service
//! implements on top of its inventory store.
//!
//! # Implementations
//!
//! - [`InMemoryCatalog`] - Vec-backed catalog for tests, benchmarks and the CLI
//! - Inventory service adapters - live in the hosting application

mod images;
mod memory;

pub use images::resolve_image_url;
pub use memory::InMemoryCatalog;

use crate::error::CatalogError;
use crate::search::types::{Candidate, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Variant attributes of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    /// Colour name, e.g. "navy"
    #[serde(default)]
    pub color: Option<String>,
    /// Sizes offered, e.g. ["S", "M", "L"]
    #[serde(default, alias = "sizeOptions")]
    pub sizes: Vec<String>,
}

/// A catalog record as returned by the inventory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub brand: String,
    /// Free-form tags, also used as persona tags by filters
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: ProductAttributes,
    #[serde(default)]
    pub image_url: String,
    pub price: f64,
    #[serde(default)]
    pub available_stock: u32,
    /// Inactive products are hidden from listings
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Creates an active product with only the fields search results need.
    pub fn new(id: ProductId, name: impl Into<String>, price: f64, available_stock: u32) -> Self {
        Self {
            id,
            sku: String::new(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            subcategory: String::new(),
            brand: String::new(),
            tags: Vec::new(),
            attributes: ProductAttributes::default(),
            image_url: String::new(),
            price,
            available_stock,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.attributes.color = Some(color.into());
        self
    }

    pub fn with_sizes<I, T>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.attributes.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Marks the product as delisted.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Projects this product into a search candidate with the given score.
    pub fn to_candidate(&self, relevance_score: f64) -> Candidate {
        Candidate {
            id: self.id,
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            available_stock: self.available_stock,
            relevance_score,
        }
    }
}

/// Read-only access to the product catalog.
///
/// Implementations must be safe to share across tasks: the engine reads the
/// catalog from the keyword stage and, for attribute filters, from the
/// semantic stage at the same time.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Returns the full active catalog snapshot. No pagination.
    #[must_use = "Catalog read failures should be handled"]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Retrieves multiple products by ID in a single operation.
    ///
    /// Returns products in the same order as the input IDs. Missing or
    /// inactive products are skipped. The default implementation filters a
    /// full listing; stores with keyed access should override it.
    #[must_use = "Catalog read failures should be handled"]
    async fn get_products_batch(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let mut seen = HashSet::new();
        let wanted: HashSet<ProductId> = ids.iter().copied().collect();
        let mut by_id: HashMap<ProductId, Product> = self
            .list_products()
            .await?
            .into_iter()
            .filter(|p| wanted.contains(&p.id))
            .map(|p| (p.id, p))
            .collect();

        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| by_id.remove(id))
            .collect())
    }
}

#[async_trait::async_trait]
impl<T: CatalogProvider + ?Sized> CatalogProvider for Arc<T> {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).list_products().await
    }

    async fn get_products_batch(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        (**self).get_products_batch(ids).await
    }
}
