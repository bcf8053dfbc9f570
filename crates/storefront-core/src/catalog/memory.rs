//! Vec-backed catalog for tests, benchmarks and file-based snapshots.

use super::{CatalogProvider, Product};
use crate::error::CatalogError;
use crate::search::types::ProductId;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

/// In-memory product catalog.
///
/// Keeps products in insertion order so listings, and therefore keyword
/// tie-breaks, are deterministic.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given products.
    ///
    /// A later product with an already-seen id replaces the earlier one.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut deduped: Vec<Product> = Vec::with_capacity(products.len());
        let mut slots: HashMap<ProductId, usize> = HashMap::with_capacity(products.len());
        for product in products {
            match slots.get(&product.id) {
                Some(&slot) => deduped[slot] = product,
                None => {
                    slots.insert(product.id, deduped.len());
                    deduped.push(product);
                }
            }
        }

        Self {
            products: RwLock::new(deduped),
        }
    }

    /// Parses a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        debug!("Parsed catalog snapshot with {} products", products.len());
        Ok(Self::from_products(products))
    }

    /// Reads a JSON array of products from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Inserts a product, replacing any existing product with the same id in place.
    pub fn upsert(&self, product: Product) -> Result<(), CatalogError> {
        let mut products = self
            .products
            .write()
            .map_err(|e| CatalogError::Lock(e.to_string()))?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    /// Removes a product. Returns `Ok(false)` if it wasn't present.
    pub fn remove(&self, id: ProductId) -> Result<bool, CatalogError> {
        let mut products = self
            .products
            .write()
            .map_err(|e| CatalogError::Lock(e.to_string()))?;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    /// Number of stored products, active or not.
    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self
            .products
            .read()
            .map_err(|e| CatalogError::Lock(e.to_string()))?;
        Ok(products.iter().filter(|p| p.is_active).cloned().collect())
    }

    async fn get_products_batch(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let products = self
            .products
            .read()
            .map_err(|e| CatalogError::Lock(e.to_string()))?;
        let by_id: HashMap<ProductId, &Product> = products
            .iter()
            .filter(|p| p.is_active)
            .map(|p| (p.id, p))
            .collect();

        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| by_id.get(id).map(|p| (*p).clone()))
            .collect())
    }
}
