use crate::core::filters::matches_query;
use crate::models::{CatalogProduct, CatalogQuery};
use crate::services::catalog::{CatalogError, CatalogStore};
use async_trait::async_trait;
use std::path::Path;

/// Catalog held in memory, evaluated in insertion order
///
/// Backs the `memory` catalog backend and the test suite.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<CatalogProduct>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    /// Load a JSON array of products
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<CatalogProduct> =
            serde_json::from_str(json).map_err(|e| CatalogError::InvalidSeed(e.to_string()))?;
        Ok(Self::new(products))
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::InvalidSeed(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;

        tracing::info!("Loaded {} products from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_one(&self, query: &CatalogQuery) -> Result<Option<CatalogProduct>, CatalogError> {
        Ok(self
            .products
            .iter()
            .find(|p| matches_query(p, query))
            .cloned())
    }

    async fn health_check(&self) -> Result<bool, CatalogError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"[
        {
            "id": "6f1f7a52-3c1e-4c59-9a8e-2f1d9c6b1a01",
            "name": "Leather Chelsea Boots",
            "slug": "leather-chelsea-boots",
            "price": 129.0,
            "discountPrice": 99.0,
            "colors": ["Brown"],
            "styles": ["Casual", "Elegant"],
            "season": "Autumn",
            "tags": ["men"],
            "pieceType": "Boots",
            "stockStatus": "in_stock",
            "images": [{"url": "https://cdn.test/boots.jpg", "type": "thumbnail"}]
        }
    ]"#;

    #[tokio::test]
    async fn test_seed_round_trip_through_store() {
        let catalog = InMemoryCatalog::from_json(SEED).unwrap();
        assert_eq!(catalog.len(), 1);

        let found = catalog.find_one(&CatalogQuery::in_stock("Boots")).await.unwrap();
        let product = found.unwrap();
        assert_eq!(product.slug, "leather-chelsea-boots");
        assert_eq!(product.discount_price, Some(99.0));
        assert_eq!(product.images[0].image_type, "thumbnail");

        assert!(catalog.find_one(&CatalogQuery::in_stock("Coat")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sample_catalog_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/catalog.sample.json");
        let catalog = InMemoryCatalog::from_file(path).await.unwrap();

        assert_eq!(catalog.len(), 4);
        assert!(catalog.find_one(&CatalogQuery::in_stock("Shoes")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_seed_file() {
        let result = InMemoryCatalog::from_file("/nonexistent/catalog.json").await;
        assert!(matches!(result, Err(CatalogError::InvalidSeed(_))));
    }

    #[test]
    fn test_invalid_seed() {
        assert!(matches!(
            InMemoryCatalog::from_json(r#"[{"name": "missing fields"}]"#),
            Err(CatalogError::InvalidSeed(_))
        ));
    }
}
