use crate::models::{CatalogProduct, CatalogQuery};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the product catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Lookup timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid seed data: {0}")]
    InvalidSeed(String),
}

/// Read-only access to the product catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Run one bounded lookup, returning at most one product
    async fn find_one(&self, query: &CatalogQuery) -> Result<Option<CatalogProduct>, CatalogError>;

    /// Backend liveness
    async fn health_check(&self) -> Result<bool, CatalogError>;
}
