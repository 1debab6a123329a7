use crate::models::{CatalogProduct, CatalogQuery, ProductImage, StockStatus};
use crate::services::catalog::{CatalogError, CatalogStore};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, slug, price, discount_price, colors, styles, season, \
     tags, piece_type, stock_status, affiliate_link";

/// PostgreSQL-backed product catalog
///
/// Read-only from the matching pipeline's point of view. Every lookup is a
/// single `LIMIT 1` query ordered deterministically, so repeated lookups
/// against an unchanged catalog return the same product.
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a new catalog client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new catalog client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, CatalogError> {
        tracing::info!("Connecting to PostgreSQL catalog");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    async fn load_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>, CatalogError> {
        let rows = sqlx::query(
            r#"
            SELECT url, image_type
            FROM product_images
            WHERE product_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ProductImage {
                url: row.get("url"),
                image_type: row.get("image_type"),
            })
            .collect())
    }
}

/// Translate a catalog query into one bounded SELECT
pub fn build_lookup(query: &CatalogQuery) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM products WHERE piece_type = ",
        PRODUCT_COLUMNS
    ));
    builder.push_bind(&query.piece_type);

    builder.push(" AND stock_status = ");
    builder.push_bind(query.stock_status.as_str());

    if let Some(styles) = &query.styles {
        builder.push(" AND styles && ");
        builder.push_bind(styles);
    }

    if let Some(colors) = &query.colors {
        builder.push(" AND colors && ");
        builder.push_bind(colors);
    }

    if let Some(season) = &query.season {
        builder.push(" AND LOWER(season) = LOWER(");
        builder.push_bind(season);
        builder.push(")");
    }

    if let Some(tags) = &query.tags {
        builder.push(" AND tags && ");
        builder.push_bind(tags);
    }

    builder.push(" ORDER BY created_at DESC, id ASC LIMIT 1");
    builder
}

fn product_from_row(row: &PgRow) -> Result<CatalogProduct, sqlx::Error> {
    let stock_status: String = row.try_get("stock_status")?;

    Ok(CatalogProduct {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        price: row.try_get("price")?,
        discount_price: row.try_get("discount_price")?,
        colors: row.try_get("colors")?,
        styles: row.try_get("styles")?,
        season: row.try_get("season")?,
        tags: row.try_get("tags")?,
        piece_type: row.try_get("piece_type")?,
        stock_status: StockStatus::from_db(&stock_status),
        affiliate_link: row.try_get("affiliate_link")?,
        images: Vec::new(),
    })
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn find_one(&self, query: &CatalogQuery) -> Result<Option<CatalogProduct>, CatalogError> {
        let mut builder = build_lookup(query);
        let row = builder.build().fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut product = product_from_row(&row)?;
        product.images = self.load_images(product.id).await?;
        Ok(Some(product))
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, CatalogError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
