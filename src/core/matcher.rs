use crate::core::accent::{accent_for, select_thumbnail};
use crate::models::{CatalogProduct, CatalogQuery, Gender, MatchFilter, Suggestion};
use crate::services::{CatalogError, CatalogStore};
use std::sync::Arc;

/// Relaxation tiers, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Piece type, stock, styles, colors, season, gender tags
    Exact,
    /// Color and season dropped
    Relaxed,
    /// Piece type and stock only
    PieceTypeOnly,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Exact, Tier::Relaxed, Tier::PieceTypeOnly];

    /// Build the lookup this tier issues for a filter
    pub fn query(&self, filter: &MatchFilter, gender: Gender) -> CatalogQuery {
        let mut query = CatalogQuery::in_stock(&filter.piece_type);
        if *self == Tier::PieceTypeOnly {
            return query;
        }

        query.styles = filter.active_styles().map(<[String]>::to_vec);
        query.tags = gender.catalog_tags();

        if *self == Tier::Exact {
            query.colors = filter.active_colors().map(<[String]>::to_vec);
            query.season = filter.active_season().map(str::to_string);
        }

        query
    }
}

/// Tiered relaxation search for a single filter
///
/// # Tiers
/// 1. Exact: every constraint the filter carries
/// 2. Relaxed: color and season dropped
/// 3. Piece type only
///
/// Each tier is one lookup capped at a single row. The first non-empty tier
/// wins; nothing is merged or scored across tiers.
#[derive(Clone)]
pub struct CatalogMatcher {
    store: Arc<dyn CatalogStore>,
}

impl CatalogMatcher {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Find the product for a filter along with the tier that produced it
    pub async fn find_product(
        &self,
        filter: &MatchFilter,
        gender: Gender,
    ) -> Result<Option<(Tier, CatalogProduct)>, CatalogError> {
        for tier in Tier::ALL {
            let query = tier.query(filter, gender);
            if let Some(product) = self.store.find_one(&query).await? {
                tracing::debug!(
                    "{} matched {} at tier {:?}",
                    filter.piece_type,
                    product.slug,
                    tier
                );
                return Ok(Some((tier, product)));
            }
        }

        tracing::debug!("No catalog match for {} after all tiers", filter.piece_type);
        Ok(None)
    }

    /// Resolve a filter to a client-facing suggestion, `None` when nothing fits
    pub async fn find_match(
        &self,
        filter: &MatchFilter,
        gender: Gender,
    ) -> Result<Option<Suggestion>, CatalogError> {
        Ok(self
            .find_product(filter, gender)
            .await?
            .map(|(_, product)| to_suggestion(product, filter)))
    }
}

/// Project a matched product into a suggestion for its originating filter
pub fn to_suggestion(product: CatalogProduct, filter: &MatchFilter) -> Suggestion {
    let image = select_thumbnail(&product.images);
    let accent = accent_for(&product.colors).to_string();

    Suggestion {
        id: product.id,
        name: product.name,
        slug: product.slug,
        price: product.price,
        discount_price: product.discount_price,
        colors: product.colors,
        image,
        accent,
        affiliate_link: product.affiliate_link,
        match_reason: filter.match_reason.clone(),
        category: filter.piece_type.clone(),
    }
}
