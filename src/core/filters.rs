use crate::models::{CatalogProduct, CatalogQuery};

/// True when the two sets share at least one value (case-sensitive, like a
/// Postgres `&&` array overlap)
#[inline]
pub fn overlaps(product_values: &[String], wanted: &[String]) -> bool {
    product_values.iter().any(|v| wanted.contains(v))
}

/// Check a product against one catalog query
///
/// Mirrors the SQL issued by the Postgres store so that the in-memory
/// catalog and the database agree on which products a tier admits.
#[inline]
pub fn matches_query(product: &CatalogProduct, query: &CatalogQuery) -> bool {
    if product.piece_type != query.piece_type {
        return false;
    }

    if product.stock_status != query.stock_status {
        return false;
    }

    if let Some(styles) = &query.styles {
        if !overlaps(&product.styles, styles) {
            return false;
        }
    }

    if let Some(colors) = &query.colors {
        if !overlaps(&product.colors, colors) {
            return false;
        }
    }

    if let Some(season) = &query.season {
        match &product.season {
            Some(s) if s.to_lowercase() == season.to_lowercase() => {}
            _ => return false,
        }
    }

    if let Some(tags) = &query.tags {
        if !overlaps(&product.tags, tags) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockStatus;
    use uuid::Uuid;

    fn create_test_product() -> CatalogProduct {
        CatalogProduct {
            id: Uuid::new_v4(),
            name: "Slim Chinos".to_string(),
            slug: "slim-chinos".to_string(),
            price: 59.0,
            discount_price: None,
            colors: vec!["Beige".to_string(), "Brown".to_string()],
            styles: vec!["Casual".to_string()],
            season: Some("Autumn".to_string()),
            tags: vec!["men".to_string()],
            piece_type: "Pants".to_string(),
            stock_status: StockStatus::InStock,
            affiliate_link: None,
            images: vec![],
        }
    }

    #[test]
    fn test_piece_type_and_stock_only() {
        let product = create_test_product();
        assert!(matches_query(&product, &CatalogQuery::in_stock("Pants")));
        assert!(!matches_query(&product, &CatalogQuery::in_stock("Shoes")));

        let mut sold_out = product.clone();
        sold_out.stock_status = StockStatus::OutOfStock;
        assert!(!matches_query(&sold_out, &CatalogQuery::in_stock("Pants")));
    }

    #[test]
    fn test_set_constraints_need_overlap() {
        let product = create_test_product();

        let mut query = CatalogQuery::in_stock("Pants");
        query.colors = Some(vec!["Black".to_string(), "Brown".to_string()]);
        query.styles = Some(vec!["Casual".to_string()]);
        query.tags = Some(vec!["men".to_string(), "unisex".to_string()]);
        assert!(matches_query(&product, &query));

        query.colors = Some(vec!["Black".to_string()]);
        assert!(!matches_query(&product, &query));
    }

    #[test]
    fn test_season_is_case_insensitive() {
        let product = create_test_product();

        let mut query = CatalogQuery::in_stock("Pants");
        query.season = Some("autumn".to_string());
        assert!(matches_query(&product, &query));

        query.season = Some("Summer".to_string());
        assert!(!matches_query(&product, &query));

        let mut seasonless = product.clone();
        seasonless.season = None;
        query.season = Some("Autumn".to_string());
        assert!(!matches_query(&seasonless, &query));
    }

    #[test]
    fn test_gender_tags() {
        let product = create_test_product();

        let mut query = CatalogQuery::in_stock("Pants");
        query.tags = Some(vec!["women".to_string(), "unisex".to_string()]);
        assert!(!matches_query(&product, &query));
    }
}
