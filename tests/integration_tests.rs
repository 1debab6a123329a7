// Integration tests for Outfit Match

use async_trait::async_trait;
use outfit_match::core::{
    build_instruction_prompt, CatalogMatcher, MatchingPipeline, PipelineError, VisionResolver,
    Vocabulary,
};
use outfit_match::models::{CatalogProduct, CatalogQuery, ImageInput, StockStatus};
use outfit_match::services::{
    CatalogError, CatalogStore, InMemoryCatalog, VisionError, VisionProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const FOUR_FILTERS: &str = r#"```json
{
  "identifiedItem": {
    "name": "Cream Knit Sweater",
    "color": "Beige",
    "style": "Casual",
    "gender": "Men",
    "season": "Autumn",
    "mood": "Relaxed",
    "occasion": "Everyday",
    "description": "A chunky cream knit"
  },
  "filters": [
    {"pieceType": "Pants", "styles": ["Casual"], "colors": ["Brown"], "season": "Autumn", "matchReason": "Warm earth tones"},
    {"pieceType": "Shoes", "styles": ["Casual"], "colors": ["White"], "season": "Autumn", "matchReason": "Clean sneakers"},
    {"pieceType": "Jacket", "styles": ["Casual"], "colors": ["Navy"], "season": "Autumn", "matchReason": "Layer for cold days"},
    {"pieceType": "Accessories", "styles": ["Casual"], "colors": ["Brown"], "season": "Autumn", "matchReason": "Leather belt ties it together"}
  ]
}
```"#;

struct ScriptedProvider {
    name: String,
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn ok(name: &str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self { name: name.to_string(), reply: Some(reply), calls: AtomicUsize::new(0) })
    }

    fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self { name: name.to_string(), reply: None, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, _image: &ImageInput, _prompt: &str) -> Result<String, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(reply) => Ok(reply.to_string()),
            None => Err(VisionError::ApiError { status: 503, body: "overloaded".to_string() }),
        }
    }
}

/// Catalog wrapper that counts lookups and can sabotage one piece type
struct InstrumentedCatalog {
    inner: InMemoryCatalog,
    lookups: AtomicUsize,
    broken_piece: Option<&'static str>,
    panicking_piece: Option<&'static str>,
}

impl InstrumentedCatalog {
    fn new(products: Vec<CatalogProduct>) -> Self {
        Self {
            inner: InMemoryCatalog::new(products),
            lookups: AtomicUsize::new(0),
            broken_piece: None,
            panicking_piece: None,
        }
    }
}

#[async_trait]
impl CatalogStore for InstrumentedCatalog {
    async fn find_one(&self, query: &CatalogQuery) -> Result<Option<CatalogProduct>, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken_piece == Some(query.piece_type.as_str()) {
            return Err(CatalogError::Timeout(1));
        }
        if self.panicking_piece == Some(query.piece_type.as_str()) {
            panic!("corrupt row for {}", query.piece_type);
        }
        self.inner.find_one(query).await
    }

    async fn health_check(&self) -> Result<bool, CatalogError> {
        Ok(true)
    }
}

fn create_product(slug: &str, piece: &str, colors: &[&str], tags: &[&str]) -> CatalogProduct {
    CatalogProduct {
        id: Uuid::new_v4(),
        name: slug.replace('-', " "),
        slug: slug.to_string(),
        price: 60.0,
        discount_price: None,
        colors: colors.iter().map(|c| c.to_string()).collect(),
        styles: vec!["Casual".to_string()],
        season: Some("Autumn".to_string()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        piece_type: piece.to_string(),
        stock_status: StockStatus::InStock,
        affiliate_link: None,
        images: vec![],
    }
}

fn full_catalog() -> Vec<CatalogProduct> {
    vec![
        create_product("brown-cords", "Pants", &["Brown"], &["men"]),
        create_product("white-sneakers", "Shoes", &["White"], &["unisex"]),
        create_product("navy-bomber", "Jacket", &["Navy"], &["men"]),
        create_product("leather-belt", "Accessories", &["Brown"], &["men"]),
    ]
}

fn pipeline(
    providers: Vec<Arc<ScriptedProvider>>,
    catalog: Arc<InstrumentedCatalog>,
) -> MatchingPipeline {
    let vocabulary = Arc::new(Vocabulary::default());
    let providers = providers
        .into_iter()
        .map(|p| p as Arc<dyn VisionProvider>)
        .collect();
    let resolver = VisionResolver::new(providers, 3, build_instruction_prompt(&vocabulary));

    MatchingPipeline::new(
        resolver,
        CatalogMatcher::new(catalog),
        vocabulary,
        Duration::from_secs(5),
    )
}

fn image() -> ImageInput {
    ImageInput::new(vec![0xff, 0xd8, 0xff], "image/jpeg").unwrap()
}

#[tokio::test]
async fn test_scenario_all_four_filters_match() {
    let catalog = Arc::new(InstrumentedCatalog::new(full_catalog()));
    let outcome = pipeline(vec![ScriptedProvider::ok("p1", FOUR_FILTERS)], catalog.clone())
        .run(&image())
        .await
        .unwrap();

    assert_eq!(outcome.identified_item.name, "Cream Knit Sweater");
    let categories: Vec<_> = outcome.suggestions.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(categories, vec!["Pants", "Shoes", "Jacket", "Accessories"]);

    // Every filter hit at tier 1: exactly one lookup each
    assert_eq!(catalog.lookups.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_scenario_all_providers_fail_skips_catalog() {
    let catalog = Arc::new(InstrumentedCatalog::new(full_catalog()));
    let providers: Vec<_> = (0..5).map(|i| ScriptedProvider::failing(&format!("p{}", i))).collect();

    let err = pipeline(providers.clone(), catalog.clone())
        .run(&image())
        .await
        .unwrap_err();

    assert_eq!(err, PipelineError::AnalysisFailed);
    assert_eq!(catalog.lookups.load(Ordering::SeqCst), 0);
    let calls: Vec<_> = providers.iter().map(|p| p.calls()).collect();
    assert_eq!(calls, vec![1, 1, 1, 0, 0]);
}

#[tokio::test]
async fn test_scenario_nothing_in_stock() {
    let mut products = full_catalog();
    for product in &mut products {
        product.stock_status = StockStatus::OutOfStock;
    }
    let catalog = Arc::new(InstrumentedCatalog::new(products));

    let err = pipeline(vec![ScriptedProvider::ok("p1", FOUR_FILTERS)], catalog.clone())
        .run(&image())
        .await
        .unwrap_err();

    assert_eq!(err, PipelineError::NoMatches);
    // Three tiers per filter
    assert_eq!(catalog.lookups.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn test_fallback_provider_result_is_used() {
    let catalog = Arc::new(InstrumentedCatalog::new(full_catalog()));
    let p1 = ScriptedProvider::ok("p1", "I'm not able to describe clothing.");
    let p2 = ScriptedProvider::ok("p2", FOUR_FILTERS);
    let p3 = ScriptedProvider::ok("p3", FOUR_FILTERS);

    let outcome = pipeline(vec![p1.clone(), p2.clone(), p3.clone()], catalog)
        .run(&image())
        .await
        .unwrap();

    assert_eq!(outcome.suggestions.len(), 4);
    assert_eq!((p1.calls(), p2.calls(), p3.calls()), (1, 1, 0));
}

#[tokio::test]
async fn test_failing_filter_does_not_block_siblings() {
    let mut catalog = InstrumentedCatalog::new(full_catalog());
    catalog.broken_piece = Some("Shoes");
    catalog.panicking_piece = Some("Jacket");

    let outcome = pipeline(vec![ScriptedProvider::ok("p1", FOUR_FILTERS)], Arc::new(catalog))
        .run(&image())
        .await
        .unwrap();

    let categories: Vec<_> = outcome.suggestions.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(categories, vec!["Pants", "Accessories"]);
}

#[tokio::test]
async fn test_missing_piece_types_keep_order_of_survivors() {
    let products = vec![
        create_product("leather-belt", "Accessories", &["Brown"], &["men"]),
        create_product("brown-cords", "Pants", &["Brown"], &["men"]),
    ];
    let catalog = Arc::new(InstrumentedCatalog::new(products));

    let outcome = pipeline(vec![ScriptedProvider::ok("p1", FOUR_FILTERS)], catalog)
        .run(&image())
        .await
        .unwrap();

    let slugs: Vec<_> = outcome.suggestions.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec!["brown-cords", "leather-belt"]);
    assert!(outcome.suggestions.len() <= 4);
}

#[tokio::test]
async fn test_gender_mismatch_relaxes_to_piece_type() {
    // Only a women's jacket exists; the item was detected as menswear
    let products = vec![create_product("cropped-jacket", "Jacket", &["Navy"], &["women"])];
    let catalog = Arc::new(InstrumentedCatalog::new(products));

    let outcome = pipeline(vec![ScriptedProvider::ok("p1", FOUR_FILTERS)], catalog)
        .run(&image())
        .await
        .unwrap();

    assert_eq!(outcome.suggestions.len(), 1);
    assert_eq!(outcome.suggestions[0].slug, "cropped-jacket");
    assert_eq!(outcome.suggestions[0].match_reason, "Layer for cold days");
}

#[tokio::test]
async fn test_repeated_runs_are_stable() {
    let catalog = Arc::new(InstrumentedCatalog::new(full_catalog()));
    let pipeline = pipeline(vec![ScriptedProvider::ok("p1", FOUR_FILTERS)], catalog);

    let first = pipeline.run(&image()).await.unwrap();
    let second = pipeline.run(&image()).await.unwrap();

    assert_eq!(first, second);
}
