//! Outfit Match - AI-assisted outfit matching service
//!
//! Given a photo of a clothing item, a vision model describes the item and
//! proposes four complementary pieces; each proposal is then resolved
//! against the product catalog with a tiered relaxation search.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{CatalogMatcher, MatchingPipeline, PipelineError, PipelineOutcome, VisionResolver};
pub use models::{
    CatalogProduct, IdentifiedItem, ImageInput, MatchFilter, Suggestion, VisionAnalysis,
};
