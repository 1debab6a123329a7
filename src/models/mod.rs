// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CatalogProduct, CatalogQuery, Gender, IdentifiedItem, ImageError, ImageInput, MatchFilter,
    ProductImage, StockStatus, Suggestion, VisionAnalysis,
};
pub use requests::AnalyzeRequest;
pub use responses::{AnalyzeResponse, ErrorResponse, HealthResponse};
