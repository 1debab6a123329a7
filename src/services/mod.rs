// Service exports
pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod vision;

pub use catalog::{CatalogError, CatalogStore};
pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use vision::{ChatCompletionsConfig, ChatCompletionsProvider, VisionError, VisionProvider};
