use crate::core::response::parse_analysis;
use crate::models::{ImageInput, VisionAnalysis};
use crate::services::VisionProvider;
use std::sync::Arc;
use thiserror::Error;

/// Default number of providers attempted per request
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Every attempted provider failed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("All {attempted} vision providers failed")]
pub struct ResolutionFailure {
    pub attempted: usize,
}

/// Ordered-fallback resolver over a list of vision providers
///
/// Providers are tried strictly in order, at most `max_attempts` of them,
/// and the first structurally valid analysis wins. Individual provider
/// failures are logged and swallowed.
#[derive(Clone)]
pub struct VisionResolver {
    providers: Vec<Arc<dyn VisionProvider>>,
    max_attempts: usize,
    prompt: Arc<str>,
}

impl VisionResolver {
    pub fn new(
        providers: Vec<Arc<dyn VisionProvider>>,
        max_attempts: usize,
        prompt: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            providers,
            max_attempts,
            prompt: prompt.into(),
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self, image: &ImageInput) -> Result<VisionAnalysis, ResolutionFailure> {
        let budget = self.providers.iter().take(self.max_attempts);
        let mut attempted = 0;

        for provider in budget {
            attempted += 1;
            let name = provider.name();

            let raw = match provider.analyze(image, &self.prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(
                        provider = name,
                        attempt = attempted,
                        "Vision provider failed: {}",
                        e
                    );
                    continue;
                }
            };

            match parse_analysis(&raw) {
                Ok(analysis) => {
                    tracing::info!(
                        provider = name,
                        attempt = attempted,
                        "Resolved \"{}\" with {} filters",
                        analysis.identified_item.name,
                        analysis.filters.len()
                    );
                    return Ok(analysis);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = name,
                        attempt = attempted,
                        "Unusable vision response: {}",
                        e
                    );
                }
            }
        }

        tracing::error!("Vision analysis failed after {} attempts", attempted);
        Err(ResolutionFailure { attempted })
    }
}
