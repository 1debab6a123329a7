use crate::core::matcher::CatalogMatcher;
use crate::core::resolver::VisionResolver;
use crate::core::vocabulary::{Field, Vocabulary};
use crate::models::{Gender, IdentifiedItem, ImageInput, MatchFilter, Suggestion};
use crate::services::CatalogError;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Terminal failures of one pipeline run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Could not analyze the image")]
    AnalysisFailed,

    #[error("No matching products found")]
    NoMatches,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Successful run: the identified item plus 1..=4 suggestions in filter order
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub identified_item: IdentifiedItem,
    pub suggestions: Vec<Suggestion>,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Vision analysis (ordered provider fallback)
/// 2. Concurrent per-filter catalog matching
/// 3. Assembly of surviving suggestions in filter order
#[derive(Clone)]
pub struct MatchingPipeline {
    resolver: VisionResolver,
    matcher: CatalogMatcher,
    vocabulary: Arc<Vocabulary>,
    lookup_timeout: Duration,
}

impl MatchingPipeline {
    pub fn new(
        resolver: VisionResolver,
        matcher: CatalogMatcher,
        vocabulary: Arc<Vocabulary>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            matcher,
            vocabulary,
            lookup_timeout,
        }
    }

    pub fn matcher(&self) -> &CatalogMatcher {
        &self.matcher
    }

    /// Run the full pipeline for one uploaded image
    ///
    /// Panics anywhere in the run are caught here and reported as
    /// `PipelineError::Internal`.
    pub async fn run(&self, image: &ImageInput) -> Result<PipelineOutcome, PipelineError> {
        match AssertUnwindSafe(self.run_inner(image)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("Matching pipeline panicked: {}", message);
                Err(PipelineError::Internal(message))
            }
        }
    }

    async fn run_inner(&self, image: &ImageInput) -> Result<PipelineOutcome, PipelineError> {
        let analysis = self
            .resolver
            .resolve(image)
            .await
            .map_err(|_| PipelineError::AnalysisFailed)?;

        let identified_item = analysis.identified_item;
        let gender = identified_item.detected_gender();
        self.note_out_of_vocabulary(&analysis.filters);

        let suggestions = self.match_filters(analysis.filters, gender).await;

        if suggestions.is_empty() {
            tracing::info!("No catalog matches for \"{}\"", identified_item.name);
            return Err(PipelineError::NoMatches);
        }

        tracing::info!(
            "Returning {} suggestions for \"{}\" ({})",
            suggestions.len(),
            identified_item.name,
            gender.as_str()
        );

        Ok(PipelineOutcome {
            identified_item,
            suggestions,
        })
    }

    /// Match every filter concurrently; each filter yields at most one
    /// suggestion and failures never affect sibling filters.
    pub async fn match_filters(
        &self,
        filters: Vec<MatchFilter>,
        gender: Gender,
    ) -> Vec<Suggestion> {
        let handles = filters.into_iter().map(|filter| {
            let matcher = self.matcher.clone();
            let timeout = self.lookup_timeout;
            tokio::spawn(async move {
                let result = tokio::time::timeout(timeout, matcher.find_match(&filter, gender))
                    .await
                    .unwrap_or(Err(CatalogError::Timeout(timeout.as_secs())));

                match result {
                    Ok(found) => found,
                    Err(e) => {
                        tracing::warn!("Catalog lookup for {} failed: {}", filter.piece_type, e);
                        None
                    }
                }
            })
        });

        // join_all preserves input order, so survivors keep filter order
        join_all(handles)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Catalog match task aborted: {}", e);
                    None
                }
            })
            .collect()
    }

    fn note_out_of_vocabulary(&self, filters: &[MatchFilter]) {
        for filter in filters {
            if !self.vocabulary.contains(Field::PieceType, &filter.piece_type) {
                tracing::debug!(
                    "Filter piece type {:?} is outside the vocabulary",
                    filter.piece_type
                );
            }
            if let Some(season) = filter.active_season() {
                if !self.vocabulary.contains(Field::Season, season) {
                    tracing::debug!("Filter season {:?} is outside the vocabulary", season);
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(PipelineError::AnalysisFailed.to_string(), "Could not analyze the image");
        assert_eq!(PipelineError::NoMatches.to_string(), "No matching products found");
    }
}
