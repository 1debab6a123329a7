// Core pipeline exports
pub mod accent;
pub mod filters;
pub mod matcher;
pub mod pipeline;
pub mod prompt;
pub mod resolver;
pub mod response;
pub mod vocabulary;

pub use accent::{accent_for, select_thumbnail, DEFAULT_ACCENT};
pub use filters::matches_query;
pub use matcher::{CatalogMatcher, Tier};
pub use pipeline::{MatchingPipeline, PipelineError, PipelineOutcome};
pub use prompt::{build_instruction_prompt, FILTER_COUNT};
pub use resolver::{ResolutionFailure, VisionResolver};
pub use response::{
    extract_json_object, parse_analysis, strip_code_fences, strip_reasoning, ResponseError,
};
pub use vocabulary::{Field, Vocabulary};
