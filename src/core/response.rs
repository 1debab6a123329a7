use crate::core::prompt::FILTER_COUNT;
use crate::models::VisionAnalysis;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors produced while turning raw model text into an analysis
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("No JSON object found in model output")]
    NoJsonObject,

    #[error("Malformed JSON: {0}")]
    Malformed(String),

    #[error("Validation failed: {0}")]
    Invalid(String),
}

fn reasoning_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<(?:think|thinking|reasoning)>.*?</(?:think|thinking|reasoning)>")
            .expect("reasoning pattern is valid")
    })
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_-]*[ \t]*\r?$").expect("fence pattern is valid")
    })
}

const CLOSE_TAGS: [&str; 3] = ["</think>", "</thinking>", "</reasoning>"];

/// Byte ranges of string literals that sit inside `{...}`
fn json_string_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut open: Option<usize> = None;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if let Some(start) = open {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    spans.push(start..idx + 1);
                    open = None;
                }
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if depth > 0 => open = Some(idx),
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if let Some(start) = open {
        spans.push(start..text.len());
    }
    spans
}

/// Remove `<think>...</think>` style reasoning blocks.
/// A dangling close tag means everything before it was reasoning.
/// Close tags quoted inside JSON string values are left alone.
pub fn strip_reasoning(text: &str) -> String {
    let stripped = reasoning_pattern().replace_all(text, "");
    let lower = stripped.to_ascii_lowercase();
    let quoted = json_string_spans(&stripped);

    let cut = CLOSE_TAGS
        .iter()
        .flat_map(|tag| lower.match_indices(tag))
        .filter(|(idx, _)| !quoted.iter().any(|span| span.contains(idx)))
        .map(|(idx, tag)| idx + tag.len())
        .max();

    match cut {
        Some(end) => stripped[end..].to_string(),
        None => stripped.into_owned(),
    }
}

/// Remove markdown code-fence lines (with or without a language tag).
/// Backticks inside a line of content are kept.
pub fn strip_code_fences(text: &str) -> String {
    fence_pattern().replace_all(text, "").trim().to_string()
}

/// Return the first balanced `{...}` span, ignoring braces inside JSON strings
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Check the structural shape of a parsed analysis
pub fn validate_analysis(analysis: &VisionAnalysis) -> Result<(), ResponseError> {
    if analysis.filters.is_empty() {
        return Err(ResponseError::Invalid("filters is empty".into()));
    }
    if analysis.filters.len() > FILTER_COUNT {
        return Err(ResponseError::Invalid(format!(
            "expected at most {} filters, got {}",
            FILTER_COUNT,
            analysis.filters.len()
        )));
    }
    if let Some(pos) = analysis
        .filters
        .iter()
        .position(|f| f.piece_type.trim().is_empty())
    {
        return Err(ResponseError::Invalid(format!(
            "filter {} has no pieceType",
            pos
        )));
    }
    Ok(())
}

/// Full normalization: reasoning → fences → first object → parse → validate
pub fn parse_analysis(raw: &str) -> Result<VisionAnalysis, ResponseError> {
    let cleaned = strip_code_fences(&strip_reasoning(raw));
    let json = extract_json_object(&cleaned).ok_or(ResponseError::NoJsonObject)?;

    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    if value.get("identifiedItem").map_or(true, |v| v.is_null()) {
        return Err(ResponseError::Invalid("identifiedItem is missing".into()));
    }

    let analysis: VisionAnalysis =
        serde_json::from_value(value).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    validate_analysis(&analysis)?;
    Ok(analysis)
}
