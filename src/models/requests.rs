use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to analyze an uploaded clothing item
///
/// `image` is either a `data:image/...;base64,` URL or bare base64.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, message = "image must not be empty"))]
    #[serde(alias = "imageBase64", rename = "image")]
    pub image: String,
    #[validate(length(min = 1))]
    #[serde(default, alias = "mime_type", rename = "mimeType")]
    pub mime_type: Option<String>,
}
