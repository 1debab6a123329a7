use crate::models::ImageInput;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling a vision provider
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Empty completion")]
    EmptyCompletion,
}

/// A vision-capable model that answers an instruction about an image
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider identifier used in logs (the model id for HTTP providers)
    fn name(&self) -> &str;

    /// Send the image and prompt, returning the raw completion text
    async fn analyze(&self, image: &ImageInput, prompt: &str) -> Result<String, VisionError>;
}

/// Connection details shared by every model on one chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// OpenAI-compatible chat-completions provider for a single model
///
/// Several providers share one `reqwest::Client`; each differs only in the
/// model id it requests.
pub struct ChatCompletionsProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionsProvider {
    pub fn new(client: Client, config: &ChatCompletionsConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: model.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build one provider per model, in the given order, sharing a client
    pub fn from_models(
        config: &ChatCompletionsConfig,
        models: &[String],
    ) -> Result<Vec<Self>, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(models
            .iter()
            .map(|model| Self::new(client.clone(), config, model.clone()))
            .collect())
    }

    fn payload(&self, image: &ImageInput, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image.to_data_url() } }
                ]
            }]
        })
    }
}

/// Pull `choices[0].message.content` out of a completion body.
/// Some providers return content as an array of text parts.
pub fn completion_text(body: &Value) -> Result<String, VisionError> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .ok_or_else(|| VisionError::InvalidResponse("Missing choices[0].message.content".into()))?;

    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        Value::Null => String::new(),
        other => {
            return Err(VisionError::InvalidResponse(format!(
                "Unexpected content type: {}",
                other
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(VisionError::EmptyCompletion);
    }
    Ok(text)
}

#[async_trait]
impl VisionProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, image: &ImageInput, prompt: &str) -> Result<String, VisionError> {
        let url = format!("{}/chat/completions", self.endpoint);

        tracing::debug!("Requesting analysis from {} ({} byte image)", self.model, image.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(image, prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(VisionError::ApiError {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let json: Value = response.json().await?;
        completion_text(&json)
    }
}
