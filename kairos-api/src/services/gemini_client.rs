//! Gemini multimodal model client
//!
//! Sends the room photo plus a vibe prompt to `generateContent` and returns
//! the model's free-text reply. Single attempt, no retries.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::GeminiConfig;

const USER_AGENT: &str = concat!("kairos-api/", env!("CARGO_PKG_VERSION"));

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API key not configured. Set KAIROS_GEMINI_API_KEY or [gemini] api_key")]
    MissingApiKey,

    #[error("Failed to read image: {0}")]
    ImageRead(#[from] std::io::Error),

    #[error("Gemini network error: {0}")]
    NetworkError(String),

    #[error("Gemini API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Gemini parse error: {0}")]
    ParseError(String),

    #[error("Gemini returned no text")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Interior design prompt sent alongside the photo
pub fn design_prompt(vibe: &str) -> String {
    format!(
        "You are an interior designer. Suggest decorating ideas for this room that match a '{}' vibe.",
        vibe
    )
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self, GeminiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Ask the model for decorating ideas for the photo at `image_path`
    ///
    /// The vibe text is forwarded unchanged inside the prompt.
    pub async fn generate_design_ideas(
        &self,
        image_path: &Path,
        mime_type: &str,
        vibe: &str,
    ) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;

        let bytes = tokio::fs::read(image_path).await?;
        let payload = json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": mime_type,
                            "data": BASE64.encode(&bytes),
                        }
                    },
                    { "text": design_prompt(vibe) },
                ]
            }]
        });

        let endpoint = self.endpoint();
        tracing::debug!(endpoint = %endpoint, image_bytes = bytes.len(), "Querying Gemini API");

        let response = self
            .http_client
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiError(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ParseError(e.to_string()))?;

        let text = extract_text(&body).ok_or(GeminiError::EmptyResponse)?;
        tracing::info!(model = %self.model, chars = text.len(), "Received Gemini design ideas");
        Ok(text)
    }
}

/// Concatenated text parts of the first candidate
fn extract_text(body: &GenerateContentResponse) -> Option<String> {
    let parts = &body.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
