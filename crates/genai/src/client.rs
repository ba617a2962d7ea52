//! REST client for a Gemini-style `generateContent` endpoint.
//!
//! Structured calls request `application/json` output and parse the
//! concatenated text parts. Image calls request both text and image
//! modalities and return the first media part as a URI.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::backend::{GenerationBackend, ImagePrompt};
use crate::error::GenerationError;
use crate::prompts;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";

/// Connection settings for the generation service.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl GeminiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Required | Default                                            |
    /// |----------------------|----------|----------------------------------------------------|
    /// | `GEMINI_API_KEY`     | **yes**  | --                                                 |
    /// | `GEMINI_BASE_URL`    | no       | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GEMINI_TEXT_MODEL`  | no       | `gemini-2.0-flash`                                 |
    /// | `GEMINI_IMAGE_MODEL` | no       | `gemini-2.0-flash-exp`                             |
    ///
    /// # Panics
    ///
    /// Panics if `GEMINI_API_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "GEMINI_API_KEY must not be empty");

        let var_or = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        Self {
            api_key,
            base_url: var_or("GEMINI_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            text_model: var_or("GEMINI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
            image_model: var_or("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
        }
    }
}

/// HTTP client for the generation service.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
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
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
    file_data: Option<FileData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<GenerateContentResponse, GenerationError> {
        tracing::debug!(model, "Sending generateContent request");
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url, model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or return a
    /// [`GenerationError::Api`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GenerationError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate_structured(
        &self,
        prompt: &str,
    ) -> Result<Option<serde_json::Value>, GenerationError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });
        let response = self.generate_content(&self.config.text_model, &body).await?;
        structured_output(&response)
    }

    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<Option<String>, GenerationError> {
        let [subject, style] = prompts::image_parts(&prompt.subject, &prompt.style);
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": subject }, { "text": style }] }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
        });
        let response = self.generate_content(&self.config.image_model, &body).await?;
        Ok(media_url(&response))
    }
}

fn first_parts(response: &GenerateContentResponse) -> &[Part] {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or_default()
}

/// Parse the text parts of the first candidate as JSON.
pub(crate) fn structured_output(
    response: &GenerateContentResponse,
) -> Result<Option<serde_json::Value>, GenerationError> {
    let text: String = first_parts(response)
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    let text = strip_code_fence(&text);
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| GenerationError::MalformedOutput(format!("response is not JSON: {e}")))
}

/// First media part of the first candidate, as a URI.
pub(crate) fn media_url(response: &GenerateContentResponse) -> Option<String> {
    first_parts(response).iter().find_map(|part| {
        if let Some(inline) = &part.inline_data {
            Some(format!("data:{};base64,{}", inline.mime_type, inline.data))
        } else {
            part.file_data.as_ref().map(|f| f.file_uri.clone())
        }
    })
}

/// Models occasionally wrap JSON in a Markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn structured_output_joins_text_parts() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "[\"a\", " }, { "text": "\"b\"]" }] } }]
        }));
        assert_eq!(structured_output(&resp).unwrap(), Some(json!(["a", "b"])));
    }

    #[test]
    fn structured_output_strips_markdown_fence() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "```json\n{\"summary\": \"x\"}\n```" }] } }]
        }));
        assert_eq!(structured_output(&resp).unwrap(), Some(json!({ "summary": "x" })));
    }

    #[test]
    fn structured_output_without_candidates_is_none() {
        let resp = response(json!({}));
        assert_eq!(structured_output(&resp).unwrap(), None);
    }

    #[test]
    fn structured_output_rejects_prose() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Sure! Here are some scenes." }] } }]
        }));
        assert_matches!(
            structured_output(&resp),
            Err(GenerationError::MalformedOutput(_))
        );
    }

    #[test]
    fn media_url_builds_data_uri_from_inline_data() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here is your image" },
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
            ] } }]
        }));
        assert_eq!(
            media_url(&resp).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn media_url_uses_file_uri() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [
                { "fileData": { "mimeType": "image/jpeg", "fileUri": "https://cdn.example/img.jpg" } }
            ] } }]
        }));
        assert_eq!(media_url(&resp).as_deref(), Some("https://cdn.example/img.jpg"));
    }

    #[test]
    fn media_url_is_none_for_text_only() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot draw that." }] } }]
        }));
        assert_eq!(media_url(&resp), None);
    }
}
