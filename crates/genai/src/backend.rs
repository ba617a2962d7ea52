use async_trait::async_trait;

use crate::error::GenerationError;

/// Subject and style of one image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrompt {
    pub subject: String,
    pub style: String,
}

/// The model calls the flows are composed of.
///
/// Implementations perform exactly one external request per call: no
/// retries, no timeouts beyond the transport's own.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Ask for JSON output. `Ok(None)` means the model returned nothing.
    async fn generate_structured(
        &self,
        prompt: &str,
    ) -> Result<Option<serde_json::Value>, GenerationError>;

    /// Ask for an image. Returns a data URI or remote URL, or `Ok(None)`
    /// if the response carried no media.
    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<Option<String>, GenerationError>;
}
