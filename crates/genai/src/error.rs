use storyreel_core::error::CoreError;

/// Errors from a single call to the generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The model answered, but not with what was asked for.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

impl From<GenerationError> for CoreError {
    fn from(err: GenerationError) -> Self {
        CoreError::GenerationFailed(err.to_string())
    }
}
