#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Failed to fetch: {0}")]
    RemoteReadFailed(String),

    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Input too large: {actual} characters exceeds the limit of {limit}")]
    InputTooLarge { limit: usize, actual: usize },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
