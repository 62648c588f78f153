use thiserror::Error;

/// Errors surfaced by [`crate::AdapterClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(reqwest::Error),

    #[error("Invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Reasons a translated call is abandoned in favor of a pass-through call.
#[derive(Debug, Error)]
pub(crate) enum TranslatedCallError {
    #[error(transparent)]
    Translation(#[from] llm::TranslationError),

    #[error("Invalid native request: {0}")]
    Request(#[from] http::Error),

    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] http::header::InvalidHeaderValue),

    #[error("Native call failed: {0}")]
    Transport(String),

    #[error("Failed to read native response: {0}")]
    Body(axum::Error),
}
