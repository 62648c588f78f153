use thiserror::Error;

/// Failures while converting between the Messages protocol and Gemini.
///
/// None of these reach the caller: the interception layer logs them and sends
/// the original request through unchanged.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The outbound body is not a Messages request.
    #[error("Invalid Messages request: {0}")]
    InvalidRequest(sonic_rs::Error),

    /// The native reply is not a `generateContent` response.
    #[error("Invalid Gemini response: {0}")]
    InvalidResponse(sonic_rs::Error),

    #[error("Failed to serialize translated payload: {0}")]
    Serialization(sonic_rs::Error),
}
