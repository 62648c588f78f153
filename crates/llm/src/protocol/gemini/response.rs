use serde::Deserialize;

use super::Content;
use crate::protocol::lenient;

/// Response body of the `generateContent` API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate responses from the model. Only the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Returns the prompt's feedback related to the content filters.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,

    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,

    #[serde(default)]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, crate::TranslationError> {
        sonic_rs::from_slice(body).map_err(crate::TranslationError::InvalidResponse)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content. Missing when the candidate was filtered.
    #[serde(default)]
    pub content: Option<Content>,

    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked and no candidates were returned.
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token accounting. Counters that are missing or not numbers read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default, deserialize_with = "lenient::count")]
    pub prompt_token_count: u32,

    #[serde(default, deserialize_with = "lenient::count")]
    pub candidates_token_count: u32,

    /// Tokens spent on reasoning by thinking models.
    #[serde(default, deserialize_with = "lenient::count")]
    pub thoughts_token_count: u32,

    #[serde(default, deserialize_with = "lenient::count")]
    pub total_token_count: u32,
}

/// Reason the model stopped generating tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Language,
    Other,
    Blocklist,
    ProhibitedContent,
    Spii,
    MalformedFunctionCall,
    ImageSafety,
    #[serde(untagged)]
    Unknown(String),
}

impl FinishReason {
    /// Whether generation was cut off by a content filter.
    pub fn is_content_filter(&self) -> bool {
        matches!(
            self,
            Self::Safety | Self::Recitation | Self::Blocklist | Self::ProhibitedContent | Self::Spii | Self::ImageSafety
        )
    }
}
