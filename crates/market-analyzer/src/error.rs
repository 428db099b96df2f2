//! Error Types for the Market Analyzer

use analyst_core::LlmError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures of a single analysis request.
///
/// `Display` carries upstream detail for server-side logs; clients only ever
/// see [`AnalysisError::user_message`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("AI service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("AI response empty or ill-structured: {0}")]
    UpstreamMalformed(String),

    #[error("No JSON object found in AI response")]
    NoJsonFound,

    #[error("Failed to parse AI response as JSON: {0}")]
    JsonParse(#[source] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub const NO_INPUT_MESSAGE: &str = "No input data provided";

impl AnalysisError {
    /// Categorized, client-safe message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest(reason) if reason == NO_INPUT_MESSAGE => NO_INPUT_MESSAGE.into(),
            Self::InvalidRequest(_) => "Invalid request body".into(),
            Self::PayloadTooLarge(_) => "Request body too large".into(),
            Self::UpstreamUnavailable(_) => "Failed to connect to the AI service".into(),
            Self::UpstreamMalformed(_) => "Failed to generate analysis: AI response empty or ill-structured".into(),
            Self::NoJsonFound => "No JSON object found in AI response".into(),
            Self::JsonParse(_) => "Failed to parse AI response as JSON".into(),
            Self::Unexpected(_) => "An unexpected error occurred".into(),
        }
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
            Self::NoJsonFound => "NO_JSON_FOUND",
            Self::JsonParse(_) => "JSON_PARSE_ERROR",
            Self::Unexpected(_) => "UNEXPECTED",
        }
    }

    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::PayloadTooLarge(_))
    }
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MalformedResponse(detail) => Self::UpstreamMalformed(detail),
            e if e.is_unavailable() => Self::UpstreamUnavailable(e.to_string()),
            e => Self::Unexpected(e.to_string()),
        }
    }
}

/// Price feed failures. Never surfaced to clients; quotes degrade instead.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Price feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Price feed returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Price feed unavailable: {0}")]
    Unavailable(String),
}
