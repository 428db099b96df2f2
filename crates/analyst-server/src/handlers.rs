//! HTTP Handlers

use std::any::Any;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use market_analyzer::{AnalysisError, AnalysisRequest};
use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub ai_reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Request-boundary wrapper that renders an [`AnalysisError`] as the JSON
/// error envelope. Only the categorized message reaches the client.
#[derive(Debug)]
pub struct ApiError(pub AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match &self.0 {
            AnalysisError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        let detail = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self(AnalysisError::PayloadTooLarge(detail))
        } else {
            Self(AnalysisError::InvalidRequest(detail))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Analysis failed");
        } else {
            tracing::warn!(code = self.0.code(), error = %self.0, "Rejected request");
        }

        let body = ErrorResponse {
            error: self.0.user_message(),
            code: self.0.code().into(),
        };
        (status, Json(body)).into_response()
    }
}

/// Panic hook for `CatchPanicLayer`: log the payload, answer with the
/// generic envelope.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "non-string panic payload".into());

    ApiError(AnalysisError::Unexpected(detail)).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.analyzer.provider();
    let info = provider.info();
    let ai_reachable = provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: info.name,
        model: state.analyzer.options().model.clone(),
        ai_reachable,
    })
}

/// `POST /analyze_market`
///
/// The body is read raw so that empty, `null` and `{}` bodies all get the
/// same "No input data provided" answer. Buffering failures, an over-limit
/// body included, are rendered as the JSON envelope too.
pub async fn analyze_market(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = AnalysisRequest::from_body(&body?)?;
    let document = state.analyzer.analyze(request).await?;
    Ok(Json(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_analyzer::NO_INPUT_MESSAGE;

    async fn envelope(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_error_envelope() {
        let response = ApiError(AnalysisError::InvalidRequest(NO_INPUT_MESSAGE.into())).into_response();
        let (status, body) = envelope(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No input data provided");
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let err = AnalysisError::UpstreamUnavailable("HTTP 502: upstream says key=abc".into());
        let (status, body) = envelope(ApiError(err).into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to connect to the AI service");
        assert!(!body.to_string().contains("key=abc"));
    }

    #[tokio::test]
    async fn test_payload_too_large_envelope() {
        let err = AnalysisError::PayloadTooLarge("length limit exceeded".into());
        let (status, body) = envelope(ApiError(err).into_response()).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Request body too large");
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_panic_response() {
        let (status, body) = envelope(panic_response(Box::new("index out of bounds"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected error occurred");
        assert_eq!(body["code"], "UNEXPECTED");
    }
}
