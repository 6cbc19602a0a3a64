//! The chat endpoint: one audio payload in, one audio payload out.
//!
//! No business logic lives here beyond deserialization, status mapping,
//! and serialization. Input errors are rejected before the pipeline is
//! ever invoked; pipeline failures come back tagged with their
//! originating stage and map to an upstream-dependency status.

use crate::AppState;
use axum::{
    extract::{Extension, Multipart},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use voxbridge_types::{AudioPayload, Stage};
use voxbridge_voice::{audio, PipelineError};

/// API error type mapping to HTTP status codes.
///
/// Client-input problems are 4xx; failures of the remote capabilities
/// the relay depends on are 502; anything unexpected inside the relay
/// itself is 500 and never silently swallowed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("upstream {stage} failure: {message}")]
    Upstream { stage: Stage, message: String },
    #[error("internal server error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::Upstream {
            stage: err.stage(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, stage, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Stage::Transport, msg),
            ApiError::Upstream { stage, message } => (StatusCode::BAD_GATEWAY, stage, message),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, Stage::Transport, msg),
        };

        tracing::warn!(stage = %stage, status = %status, "chat request failed: {message}");

        let body = Json(serde_json::json!({
            "stage": stage,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Handler for `POST /api/chat`.
///
/// Accepts a multipart upload with one `file` field holding WAV audio,
/// runs the pipeline, and returns the synthesized reply as binary audio.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {e}")))?
        .ok_or_else(|| ApiError::BadRequest("no audio file provided".to_string()))?;

    if field.name() != Some("file") {
        return Err(ApiError::BadRequest(
            "expected a multipart field named 'file'".to_string(),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

    if data.is_empty() {
        return Err(ApiError::BadRequest("empty audio upload".to_string()));
    }

    // Reject undecodable input here so the pipeline stages are never
    // invoked for it; the header also yields the true encoding tag.
    let encoding = audio::probe_wav(&data)
        .ok_or_else(|| ApiError::BadRequest("audio is not valid WAV".to_string()))?;

    let request_id = Uuid::new_v4();
    let inbound = AudioPayload::new(data.to_vec(), encoding);
    tracing::info!(
        %request_id,
        bytes = inbound.len(),
        sample_rate = encoding.sample_rate,
        "chat request accepted"
    );

    let outbound = state.pipeline.handle(inbound).await?;
    let media_type = outbound.media_type();
    tracing::info!(%request_id, bytes = outbound.len(), "chat request completed");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_type)
        .body(axum::body::Body::from(outbound.into_bytes()))
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_their_stage() {
        let err: ApiError = PipelineError::from(voxbridge_voice::AgentError::EmptyReply).into();
        match err {
            ApiError::Upstream { stage, .. } => assert_eq!(stage, Stage::Agent),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_request_body_carries_stage_tag() {
        let response = ApiError::BadRequest("empty audio upload".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["stage"], "transport");
        assert_eq!(json["error"], "empty audio upload");
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let response = ApiError::Upstream {
            stage: Stage::Synthesis,
            message: "no audio".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["stage"], "synthesis");
    }
}
