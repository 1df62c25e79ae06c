use crate::utils::error::DocTrackError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// 錯誤種類對應的 HTTP 狀態碼
pub fn status_for(err: &DocTrackError) -> StatusCode {
    match err {
        DocTrackError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
        DocTrackError::UnauthorizedWorkflowAction { .. } => StatusCode::FORBIDDEN,
        DocTrackError::NotFound { .. } => StatusCode::NOT_FOUND,
        DocTrackError::ValidationError { .. }
        | DocTrackError::InvalidWorkflowTransition { .. }
        | DocTrackError::InvalidDocumentCustodyAction { .. }
        | DocTrackError::SplitCapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DocTrackError::Conflict { .. } | DocTrackError::SequenceExhausted { .. } => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind(err: &DocTrackError) -> &'static str {
    match err {
        DocTrackError::Unauthenticated { .. } => "unauthenticated",
        DocTrackError::UnauthorizedWorkflowAction { .. } => "unauthorized_workflow_action",
        DocTrackError::NotFound { .. } => "not_found",
        DocTrackError::ValidationError { .. } => "validation_error",
        DocTrackError::InvalidWorkflowTransition { .. } => "invalid_workflow_transition",
        DocTrackError::InvalidDocumentCustodyAction { .. } => "invalid_custody_action",
        DocTrackError::SplitCapacityExceeded { .. } => "split_capacity_exceeded",
        DocTrackError::SequenceExhausted { .. } => "sequence_exhausted",
        DocTrackError::Conflict { .. } => "conflict",
        _ => "internal_error",
    }
}

impl IntoResponse for DocTrackError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {} (category: {:?})", self, self.category());
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self);
        }

        let body = ErrorBody {
            error: kind(&self),
            message: self.user_friendly_message(),
        };
        (status, Json(body)).into_response()
    }
}
