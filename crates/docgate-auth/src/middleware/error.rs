//! Error response handling for access control failures.
//!
//! This module implements `IntoResponse` for `AccessError`. Bodies carry
//! only the generic public label; internal detail (which check failed,
//! whether the secret is configured) stays in the server log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AccessError;

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        if self.is_server_error() {
            tracing::warn!(category = %self.category(), error = %self, "Request failed");
        } else {
            tracing::debug!(category = %self.category(), error = %self, "Request rejected");
        }

        let body = json!({ "error": self.public_label() });
        (status, Json(body)).into_response()
    }
}

/// Maps an access error to its HTTP status.
fn status_code(error: &AccessError) -> StatusCode {
    match error {
        AccessError::MalformedRequest { .. } => StatusCode::BAD_REQUEST,
        AccessError::InvalidSignature
        | AccessError::InvalidToken { .. }
        | AccessError::Revoked
        | AccessError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
        AccessError::Expired => StatusCode::GONE,
        AccessError::Misconfigured { .. } | AccessError::Storage { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
