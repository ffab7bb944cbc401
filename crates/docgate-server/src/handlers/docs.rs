//! Document signing and download handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use docgate_auth::{AccessError, SessionAuth, middleware::session_cookie_value, rbac};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;
use crate::watermark::provenance_marker;

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    #[serde(default)]
    pub resource_id: String,
}

/// `POST /api/docs/sign`
///
/// Any authenticated portal role may request a link.
pub async fn sign_doc(
    State(state): State<AppState>,
    SessionAuth(claims): SessionAuth,
    Json(request): Json<SignRequest>,
) -> Result<Json<Value>, AccessError> {
    rbac::require_role(&claims.roles, rbac::ROLES)?;

    if request.resource_id.is_empty() {
        return Err(AccessError::malformed("resource_id is required"));
    }

    let link = state
        .link_service
        .issue(&request.resource_id, state.link_ttl_seconds)?;

    tracing::info!(
        resource_id = %link.resource_id,
        subject = %claims.sub,
        expires_at_ms = link.expires_at_ms,
        "Signed link issued"
    );

    Ok(Json(json!({
        "url": link.url,
        "expires_at_ms": link.expires_at_ms,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub exp: Option<String>,
    pub sig: Option<String>,
}

/// `GET /resource/{resource_id}/download?exp=&sig=`
pub async fn download_doc(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    Query(params): Query<DownloadParams>,
    headers: HeaderMap,
) -> Result<Response, AccessError> {
    state
        .link_service
        .verify(&resource_id, params.exp.as_deref(), params.sig.as_deref())
        .await?;

    // The id becomes a file name; nothing that escapes docs_dir is served.
    if resource_id.contains('/') || resource_id.contains('\\') || resource_id.contains("..") {
        return Err(AccessError::malformed("resource_id must be a bare name"));
    }

    let path = state.docs_dir.join(format!("{resource_id}.pdf"));
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AccessError::not_found(format!(
                "document {resource_id} does not exist"
            )));
        }
        Err(e) => {
            return Err(AccessError::storage(format!(
                "failed to read document {resource_id}: {e}"
            )));
        }
    };

    let origin = request_origin(&headers);
    let session_token = session_cookie_value(&headers, &state.cookie_config.name);
    let marker = provenance_marker(state.clock.now_ms(), &origin, session_token.as_deref());
    let stamped = state.watermarker.stamp(&bytes, &marker)?;

    tracing::info!(
        event = "doc_download",
        resource_id = %resource_id,
        origin = %origin,
        size = stamped.len(),
        "Document served"
    );

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{resource_id}.pdf\""),
            ),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        stamped,
    );
    Ok(response.into_response())
}

fn request_origin(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
