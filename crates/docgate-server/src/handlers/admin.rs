//! Administrative revocation handlers, all admin-gated.

use axum::{Json, extract::State};
use docgate_auth::{AccessError, AdminAuth, RevocationSnapshot, signature_key};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RevokeSignatureRequest {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub signature: String,
}

/// `POST /api/admin/revocations/signatures`
pub async fn revoke_signature(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<RevokeSignatureRequest>,
) -> Result<Json<Value>, AccessError> {
    if request.resource_id.is_empty() || request.signature.is_empty() {
        return Err(AccessError::malformed(
            "resource_id and signature are required",
        ));
    }

    state
        .store
        .revoke_signature(
            &request.resource_id,
            &request.signature,
            state.clock.now_ms(),
        )
        .await?;

    tracing::info!(
        resource_id = %request.resource_id,
        revoked_by = %admin.sub,
        "Link signature revoked"
    );

    Ok(Json(json!({
        "revoked": signature_key(&request.resource_id, &request.signature),
    })))
}

#[derive(Debug, Deserialize)]
pub struct RevokeSessionRequest {
    #[serde(default)]
    pub jti: String,
}

/// `POST /api/admin/revocations/sessions`
pub async fn revoke_session(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<RevokeSessionRequest>,
) -> Result<Json<Value>, AccessError> {
    if request.jti.is_empty() {
        return Err(AccessError::malformed("jti is required"));
    }

    state
        .store
        .revoke_session(&request.jti, state.clock.now_ms())
        .await?;

    tracing::info!(jti = %request.jti, revoked_by = %admin.sub, "Session revoked");

    Ok(Json(json!({ "revoked": request.jti })))
}

/// `GET /api/admin/revocations`
pub async fn list_revocations(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
) -> Result<Json<RevocationSnapshot>, AccessError> {
    Ok(Json(state.store.snapshot().await?))
}
