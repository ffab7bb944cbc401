//! Session issuance, magic-link login and logout handlers.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use docgate_auth::{
    AccessError, AdminAuth, SessionAuth, SessionClaims, middleware::session_cookie_value, rbac,
};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueSessionRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// `POST /api/auth/issue`
///
/// Administrative session minting for arbitrary subjects and roles.
pub async fn issue_session(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<IssueSessionRequest>,
) -> Result<Response, AccessError> {
    if request.email.is_empty() {
        return Err(AccessError::malformed("email is required"));
    }
    if request.roles.is_empty() {
        return Err(AccessError::malformed("roles must not be empty"));
    }
    for role in &request.roles {
        if !rbac::ROLES.contains(&role.as_str()) {
            return Err(AccessError::malformed(format!("unknown role: {role}")));
        }
    }

    let token = state.session_service.issue(&request.email, &request.roles)?;
    let cookie = state
        .cookie_config
        .build_cookie(&token, state.session_service.ttl_seconds());

    tracing::info!(
        email = %request.email,
        roles = ?request.roles,
        issued_by = %admin.sub,
        "Session issued"
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "email": request.email, "roles": request.roles })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct MagicLinkRequest {
    #[serde(default)]
    pub email: String,
}

/// `POST /api/auth/magic-link`
pub async fn magic_link(
    State(state): State<AppState>,
    Json(request): Json<MagicLinkRequest>,
) -> Result<Json<serde_json::Value>, AccessError> {
    let link = state.magic_service.issue(&request.email)?;
    tracing::info!(email = %link.email, "Magic link issued");
    Ok(Json(json!({ "url": link.url })))
}

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
}

/// `POST /api/auth/callback`
///
/// A verified magic token mints a session with the default portal role.
pub async fn callback(
    State(state): State<AppState>,
    Json(request): Json<CallbackRequest>,
) -> Result<Response, AccessError> {
    state.magic_service.verify(&request.email, &request.token)?;

    let roles = vec!["lender".to_string()];
    let token = state.session_service.issue(&request.email, &roles)?;
    let cookie = state
        .cookie_config
        .build_cookie(&token, state.session_service.ttl_seconds());

    tracing::info!(email = %request.email, "Magic link redeemed");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "email": request.email, "roles": roles })),
    )
        .into_response())
}

/// `POST /api/auth/logout`
///
/// The cookie is cleared unconditionally; a decodable token also gets its
/// `jti` revoked so other copies of it die too.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AccessError> {
    if let Some(token) = session_cookie_value(&headers, &state.cookie_config.name)
        && let Some(jti) = state.session_service.revoke_token(&token).await?
    {
        tracing::info!(jti = %jti, "Session revoked on logout");
    }

    let cookie = state.cookie_config.clear_cookie();
    Ok(([(header::SET_COOKIE, cookie)], Json(json!({ "ok": true }))).into_response())
}

/// `GET /api/session`
pub async fn session_info(SessionAuth(claims): SessionAuth) -> Json<SessionClaims> {
    Json(claims)
}
