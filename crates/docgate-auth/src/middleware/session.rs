//! Session cookie authentication extractors.
//!
//! [`SessionAuth`] validates the session cookie and hands the verified
//! claims to the handler; [`AdminAuth`] additionally requires the admin
//! role. Both reject with [`AccessError`], which implements
//! `IntoResponse`.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use docgate_auth::middleware::SessionAuth;
//!
//! async fn sign_handler(SessionAuth(claims): SessionAuth) -> String {
//!     format!("hello {}", claims.sub)
//! }
//!
//! let app = Router::new()
//!     .route("/api/docs/sign", post(sign_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::COOKIE, request::Parts},
};

use crate::config::CookieConfig;
use crate::error::AccessError;
use crate::rbac::{self, ADMIN_ROLE};
use crate::session::{SessionClaims, SessionService};

// =============================================================================
// Auth State
// =============================================================================

/// State required for session cookie authentication.
///
/// Include this in your application state and expose it to the extractors
/// via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Session service for token verification.
    pub session_service: Arc<SessionService>,

    /// Cookie configuration, for the cookie name to read.
    pub cookie_config: CookieConfig,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(session_service: Arc<SessionService>, cookie_config: CookieConfig) -> Self {
        Self {
            session_service,
            cookie_config,
        }
    }
}

// =============================================================================
// Session Auth Extractor
// =============================================================================

/// Axum extractor that validates the session cookie.
///
/// 1. Reads the configured cookie from the `Cookie` header
/// 2. Verifies the token signature
/// 3. Checks expiry
/// 4. Checks `jti` revocation
///
/// Roles downstream come exclusively from the claims this yields.
pub struct SessionAuth(pub SessionClaims);

impl<S> FromRequestParts<S> for SessionAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = session_cookie_value(&parts.headers, &auth_state.cookie_config.name)
            .ok_or_else(|| AccessError::invalid_token("missing session cookie"))?;

        let claims = auth_state.session_service.verify(&token).await?;

        tracing::debug!(subject = %claims.sub, jti = %claims.jti, "Session validated");
        Ok(SessionAuth(claims))
    }
}

// =============================================================================
// Admin Auth Extractor
// =============================================================================

/// Session extractor that additionally requires the admin role.
pub struct AdminAuth(pub SessionClaims);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionAuth(claims) = SessionAuth::from_request_parts(parts, state).await?;

        if let Err(err) = rbac::require_role(&claims.roles, &[ADMIN_ROLE]) {
            tracing::debug!(subject = %claims.sub, roles = ?claims.roles, "Admin access denied");
            return Err(err);
        }

        Ok(AdminAuth(claims))
    }
}

// =============================================================================
// Cookie Helpers
// =============================================================================

/// Extracts the named cookie's value from the request's `Cookie` header.
#[must_use]
pub fn session_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
    for cookie in cookie_header.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name.trim() == cookie_name
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
