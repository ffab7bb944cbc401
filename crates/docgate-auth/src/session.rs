//! Session credential issuance and verification.
//!
//! Sessions are signed HS256 tokens carrying the caller's identity and role
//! claims plus a `jti` minted fresh at every issuance. The fresh `jti` is
//! what makes single-credential revocation possible: one compromised token
//! can be invalidated without rotating the signing secret or touching the
//! subject's other credentials.
//!
//! Verification order mirrors link verification: signature, then expiry,
//! then revocation. Roles are read only from the verified claims; downstream
//! authorization treats `claims.roles` as the sole source of truth.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AccessResult;
use crate::error::AccessError;
use crate::storage::RevocationStorage;
use crate::time::Clock;

/// Default session lifetime in seconds (one day).
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;

/// Verified claims of a session credential.
///
/// `iat`/`exp` are Unix seconds, the JWT convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject identity (an email address).
    pub sub: String,
    /// Same as `sub`, kept as an explicit claim for display purposes.
    pub email: String,
    /// Role claims; the sole authorization input downstream.
    pub roles: Vec<String>,
    /// Unique per issuance, the revocation lookup key.
    pub jti: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Issues and verifies session credentials.
pub struct SessionService {
    secret: String,
    ttl_seconds: u64,
    clock: Arc<dyn Clock>,
    store: Arc<dyn RevocationStorage>,
}

impl SessionService {
    /// Creates a session service.
    pub fn new(
        secret: impl Into<String>,
        ttl_seconds: u64,
        clock: Arc<dyn Clock>,
        store: Arc<dyn RevocationStorage>,
    ) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
            clock,
            store,
        }
    }

    /// Session lifetime in seconds.
    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Mints a signed session token for `subject` with the given roles.
    ///
    /// Every call generates a fresh `jti`; tokens are never reissued with a
    /// previously used one.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` if `subject` is empty.
    /// - `Misconfigured` if the secret is not set.
    pub fn issue(&self, subject: &str, roles: &[String]) -> AccessResult<String> {
        if subject.is_empty() {
            return Err(AccessError::malformed("subject must not be empty"));
        }
        if self.secret.is_empty() {
            return Err(AccessError::misconfigured("signing secret is not set"));
        }

        let now_s = self.clock.now_ms() / 1000;
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now_s.checked_add(ttl))
            .ok_or_else(|| AccessError::misconfigured("session_ttl_seconds is too large"))?;
        let claims = SessionClaims {
            sub: subject.to_string(),
            email: subject.to_string(),
            roles: roles.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iat: now_s,
            exp,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AccessError::invalid_token(format!("failed to encode token: {e}")))?;

        tracing::debug!(subject, jti = %claims.jti, "Session issued");
        Ok(token)
    }

    /// Verifies a session token: signature, then expiry, then revocation.
    ///
    /// # Errors
    ///
    /// - `Misconfigured` if the secret is not set.
    /// - `InvalidToken` if the token is malformed or its signature fails.
    /// - `Expired` if `exp` is in the past.
    /// - `Revoked` if the token's `jti` has been revoked.
    /// - `Storage` if the revocation lookup fails.
    pub async fn verify(&self, token: &str) -> AccessResult<SessionClaims> {
        if self.secret.is_empty() {
            return Err(AccessError::misconfigured("signing secret is not set"));
        }

        // Expiry is checked below against the injected clock, not the
        // library's view of system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AccessError::invalid_token(e.to_string())
        })?
        .claims;

        // Same inclusive boundary as links: exp == now is still valid.
        let now_s = self.clock.now_ms() / 1000;
        if claims.exp < now_s {
            tracing::debug!(jti = %claims.jti, "Session expired");
            return Err(AccessError::Expired);
        }

        if self.store.is_session_revoked(&claims.jti).await? {
            tracing::debug!(jti = %claims.jti, "Session revoked");
            return Err(AccessError::Revoked);
        }

        Ok(claims)
    }

    /// Revokes the session carried by `token`, if it authenticates.
    ///
    /// Used by logout: the cookie is cleared regardless, but a validly
    /// signed token also gets its `jti` recorded so copies of it die too.
    /// Expiry is deliberately not required; revoking an already-expired
    /// token is harmless and idempotent. Forged or unsigned tokens record
    /// nothing: only the holder of a genuine token can grow the store.
    ///
    /// # Errors
    ///
    /// - `Misconfigured` if the secret is not set.
    /// - `Storage` if recording the revocation fails.
    pub async fn revoke_token(&self, token: &str) -> AccessResult<Option<String>> {
        if self.secret.is_empty() {
            return Err(AccessError::misconfigured("signing secret is not set"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let Ok(data) = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) else {
            return Ok(None);
        };

        let jti = data.claims.jti;
        self.store.revoke_session(&jti, self.clock.now_ms()).await?;
        Ok(Some(jti))
    }
}
