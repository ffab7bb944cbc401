//! Magic-link login bootstrap.
//!
//! A passwordless entry point for the portal: the server issues a short-lived
//! callback URL carrying `token = "{issued_at_ms}.{mac(email + "." + issued_at_ms)}"`.
//! Presenting a valid, fresh token at the callback mints a session. Unlike
//! signed document links, magic tokens are not revocable individually; they
//! expire within minutes and only bootstrap a (revocable) session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::time::Clock;
use crate::{AccessResult, mac};

/// Default magic-link lifetime in seconds (ten minutes).
pub const DEFAULT_MAGIC_LINK_TTL_SECONDS: u64 = 600;

/// An issued magic link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicLink {
    /// Email the link authenticates.
    pub email: String,
    /// When the link was minted, Unix milliseconds.
    pub issued_at_ms: i64,
    /// `"{issued_at_ms}.{signature}"`, the callback token.
    pub token: String,
    /// Relative callback URL carrying email and token.
    pub url: String,
}

/// Issues and verifies magic-link tokens.
pub struct MagicLinkService {
    secret: String,
    ttl_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl MagicLinkService {
    /// Creates a magic-link service.
    pub fn new(secret: impl Into<String>, ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
            clock,
        }
    }

    /// Mints a login link for `email`.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` if `email` is empty.
    /// - `Misconfigured` if the secret is not set.
    pub fn issue(&self, email: &str) -> AccessResult<MagicLink> {
        if email.is_empty() {
            return Err(AccessError::malformed("email must not be empty"));
        }

        let issued_at_ms = self.clock.now_ms();
        let signature = mac::compute(&format!("{email}.{issued_at_ms}"), &self.secret)?;
        let token = format!("{issued_at_ms}.{signature}");
        let url = format!(
            "/portal/callback?email={}&token={}",
            urlencoding::encode(email),
            urlencoding::encode(&token),
        );

        Ok(MagicLink {
            email: email.to_string(),
            issued_at_ms,
            token,
            url,
        })
    }

    /// Verifies a callback token for `email`.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` if the token does not split into
    ///   timestamp and signature, or the timestamp is not an integer.
    /// - `Misconfigured` if the secret is not set.
    /// - `InvalidSignature` if the MAC does not authenticate.
    /// - `Expired` if the token is older than the configured window.
    pub fn verify(&self, email: &str, token: &str) -> AccessResult<()> {
        if email.is_empty() {
            return Err(AccessError::malformed("email must not be empty"));
        }
        let (issued_raw, signature) = token
            .split_once('.')
            .ok_or_else(|| AccessError::malformed("token must be {timestamp}.{signature}"))?;
        let issued_at_ms: i64 = issued_raw
            .parse()
            .map_err(|_| AccessError::malformed("token timestamp is not an integer"))?;

        // Authenticity before age.
        if !mac::verify(signature, &format!("{email}.{issued_raw}"), &self.secret)? {
            return Err(AccessError::InvalidSignature);
        }

        let window_ms = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| ttl.checked_mul(1000))
            .ok_or_else(|| {
                AccessError::misconfigured("magic_link_ttl_seconds is too large")
            })?;
        let age_ms = self.clock.now_ms() - issued_at_ms;
        if age_ms > window_ms {
            return Err(AccessError::Expired);
        }

        Ok(())
    }
}
