//! Authentication configuration.
//!
//! One explicit configuration struct carries the shared secret and the
//! lifetimes for links, sessions and magic-link tokens. Components receive
//! it (or fields of it) by injection; nothing in this crate reads ambient
//! environment state, which keeps the MAC and session logic testable
//! without process-level mutation.
//!
//! The secret is read-only after startup, never logged and never returned
//! in any response.

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::link::DEFAULT_LINK_TTL_SECONDS;
use crate::magic::DEFAULT_MAGIC_LINK_TTL_SECONDS;
use crate::session::DEFAULT_SESSION_TTL_SECONDS;

/// Authentication and signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC/JWT signing secret. Required; empty means misconfigured.
    #[serde(default)]
    pub secret: String,

    /// Signed-link lifetime in seconds.
    #[serde(default = "default_link_ttl")]
    pub link_ttl_seconds: u64,

    /// Session credential lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,

    /// Magic-link token lifetime in seconds.
    #[serde(default = "default_magic_link_ttl")]
    pub magic_link_ttl_seconds: u64,

    /// Session cookie settings.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            link_ttl_seconds: default_link_ttl(),
            session_ttl_seconds: default_session_ttl(),
            magic_link_ttl_seconds: default_magic_link_ttl(),
            cookie: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Misconfigured` for an empty secret or a zero TTL.
    pub fn validate(&self) -> Result<(), AccessError> {
        if self.secret.is_empty() {
            return Err(AccessError::misconfigured("auth.secret must be set"));
        }
        if self.link_ttl_seconds == 0 {
            return Err(AccessError::misconfigured("auth.link_ttl_seconds must be > 0"));
        }
        if self.session_ttl_seconds == 0 {
            return Err(AccessError::misconfigured(
                "auth.session_ttl_seconds must be > 0",
            ));
        }
        if self.magic_link_ttl_seconds == 0 {
            return Err(AccessError::misconfigured(
                "auth.magic_link_ttl_seconds must be > 0",
            ));
        }
        Ok(())
    }
}

fn default_link_ttl() -> u64 {
    DEFAULT_LINK_TTL_SECONDS
}

fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECONDS
}

fn default_magic_link_ttl() -> u64 {
    DEFAULT_MAGIC_LINK_TTL_SECONDS
}

/// Session cookie settings.
///
/// Defaults match the contract: HTTP-only, Secure, SameSite=Strict, scoped
/// to the whole site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Sets the `Secure` attribute.
    #[serde(default = "default_true")]
    pub secure: bool,

    /// Sets the `HttpOnly` attribute.
    #[serde(default = "default_true")]
    pub http_only: bool,

    /// `SameSite` value: `strict`, `lax`, or `none`.
    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: true,
            http_only: true,
            same_site: default_same_site(),
            path: default_cookie_path(),
        }
    }
}

impl CookieConfig {
    /// Builds a `Set-Cookie` value carrying `value` for `max_age` seconds.
    #[must_use]
    pub fn build_cookie(&self, value: &str, max_age_seconds: u64) -> String {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name, value, max_age_seconds, self.path
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        match self.same_site.to_ascii_lowercase().as_str() {
            "lax" => cookie.push_str("; SameSite=Lax"),
            "none" => cookie.push_str("; SameSite=None"),
            _ => cookie.push_str("; SameSite=Strict"),
        }
        cookie
    }

    /// Builds a `Set-Cookie` value that clears the cookie immediately.
    #[must_use]
    pub fn clear_cookie(&self) -> String {
        self.build_cookie("", 0)
    }
}

fn default_cookie_name() -> String {
    "dg_session".to_string()
}

fn default_true() -> bool {
    true
}

fn default_same_site() -> String {
    "strict".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}
