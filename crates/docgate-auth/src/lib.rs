//! # docgate-auth
//!
//! Access control core for the document portal.
//!
//! This crate provides:
//! - HMAC-SHA256 signed download links with bounded lifetimes
//! - Link verification with constant-time signature comparison
//! - Durable, idempotent revocation of links and sessions
//! - JWT session credentials with per-issuance `jti`
//! - Magic-link login bootstrap
//! - Role-based authorization checks
//!
//! ## Overview
//!
//! Everything secret-dependent flows through one injected configuration
//! struct and one injected [`time::Clock`], so every expiry and signature
//! decision is deterministic under test. Verification order is fixed:
//! malformed input, then configuration, then expiry, then signature, then
//! revocation, so the revocation store is never consulted for requests
//! that fail cheaper checks.
//!
//! ## Modules
//!
//! - [`config`] - Auth configuration and session cookie settings
//! - [`error`] - The access error taxonomy
//! - [`link`] - Signed-link issuance and verification
//! - [`mac`] - Keyed MAC computation and constant-time verification
//! - [`magic`] - Magic-link login tokens
//! - [`middleware`] - Axum session extractors and error responses
//! - [`rbac`] - Role membership checks
//! - [`session`] - JWT session issuance, verification and revocation
//! - [`storage`] - Revocation storage trait and backends
//! - [`time`] - Injectable clock

pub mod config;
pub mod error;
pub mod link;
pub mod mac;
pub mod magic;
pub mod middleware;
pub mod rbac;
pub mod session;
pub mod storage;
pub mod time;

pub use config::{AuthConfig, CookieConfig};
pub use error::{AccessError, ErrorCategory};
pub use link::{DEFAULT_LINK_TTL_SECONDS, LinkService, SignedLink};
pub use magic::{DEFAULT_MAGIC_LINK_TTL_SECONDS, MagicLink, MagicLinkService};
pub use middleware::{AdminAuth, AuthState, SessionAuth};
pub use rbac::{ADMIN_ROLE, ROLES, has_role, require_role};
pub use session::{DEFAULT_SESSION_TTL_SECONDS, SessionClaims, SessionService};
pub use storage::{
    FileRevocationStorage, MemoryRevocationStorage, RevocationSnapshot, RevocationStorage,
    SessionRevocation, SignatureRevocation, signature_key,
};
pub use time::{Clock, FixedClock, SystemClock};

/// Type alias for access control results.
pub type AccessResult<T> = Result<T, AccessError>;
