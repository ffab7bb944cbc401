//! Revocation storage.
//!
//! The revocation store is the only mutable shared state in the access
//! control flow. It owns two namespaces: revoked `(resource, signature)`
//! pairs for signed links, and revoked session `jti`s. Both use the same
//! contract: idempotent insert, fast membership test.
//!
//! # Security Considerations
//!
//! - Inserting an already-present key is a no-op, not an error and not a
//!   duplicate.
//! - Reads must reflect all previously completed writes within a process.
//! - Storage must be durable across restarts; a missing store initializes
//!   empty rather than failing.
//! - Concurrent revokes of the same or different keys must not lose an
//!   insert: the persisted set after both complete is the union.

mod file;
mod memory;

pub use file::FileRevocationStorage;
pub use memory::MemoryRevocationStorage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AccessResult;

/// A revoked link signature, keyed by `{resource_id}:{signature}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRevocation {
    /// Composite key `{resource_id}:{signature}`.
    pub key: String,
    /// When revocation was recorded, Unix milliseconds.
    pub revoked_at_ms: i64,
}

/// A revoked session, keyed by the credential's `jti`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRevocation {
    /// The unique identifier minted into the session credential.
    pub jti: String,
    /// When revocation was recorded, Unix milliseconds.
    pub revoked_at_ms: i64,
}

/// A consistent point-in-time view of both revocation namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationSnapshot {
    /// Revoked link signatures.
    #[serde(default)]
    pub signatures: Vec<SignatureRevocation>,
    /// Revoked session jtis.
    #[serde(default)]
    pub sessions: Vec<SessionRevocation>,
}

/// Builds the composite signature revocation key.
#[must_use]
pub fn signature_key(resource_id: &str, signature: &str) -> String {
    format!("{resource_id}:{signature}")
}

/// Storage trait for revocation entries.
///
/// Implementations must make every insert idempotent and must not lose
/// concurrent inserts. Membership tests run on every verification, so they
/// should be cheap.
#[async_trait]
pub trait RevocationStorage: Send + Sync {
    /// Records `{resource_id}:{signature}` as revoked at `now_ms`.
    ///
    /// Revoking an already-revoked pair succeeds without creating a
    /// duplicate entry.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backing medium fails.
    async fn revoke_signature(
        &self,
        resource_id: &str,
        signature: &str,
        now_ms: i64,
    ) -> AccessResult<()>;

    /// Checks whether `{resource_id}:{signature}` has been revoked.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backing medium fails.
    async fn is_signature_revoked(&self, resource_id: &str, signature: &str)
    -> AccessResult<bool>;

    /// Records a session `jti` as revoked at `now_ms`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backing medium fails.
    async fn revoke_session(&self, jti: &str, now_ms: i64) -> AccessResult<()>;

    /// Checks whether a session `jti` has been revoked.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backing medium fails.
    async fn is_session_revoked(&self, jti: &str) -> AccessResult<bool>;

    /// Returns a consistent snapshot of both namespaces, for the
    /// administrative listing interface.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backing medium fails.
    async fn snapshot(&self) -> AccessResult<RevocationSnapshot>;
}
