//! In-memory revocation storage.
//!
//! Suitable for tests and single-process development runs. Not durable:
//! state is lost when the process exits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    RevocationSnapshot, RevocationStorage, SessionRevocation, SignatureRevocation, signature_key,
};
use crate::AccessResult;

/// Revocation storage backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryRevocationStorage {
    // key -> revoked_at_ms, both namespaces. BTreeMap keeps snapshots in a
    // stable order.
    signatures: RwLock<BTreeMap<String, i64>>,
    sessions: RwLock<BTreeMap<String, i64>>,
}

impl MemoryRevocationStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStorage for MemoryRevocationStorage {
    async fn revoke_signature(
        &self,
        resource_id: &str,
        signature: &str,
        now_ms: i64,
    ) -> AccessResult<()> {
        let key = signature_key(resource_id, signature);
        let mut signatures = self.signatures.write().await;
        // entry().or_insert keeps the original revocation timestamp.
        signatures.entry(key).or_insert(now_ms);
        Ok(())
    }

    async fn is_signature_revoked(
        &self,
        resource_id: &str,
        signature: &str,
    ) -> AccessResult<bool> {
        let key = signature_key(resource_id, signature);
        Ok(self.signatures.read().await.contains_key(&key))
    }

    async fn revoke_session(&self, jti: &str, now_ms: i64) -> AccessResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(jti.to_string()).or_insert(now_ms);
        Ok(())
    }

    async fn is_session_revoked(&self, jti: &str) -> AccessResult<bool> {
        Ok(self.sessions.read().await.contains_key(jti))
    }

    async fn snapshot(&self) -> AccessResult<RevocationSnapshot> {
        let signatures = self.signatures.read().await;
        let sessions = self.sessions.read().await;
        Ok(RevocationSnapshot {
            signatures: signatures
                .iter()
                .map(|(key, revoked_at_ms)| SignatureRevocation {
                    key: key.clone(),
                    revoked_at_ms: *revoked_at_ms,
                })
                .collect(),
            sessions: sessions
                .iter()
                .map(|(jti, revoked_at_ms)| SessionRevocation {
                    jti: jti.clone(),
                    revoked_at_ms: *revoked_at_ms,
                })
                .collect(),
        })
    }
}
