//! Durable file-backed revocation storage.
//!
//! Persists both revocation namespaces as a single JSON document. All
//! mutation happens under one mutex spanning the whole read-merge-write, so
//! two concurrent revokes end with the union of entries rather than the last
//! writer's view. Writes go to a sibling temp file and are renamed into
//! place, so a crash mid-write leaves the previous document intact.
//!
//! A missing file initializes to the empty state, matching the "first run"
//! contract. A present but unparseable file is a storage error, never an
//! empty set.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    RevocationSnapshot, RevocationStorage, SessionRevocation, SignatureRevocation, signature_key,
};
use crate::AccessResult;
use crate::error::AccessError;

/// Revocation storage backed by a JSON file.
#[derive(Debug)]
pub struct FileRevocationStorage {
    path: PathBuf,
    // Serializes every read-merge-write; reads outside a mutation do not
    // need it because rename is atomic.
    write_lock: Mutex<()>,
}

impl FileRevocationStorage {
    /// Creates a store persisting to `path`. The file is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> AccessResult<RevocationSnapshot> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AccessError::storage(format!(
                    "revocation file {} is not valid JSON: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(RevocationSnapshot::default())
            }
            Err(e) => Err(AccessError::storage(format!(
                "failed to read revocation file {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_all(&self, data: &RevocationSnapshot) -> AccessResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AccessError::storage(format!(
                    "failed to create revocation directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| AccessError::storage(format!("failed to encode revocations: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await.map_err(|e| {
            AccessError::storage(format!(
                "failed to write revocation file {}: {e}",
                tmp.display()
            ))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AccessError::storage(format!(
                "failed to replace revocation file {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl RevocationStorage for FileRevocationStorage {
    async fn revoke_signature(
        &self,
        resource_id: &str,
        signature: &str,
        now_ms: i64,
    ) -> AccessResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.read_all().await?;
        let key = signature_key(resource_id, signature);
        if data.signatures.iter().any(|entry| entry.key == key) {
            return Ok(());
        }
        data.signatures.push(SignatureRevocation {
            key,
            revoked_at_ms: now_ms,
        });
        self.write_all(&data).await?;
        tracing::info!(resource_id, "Link signature revoked");
        Ok(())
    }

    async fn is_signature_revoked(
        &self,
        resource_id: &str,
        signature: &str,
    ) -> AccessResult<bool> {
        let data = self.read_all().await?;
        let key = signature_key(resource_id, signature);
        Ok(data.signatures.iter().any(|entry| entry.key == key))
    }

    async fn revoke_session(&self, jti: &str, now_ms: i64) -> AccessResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.read_all().await?;
        if data.sessions.iter().any(|entry| entry.jti == jti) {
            return Ok(());
        }
        data.sessions.push(SessionRevocation {
            jti: jti.to_string(),
            revoked_at_ms: now_ms,
        });
        self.write_all(&data).await?;
        tracing::info!(jti, "Session revoked");
        Ok(())
    }

    async fn is_session_revoked(&self, jti: &str) -> AccessResult<bool> {
        let data = self.read_all().await?;
        Ok(data.sessions.iter().any(|entry| entry.jti == jti))
    }

    async fn snapshot(&self) -> AccessResult<RevocationSnapshot> {
        self.read_all().await
    }
}
