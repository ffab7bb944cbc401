//! Signed-link issuance and verification.
//!
//! A signed link grants time-limited access to one protected document. The
//! link embeds the resource id as a path segment and carries `exp` (absolute
//! Unix milliseconds) and `sig` (lowercase hex HMAC-SHA256 over
//! `"{resource_id}.{expires_at_ms}"`) as query parameters. Validity is fully
//! self-contained in that triple, so issuance writes no state; only
//! revocation needs the store.
//!
//! # Verification order
//!
//! The verifier applies five hard gates, failing fast at each:
//!
//! 1. presence/shape of `exp` and `sig` (`MalformedRequest`)
//! 2. secret configured (`Misconfigured`)
//! 3. expiry, inclusive boundary (`Expired`)
//! 4. MAC authenticity, constant-time once reached (`InvalidSignature`)
//! 5. revocation lookup (`Revoked`)
//!
//! Cheap, non-secret-dependent checks run first; the revocation lookup is
//! last so its I/O round-trip is only paid for authentic signatures and the
//! store cannot be probed with garbage. A link that is both expired and
//! revoked therefore reports `Expired`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::storage::RevocationStorage;
use crate::time::Clock;
use crate::{AccessResult, mac};

/// Default link lifetime in seconds.
pub const DEFAULT_LINK_TTL_SECONDS: u64 = 300;

/// An issued signed link.
///
/// The signature is structurally determined by `resource_id` and
/// `expires_at_ms` under the server secret; it has no independent identity
/// and is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLink {
    /// Opaque identifier of the protected document.
    pub resource_id: String,
    /// Absolute Unix milliseconds after which the link is invalid.
    pub expires_at_ms: i64,
    /// Lowercase hex MAC over `"{resource_id}.{expires_at_ms}"`.
    pub signature: String,
    /// Relative download URL carrying `exp` and `sig`.
    pub url: String,
}

/// Issues and verifies signed links.
///
/// Holds the server secret, the clock, and the injected revocation store.
/// Verification takes `&self` and has no side effects beyond the store's
/// read, so any number may run concurrently against the same link.
pub struct LinkService {
    secret: String,
    clock: Arc<dyn Clock>,
    store: Arc<dyn RevocationStorage>,
}

impl LinkService {
    /// Creates a link service.
    pub fn new(
        secret: impl Into<String>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn RevocationStorage>,
    ) -> Self {
        Self {
            secret: secret.into(),
            clock,
            store,
        }
    }

    /// Issues a signed download link for `resource_id`, valid for
    /// `ttl_seconds` from now.
    ///
    /// Pure function of clock, input and secret; no state is written.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` if `resource_id` is empty or `ttl_seconds` is 0.
    /// - `Misconfigured` if the secret is not set.
    pub fn issue(&self, resource_id: &str, ttl_seconds: u64) -> AccessResult<SignedLink> {
        if resource_id.is_empty() {
            return Err(AccessError::malformed("resource_id must not be empty"));
        }
        if ttl_seconds == 0 {
            return Err(AccessError::malformed("ttl_seconds must be positive"));
        }

        let expires_at_ms = i64::try_from(ttl_seconds)
            .ok()
            .and_then(|ttl| ttl.checked_mul(1000))
            .and_then(|ttl_ms| self.clock.now_ms().checked_add(ttl_ms))
            .ok_or_else(|| AccessError::malformed("ttl_seconds is too large"))?;
        let signature = mac::compute(&canonical_message(resource_id, expires_at_ms), &self.secret)?;
        let url = format!(
            "/resource/{}/download?exp={}&sig={}",
            urlencoding::encode(resource_id),
            expires_at_ms,
            urlencoding::encode(&signature),
        );

        tracing::debug!(resource_id, expires_at_ms, "Signed link issued");

        Ok(SignedLink {
            resource_id: resource_id.to_string(),
            expires_at_ms,
            signature,
            url,
        })
    }

    /// Verifies a presented link against the five gates described in the
    /// module docs.
    ///
    /// `exp_raw` and `sig_raw` are the query parameters exactly as received;
    /// the MAC is computed over the raw `exp` string, so any textual change
    /// to it fails as a signature mismatch even when the numeric value is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// One of `MalformedRequest`, `Misconfigured`, `Expired`,
    /// `InvalidSignature`, `Revoked`, or `Storage` from the revocation
    /// lookup.
    pub async fn verify(
        &self,
        resource_id: &str,
        exp_raw: Option<&str>,
        sig_raw: Option<&str>,
    ) -> AccessResult<()> {
        // Gate 1: presence and shape, before anything secret-dependent.
        let exp_raw = exp_raw
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AccessError::malformed("missing exp parameter"))?;
        let sig_raw = sig_raw
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AccessError::malformed("missing sig parameter"))?;
        if resource_id.is_empty() {
            return Err(AccessError::malformed("resource_id must not be empty"));
        }
        let expires_at_ms: i64 = exp_raw
            .parse()
            .map_err(|_| AccessError::malformed("exp is not an integer"))?;

        // Gate 2: configuration.
        if self.secret.is_empty() {
            return Err(AccessError::misconfigured("signing secret is not set"));
        }

        // Gate 3: expiry. exp == now is still valid (inclusive boundary).
        let now_ms = self.clock.now_ms();
        if expires_at_ms < now_ms {
            tracing::debug!(resource_id, expires_at_ms, now_ms, "Link expired");
            return Err(AccessError::Expired);
        }

        // Gate 4: authenticity, constant-time over the raw exp string.
        let message = format!("{resource_id}.{exp_raw}");
        if !mac::verify(sig_raw, &message, &self.secret)? {
            tracing::debug!(resource_id, "Link signature rejected");
            return Err(AccessError::InvalidSignature);
        }

        // Gate 5: revocation, only reached for authentic signatures.
        if self.store.is_signature_revoked(resource_id, sig_raw).await? {
            tracing::debug!(resource_id, "Link is revoked");
            return Err(AccessError::Revoked);
        }

        Ok(())
    }
}

fn canonical_message(resource_id: &str, expires_at_ms: i64) -> String {
    format!("{resource_id}.{expires_at_ms}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRevocationStorage;
    use crate::time::FixedClock;

    fn service_at(now_ms: i64, secret: &str) -> (LinkService, Arc<FixedClock>) {
        let clock = FixedClock::shared(now_ms);
        let store = Arc::new(MemoryRevocationStorage::new());
        (
            LinkService::new(secret, clock.clone(), store),
            clock,
        )
    }

    fn service_with_store(
        now_ms: i64,
        secret: &str,
        store: Arc<MemoryRevocationStorage>,
    ) -> (LinkService, Arc<FixedClock>) {
        let clock = FixedClock::shared(now_ms);
        (LinkService::new(secret, clock.clone(), store), clock)
    }

    #[tokio::test]
    async fn test_issue_then_verify_round_trip() {
        let (service, _clock) = service_at(1_000_000, "s3cr3t");
        let link = service.issue("doc-42", 300).unwrap();
        service
            .verify(
                "doc-42",
                Some(&link.expires_at_ms.to_string()),
                Some(&link.signature),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_concrete_scenario_from_contract() {
        // issue("doc-42", 300) at now = 1_000_000.
        let (service, clock) = service_at(1_000_000, "s3cr3t");
        let link = service.issue("doc-42", 300).unwrap();

        assert_eq!(link.expires_at_ms, 1_300_000);
        assert_eq!(link.signature.len(), 64);
        assert_eq!(
            link.url,
            format!("/resource/doc-42/download?exp=1300000&sig={}", link.signature)
        );

        // At exactly the expiry instant the link still verifies.
        clock.set_ms(1_300_000);
        service
            .verify("doc-42", Some("1300000"), Some(&link.signature))
            .await
            .unwrap();

        // One millisecond later it is expired.
        clock.set_ms(1_300_001);
        let err = service
            .verify("doc-42", Some("1300000"), Some(&link.signature))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Expired));
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_input() {
        let (service, _clock) = service_at(1_000_000, "s3cr3t");
        assert!(matches!(
            service.issue("", 300).unwrap_err(),
            AccessError::MalformedRequest { .. }
        ));
        assert!(matches!(
            service.issue("doc-42", 0).unwrap_err(),
            AccessError::MalformedRequest { .. }
        ));
        // A ttl whose millisecond rendering cannot fit i64 is rejected, not
        // wrapped into a bogus expiry.
        assert!(matches!(
            service.issue("doc-42", u64::MAX).unwrap_err(),
            AccessError::MalformedRequest { .. }
        ));
    }

    #[tokio::test]
    async fn test_issue_without_secret_is_config_error() {
        let (service, _clock) = service_at(1_000_000, "");
        assert!(matches!(
            service.issue("doc-42", 300).unwrap_err(),
            AccessError::Misconfigured { .. }
        ));
    }

    #[tokio::test]
    async fn test_url_percent_encodes_resource_id() {
        let (service, _clock) = service_at(1_000_000, "s3cr3t");
        let link = service.issue("q3 deck", 300).unwrap();
        assert!(link.url.starts_with("/resource/q3%20deck/download?"));
    }

    #[tokio::test]
    async fn test_verify_missing_params_is_malformed() {
        let (service, _clock) = service_at(1_000_000, "s3cr3t");
        for (exp, sig) in [
            (None, Some("sig")),
            (Some("1300000"), None),
            (None, None),
            (Some(""), Some("sig")),
            (Some("soon"), Some("sig")),
        ] {
            let err = service.verify("doc-42", exp, sig).await.unwrap_err();
            assert!(
                matches!(err, AccessError::MalformedRequest { .. }),
                "exp={exp:?} sig={sig:?} gave {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_verify_without_secret_is_config_error() {
        let (service, _clock) = service_at(1_000_000, "");
        let err = service
            .verify("doc-42", Some("1300000"), Some("deadbeef"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Misconfigured { .. }));
    }

    #[tokio::test]
    async fn test_tamper_sensitivity() {
        let (service, _clock) = service_at(1_000_000, "s3cr3t");
        let link = service.issue("doc-42", 300).unwrap();
        let exp = link.expires_at_ms.to_string();

        // Flipped signature character.
        let mut tampered: Vec<u8> = link.signature.bytes().collect();
        tampered[10] = if tampered[10] == b'a' { b'b' } else { b'a' };
        let tampered = String::from_utf8(tampered).unwrap();
        let err = service
            .verify("doc-42", Some(&exp), Some(&tampered))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidSignature));

        // Different resource id.
        let err = service
            .verify("doc-43", Some(&exp), Some(&link.signature))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidSignature));

        // Shifted (still future) expiry.
        let err = service
            .verify("doc-42", Some("1300001"), Some(&link.signature))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_reencoded_exp_string_fails_signature() {
        let (service, _clock) = service_at(1_000_000, "s3cr3t");
        let link = service.issue("doc-42", 300).unwrap();
        // Same numeric value, different text: the MAC covers the raw string.
        let err = service
            .verify("doc-42", Some("+1300000"), Some(&link.signature))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_revoked_link_is_rejected() {
        let store = Arc::new(MemoryRevocationStorage::new());
        let (service, _clock) = service_with_store(1_000_000, "s3cr3t", store.clone());
        let link = service.issue("doc-42", 300).unwrap();
        let exp = link.expires_at_ms.to_string();

        service
            .verify("doc-42", Some(&exp), Some(&link.signature))
            .await
            .unwrap();

        store
            .revoke_signature("doc-42", &link.signature, 1_000_001)
            .await
            .unwrap();

        let err = service
            .verify("doc-42", Some(&exp), Some(&link.signature))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Revoked));
    }

    #[tokio::test]
    async fn test_expired_wins_over_revoked() {
        // Deliberate precedence: expiry is checked before the revocation
        // lookup, so a link that is both reports Expired.
        let store = Arc::new(MemoryRevocationStorage::new());
        let (service, clock) = service_with_store(1_000_000, "s3cr3t", store.clone());
        let link = service.issue("doc-42", 300).unwrap();

        store
            .revoke_signature("doc-42", &link.signature, 1_000_001)
            .await
            .unwrap();
        clock.set_ms(link.expires_at_ms + 1);

        let err = service
            .verify(
                "doc-42",
                Some(&link.expires_at_ms.to_string()),
                Some(&link.signature),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Expired));
    }

    #[tokio::test]
    async fn test_garbage_signature_never_reaches_revocation_probe() {
        // A forged signature fails at gate 4; the revocation namespace is
        // not consultable with unauthenticated input.
        let store = Arc::new(MemoryRevocationStorage::new());
        store
            .revoke_signature("doc-42", "forged", 1_000)
            .await
            .unwrap();
        let (service, _clock) = service_with_store(1_000_000, "s3cr3t", store);

        let err = service
            .verify("doc-42", Some("1300000"), Some("forged"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidSignature));
    }
}
