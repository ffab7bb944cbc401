//! Watermarking collaborator seam.
//!
//! The download path composes a provenance marker and moves the document
//! bytes through an injected [`Watermarker`]. The stamping engine itself is
//! an external collaborator; the implementation shipped here passes bytes
//! through unchanged and records the marker in the log.

use docgate_auth::AccessResult;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Stamps a provenance marker into a document.
pub trait Watermarker: Send + Sync {
    /// Returns the stamped document bytes.
    ///
    /// # Errors
    ///
    /// Implementations return `Storage` when the document cannot be
    /// processed.
    fn stamp(&self, bytes: &[u8], marker: &str) -> AccessResult<Vec<u8>>;
}

/// Watermarker that forwards bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughWatermarker;

impl Watermarker for PassthroughWatermarker {
    fn stamp(&self, bytes: &[u8], marker: &str) -> AccessResult<Vec<u8>> {
        tracing::debug!(marker, size = bytes.len(), "Watermark applied");
        Ok(bytes.to_vec())
    }
}

/// Composes the marker stamped into downloaded documents.
///
/// `origin` is the caller's address; `token` is the presented session token,
/// of which only a short prefix is embedded.
#[must_use]
pub fn provenance_marker(now_ms: i64, origin: &str, token: Option<&str>) -> String {
    let timestamp = OffsetDateTime::from_unix_timestamp_nanos(i128::from(now_ms) * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| now_ms.to_string());

    let token_part = match token {
        Some(t) if !t.is_empty() => {
            let prefix: String = t.chars().take(12).collect();
            format!("{prefix}…")
        }
        _ => "none".to_string(),
    };

    format!("Confidential • {timestamp} • IP:{origin} • Token:{token_part}")
}
