//! Secret-keyed MAC utility.
//!
//! Computes and verifies HMAC-SHA256 digests over canonical strings. Digests
//! are rendered as lowercase hex (64 characters for the 256-bit output).
//! Verification compares candidate and expected digests in constant time so
//! response timing cannot leak where a forged value first diverges.
//!
//! A missing secret is a configuration failure (`Misconfigured`), distinct
//! from a caller presenting a bad signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AccessError;

type HmacSha256 = Hmac<Sha256>;

/// Length in characters of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Computes the lowercase-hex HMAC-SHA256 of `message` under `secret`.
///
/// # Errors
///
/// Returns `Misconfigured` if the secret is empty.
pub fn compute(message: &str, secret: &str) -> Result<String, AccessError> {
    if secret.is_empty() {
        return Err(AccessError::misconfigured("signing secret is not set"));
    }
    // HMAC accepts keys of any length, so new_from_slice cannot fail here.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AccessError::misconfigured(format!("invalid MAC key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies `candidate_hex` against the digest of `message` under `secret`.
///
/// A candidate whose length differs from the fixed digest length is rejected
/// immediately as a structural validity failure, before any byte comparison.
/// Equal-length candidates are compared over all bytes with no short-circuit.
///
/// # Errors
///
/// Returns `Misconfigured` if the secret is empty.
pub fn verify(candidate_hex: &str, message: &str, secret: &str) -> Result<bool, AccessError> {
    let expected = compute(message, secret)?;
    if candidate_hex.len() != expected.len() {
        return Ok(false);
    }
    Ok(constant_time_eq(
        candidate_hex.as_bytes(),
        expected.as_bytes(),
    ))
}

/// Constant-time comparison of equal-length buffers.
///
/// Accumulates the XOR of every byte pair; execution time does not depend on
/// where the buffers first differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
