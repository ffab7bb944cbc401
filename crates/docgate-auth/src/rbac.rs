//! Role-based authorization gate.
//!
//! A pure set-membership check over the verified session's role claims.
//! Callers pass the roles read from [`crate::session::SessionClaims`] and
//! the set allowed for the operation; nothing here consults hidden state.

use crate::AccessResult;
use crate::error::AccessError;

/// Well-known role names used across the portal.
pub const ROLES: &[&str] = &["lender", "partner", "counsel", "admin"];

/// Role granting access to the administrative interfaces.
pub const ADMIN_ROLE: &str = "admin";

/// Returns `true` if any claimed role is in the allowed set.
#[must_use]
pub fn has_role(claimed: &[String], allowed: &[&str]) -> bool {
    claimed
        .iter()
        .any(|role| allowed.iter().any(|allowed_role| role == allowed_role))
}

/// Requires a non-empty intersection between claimed and allowed roles.
///
/// # Errors
///
/// Returns `Forbidden` naming the required roles (role names are not
/// sensitive; the claimed set is not echoed).
pub fn require_role(claimed: &[String], allowed: &[&str]) -> AccessResult<()> {
    if has_role(claimed, allowed) {
        Ok(())
    } else {
        Err(AccessError::forbidden(format!(
            "requires role {}",
            allowed.join(", ")
        )))
    }
}
