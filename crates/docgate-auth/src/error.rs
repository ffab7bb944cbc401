//! Access control error types.
//!
//! This module defines the error taxonomy shared by link verification,
//! session authentication and the revocation store. Every verification
//! failure is terminal for its request; none are retried. The split between
//! client errors and server errors matters operationally: `Misconfigured`
//! and `Storage` indicate operator-fixable systemic issues, while the rest
//! are expected traffic and should never page anyone.

use std::fmt;

/// Errors that can occur during link verification, session authentication
/// and revocation operations.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The request is structurally invalid (missing or unparseable
    /// parameters) and was rejected before any secret-dependent check.
    #[error("Malformed request: {message}")]
    MalformedRequest {
        /// Description of what was malformed.
        message: String,
    },

    /// The server is missing required configuration (typically the signing
    /// secret). Never to be confused with a caller-side failure.
    #[error("Server misconfigured: {message}")]
    Misconfigured {
        /// Description of the configuration problem.
        message: String,
    },

    /// The link or token is past its expiry.
    #[error("Expired")]
    Expired,

    /// The presented link signature does not authenticate.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The session token is invalid, malformed, or fails signature
    /// verification.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The link signature or session jti has been explicitly revoked.
    #[error("Revoked")]
    Revoked,

    /// The authenticated caller does not hold any of the required roles.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of the missing permission.
        message: String,
    },

    /// The protected resource does not exist (verification succeeded but
    /// the underlying artifact is absent).
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// An error occurred while reading or writing revocation state.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },
}

impl AccessError {
    /// Creates a new `MalformedRequest` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Misconfigured` error.
    #[must_use]
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a caller-driven error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest { .. }
                | Self::Expired
                | Self::InvalidSignature
                | Self::InvalidToken { .. }
                | Self::Revoked
                | Self::Forbidden { .. }
                | Self::NotFound { .. }
        )
    }

    /// Returns `true` if this is an operator-fixable error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Misconfigured { .. } | Self::Storage { .. })
    }

    /// Returns the error category for logging and monitoring.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedRequest { .. } => ErrorCategory::Validation,
            Self::Misconfigured { .. } => ErrorCategory::Configuration,
            Self::Expired => ErrorCategory::Expiry,
            Self::InvalidSignature | Self::InvalidToken { .. } => ErrorCategory::Authentication,
            Self::Revoked => ErrorCategory::Revocation,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::Resource,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
        }
    }

    /// Returns a short generic label safe to echo to external callers.
    ///
    /// Internal details (which MAC failed, whether the secret is present)
    /// are never exposed through this.
    #[must_use]
    pub fn public_label(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "malformed_request",
            Self::Misconfigured { .. } | Self::Storage { .. } => "server_error",
            Self::Expired => "expired",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidToken { .. } => "invalid_token",
            Self::Revoked => "revoked",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
        }
    }
}

/// Categories of access errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request validation errors.
    Validation,
    /// Configuration errors.
    Configuration,
    /// Expiry errors.
    Expiry,
    /// Signature or token authentication errors.
    Authentication,
    /// Revocation hits.
    Revocation,
    /// Authorization (role) errors.
    Authorization,
    /// Missing resource errors.
    Resource,
    /// Storage and infrastructure errors.
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Configuration => write!(f, "configuration"),
            Self::Expiry => write!(f, "expiry"),
            Self::Authentication => write!(f, "authentication"),
            Self::Revocation => write!(f, "revocation"),
            Self::Authorization => write!(f, "authorization"),
            Self::Resource => write!(f, "resource"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}
