//! Driving port for public, unauthenticated certificate verification.

use async_trait::async_trait;

use crate::domain::{AchievementView, CertificateSummary, Error, Student};

/// Message returned for unknown or malformed tokens.
pub const NOT_FOUND_MESSAGE: &str = "Certificate not found; the document may be forged";
/// Message returned for revoked certificates.
pub const REVOKED_MESSAGE: &str = "Certificate has been revoked and is no longer valid";
/// Message returned for active certificates.
pub const VALID_MESSAGE: &str = "Certificate is valid and officially issued";

/// Result of verifying a token. Exactly one outcome applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// No certificate carries the token. Nothing else is disclosed.
    NotFound,
    /// The certificate exists but was revoked. Only its metadata is disclosed.
    Revoked { certificate: CertificateSummary },
    /// The certificate is active.
    Valid {
        certificate: CertificateSummary,
        student: Student,
        /// Newest year first.
        achievements: Vec<AchievementView>,
    },
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Human-readable explanation of the outcome.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => NOT_FOUND_MESSAGE,
            Self::Revoked { .. } => REVOKED_MESSAGE,
            Self::Valid { .. } => VALID_MESSAGE,
        }
    }
}

/// Verification exposed to the public inbound adapter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateVerification: Send + Sync {
    /// Look up `token` and report whether the certificate is valid.
    ///
    /// Lookup failures are errors; an unknown token is
    /// [`VerificationOutcome::NotFound`].
    async fn verify(&self, token: &str) -> Result<VerificationOutcome, Error>;
}
