//! Driving port for certificate mutations: issuance and revocation.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AchievementId, CertificateDetail, CertificateId, Error, StudentId, UserId};

/// Request to issue a certificate for a selection of achievements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCertificateRequest {
    pub student_id: StudentId,
    pub achievement_ids: Vec<AchievementId>,
    pub valid_until: Option<NaiveDate>,
    pub notes: String,
    /// Authenticated staff member issuing the certificate.
    pub issued_by: UserId,
}

/// Request to revoke a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeCertificateRequest {
    pub certificate_id: CertificateId,
    pub revoked_by: UserId,
}

/// Certificate mutations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateCommand: Send + Sync {
    /// Issue a certificate and return its stored detail.
    async fn issue(&self, request: IssueCertificateRequest) -> Result<CertificateDetail, Error>;

    /// Revoke an active certificate.
    async fn revoke(&self, request: RevokeCertificateRequest) -> Result<(), Error>;
}
