//! Certificates attesting to a student's selected achievements.
//!
//! A certificate is created exactly once per issuance. After creation only
//! two things may change: the rendered PDF URL is attached, and the status
//! moves from active to revoked. Status never moves back.

mod number;
mod token;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{AchievementWithAttachments, Student, StudentId, UserId};

pub use number::{
    CertificateNumber, CertificateNumberError, DEFAULT_OFFICE_CODE, OfficeCode, OfficeCodeError,
};
pub use token::{TOKEN_LENGTH, VerificationToken, VerificationTokenError};

/// Stable certificate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(Uuid);

impl CertificateId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Active,
    Revoked,
}

impl CertificateStatus {
    /// Storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is neither `active` nor `revoked`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown certificate status: {0}")]
pub struct ParseCertificateStatusError(pub String);

impl FromStr for CertificateStatus {
    type Err = ParseCertificateStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            other => Err(ParseCertificateStatusError(other.to_owned())),
        }
    }
}

/// Invalid lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CertificateStateError {
    #[error("certificate has already been revoked")]
    AlreadyRevoked,
}

/// Values fixed at issuance time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDraft {
    pub id: CertificateId,
    pub student_id: StudentId,
    pub number: CertificateNumber,
    pub issued_at: DateTime<Utc>,
    pub issued_by: Option<UserId>,
    pub valid_until: Option<NaiveDate>,
    pub verification_token: VerificationToken,
    pub notes: String,
}

/// Every stored column, used to rehydrate a [`Certificate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub draft: CertificateDraft,
    pub pdf_url: Option<String>,
    pub status: CertificateStatus,
    pub created_at: DateTime<Utc>,
}

/// An issued certificate.
///
/// ## Invariants
/// - `number` and `verification_token` never change after issuance.
/// - `status` only moves from [`CertificateStatus::Active`] to
///   [`CertificateStatus::Revoked`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    draft: CertificateDraft,
    pdf_url: Option<String>,
    status: CertificateStatus,
    created_at: DateTime<Utc>,
}

impl Certificate {
    /// Create a freshly issued, active certificate without a rendered PDF.
    pub fn issue(draft: CertificateDraft) -> Self {
        let created_at = draft.issued_at;
        Self {
            draft,
            pdf_url: None,
            status: CertificateStatus::Active,
            created_at,
        }
    }

    /// Rebuild a certificate from storage.
    pub fn restore(record: CertificateRecord) -> Self {
        let CertificateRecord {
            draft,
            pdf_url,
            status,
            created_at,
        } = record;
        Self {
            draft,
            pdf_url,
            status,
            created_at,
        }
    }

    /// Move an active certificate to revoked.
    ///
    /// # Examples
    /// ```
    /// # use achievement_ledger::domain::*;
    /// # use chrono::Utc;
    /// let mut certificate = Certificate::issue(CertificateDraft {
    ///     id: CertificateId::random(),
    ///     student_id: StudentId::random(),
    ///     number: CertificateNumber::next_in_year(&OfficeCode::default(), 2024, 0),
    ///     issued_at: Utc::now(),
    ///     issued_by: None,
    ///     valid_until: None,
    ///     verification_token: VerificationToken::generate(),
    ///     notes: String::new(),
    /// });
    /// certificate.revoke().expect("first revocation succeeds");
    /// assert_eq!(certificate.revoke(), Err(CertificateStateError::AlreadyRevoked));
    /// ```
    pub fn revoke(&mut self) -> Result<(), CertificateStateError> {
        match self.status {
            CertificateStatus::Revoked => Err(CertificateStateError::AlreadyRevoked),
            CertificateStatus::Active => {
                self.status = CertificateStatus::Revoked;
                Ok(())
            }
        }
    }

    pub fn id(&self) -> CertificateId {
        self.draft.id
    }

    pub fn student_id(&self) -> StudentId {
        self.draft.student_id
    }

    pub fn number(&self) -> &CertificateNumber {
        &self.draft.number
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.draft.issued_at
    }

    pub fn issued_by(&self) -> Option<UserId> {
        self.draft.issued_by
    }

    pub fn valid_until(&self) -> Option<NaiveDate> {
        self.draft.valid_until
    }

    pub fn verification_token(&self) -> &VerificationToken {
        &self.draft.verification_token
    }

    /// URL of the rendered PDF, once background rendering has stored one.
    pub fn pdf_url(&self) -> Option<&str> {
        self.pdf_url.as_deref()
    }

    pub fn status(&self) -> CertificateStatus {
        self.status
    }

    pub fn is_revoked(&self) -> bool {
        self.status == CertificateStatus::Revoked
    }

    pub fn notes(&self) -> &str {
        self.draft.notes.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Certificate joined with the names shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub certificate: Certificate,
    pub student_name: Option<String>,
    pub student_nisn: Option<String>,
    pub issued_by_name: Option<String>,
}

/// Everything needed to display or render one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDetail {
    pub summary: CertificateSummary,
    pub student: Student,
    /// Ordered newest year first, then by recording order.
    pub achievements: Vec<AchievementWithAttachments>,
}

impl CertificateDetail {
    pub fn certificate(&self) -> &Certificate {
        &self.summary.certificate
    }
}
