//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Achievement, AchievementAttachment, AchievementId, Certificate, CertificateDraft,
    CertificateId, CertificateNumber, CertificateRecord, CertificateStatus, Student, StudentId,
    UserId, VerificationToken,
};

use super::schema::{
    achievement_attachments, achievements, certificate_achievements, certificates, students,
};

// ---------------------------------------------------------------------------
// Certificate models
// ---------------------------------------------------------------------------

/// Row struct for reading from the certificates table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = certificates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CertificateRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
    pub issued_by: Option<Uuid>,
    pub valid_until: Option<NaiveDate>,
    pub verification_token: String,
    pub pdf_url: Option<String>,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl CertificateRow {
    /// Rebuild the domain certificate, validating the stored value types.
    ///
    /// The error string names the column that failed to decode.
    pub fn into_domain(self) -> Result<Certificate, String> {
        let number = CertificateNumber::parse(&self.certificate_number)
            .map_err(|err| format!("certificate_number: {err}"))?;
        let verification_token = VerificationToken::parse(&self.verification_token)
            .map_err(|err| format!("verification_token: {err}"))?;
        let status = self
            .status
            .parse::<CertificateStatus>()
            .map_err(|err| format!("status: {err}"))?;

        Ok(Certificate::restore(CertificateRecord {
            draft: CertificateDraft {
                id: CertificateId::from_uuid(self.id),
                student_id: StudentId::from_uuid(self.student_id),
                number,
                issued_at: self.issued_at,
                issued_by: self.issued_by.map(UserId::from_uuid),
                valid_until: self.valid_until,
                verification_token,
                notes: self.notes,
            },
            pdf_url: self.pdf_url,
            status,
            created_at: self.created_at,
        }))
    }
}

/// Insertable struct for creating new certificate records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = certificates)]
pub(crate) struct NewCertificateRow<'a> {
    pub id: Uuid,
    pub student_id: Uuid,
    pub certificate_number: &'a str,
    pub issued_at: DateTime<Utc>,
    pub issued_by: Option<Uuid>,
    pub valid_until: Option<NaiveDate>,
    pub verification_token: &'a str,
    pub pdf_url: Option<&'a str>,
    pub status: &'a str,
    pub notes: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Certificate> for NewCertificateRow<'a> {
    fn from(certificate: &'a Certificate) -> Self {
        Self {
            id: *certificate.id().as_uuid(),
            student_id: *certificate.student_id().as_uuid(),
            certificate_number: certificate.number().as_str(),
            issued_at: certificate.issued_at(),
            issued_by: certificate.issued_by().map(|user| *user.as_uuid()),
            valid_until: certificate.valid_until(),
            verification_token: certificate.verification_token().as_str(),
            pdf_url: certificate.pdf_url(),
            status: certificate.status().as_str(),
            notes: certificate.notes(),
            created_at: certificate.created_at(),
        }
    }
}

/// Insertable join row between a certificate and one achievement.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = certificate_achievements)]
pub(crate) struct NewCertificateAchievementRow {
    pub certificate_id: Uuid,
    pub achievement_id: Uuid,
}

// ---------------------------------------------------------------------------
// Student and achievement read models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentRow {
    pub id: Uuid,
    pub nisn: String,
    pub full_name: String,
    pub birth_place: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub class_name: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: StudentId::from_uuid(row.id),
            nisn: row.nisn,
            full_name: row.full_name,
            birth_place: row.birth_place,
            birth_date: row.birth_date,
            gender: row.gender,
            class_name: row.class_name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = achievements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AchievementRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub competition_name: String,
    pub organizer: String,
    pub category_id: Option<i32>,
    pub rank: String,
    pub level_id: Option<i32>,
    pub year: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<AchievementRow> for Achievement {
    fn from(row: AchievementRow) -> Self {
        Self {
            id: AchievementId::from_uuid(row.id),
            student_id: StudentId::from_uuid(row.student_id),
            competition_name: row.competition_name,
            organizer: row.organizer,
            category_id: row.category_id,
            rank: row.rank,
            level_id: row.level_id,
            year: row.year,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = achievement_attachments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttachmentRow {
    pub id: Uuid,
    pub achievement_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub label: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<AttachmentRow> for AchievementAttachment {
    fn from(row: AttachmentRow) -> Self {
        Self {
            id: row.id,
            achievement_id: AchievementId::from_uuid(row.achievement_id),
            file_url: row.file_url,
            file_name: row.file_name,
            file_type: row.file_type,
            label: row.label,
            uploaded_at: row.uploaded_at,
        }
    }
}
