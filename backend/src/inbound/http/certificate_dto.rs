//! Certificate DTOs shared by the authenticated and public handlers.
//!
//! Field names are snake_case on the wire. Timestamps are RFC 3339 strings
//! and calendar dates use `YYYY-MM-DD`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CertificateListing, IssueCertificateRequest, VerificationOutcome};
use crate::domain::{
    AchievementAttachment, AchievementId, AchievementView, AchievementWithAttachments,
    CertificateDetail, CertificateSummary, Error, Student, StudentId, UserId,
};
use crate::inbound::http::validation::{
    FieldName, parse_optional_date, parse_required_uuid, parse_uuid_list,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Request payload for `POST /api/v1/certificates`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct IssueCertificateBody {
    #[schema(format = "uuid")]
    pub student_id: Option<String>,
    /// Achievements to list on the certificate; must belong to the student.
    #[schema(value_type = Vec<uuid::Uuid>)]
    #[serde(default)]
    pub achievement_ids: Vec<String>,
    /// Optional expiry date, `YYYY-MM-DD`.
    #[schema(format = "date")]
    pub valid_until: Option<String>,
    pub notes: Option<String>,
}

impl IssueCertificateBody {
    /// Validate the payload and attach the issuing user.
    pub(crate) fn into_request(self, issued_by: UserId) -> Result<IssueCertificateRequest, Error> {
        let student_id = parse_required_uuid(self.student_id, FieldName::new("student_id"))?;
        let achievement_ids =
            parse_uuid_list(self.achievement_ids, FieldName::new("achievement_ids"))?;
        let valid_until = parse_optional_date(self.valid_until, FieldName::new("valid_until"))?;

        Ok(IssueCertificateRequest {
            student_id: StudentId::from_uuid(student_id),
            achievement_ids: achievement_ids
                .into_iter()
                .map(AchievementId::from_uuid)
                .collect(),
            valid_until,
            notes: self.notes.unwrap_or_default().trim().to_owned(),
            issued_by,
        })
    }
}

/// Certificate metadata with the joined display names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub student_id: String,
    #[schema(example = "421.2/SKP/2024/0001")]
    pub certificate_number: String,
    #[schema(format = "date-time")]
    pub issued_at: String,
    #[schema(format = "uuid")]
    pub issued_by: Option<String>,
    #[schema(format = "date")]
    pub valid_until: Option<String>,
    pub verification_token: String,
    pub pdf_url: Option<String>,
    #[schema(example = "active")]
    pub status: String,
    pub notes: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_nisn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_by_name: Option<String>,
}

impl From<CertificateSummary> for CertificateResponse {
    fn from(summary: CertificateSummary) -> Self {
        let CertificateSummary {
            certificate,
            student_name,
            student_nisn,
            issued_by_name,
        } = summary;
        Self {
            id: certificate.id().to_string(),
            student_id: certificate.student_id().to_string(),
            certificate_number: certificate.number().as_str().to_owned(),
            issued_at: certificate.issued_at().to_rfc3339(),
            issued_by: certificate.issued_by().map(|user| user.to_string()),
            valid_until: certificate
                .valid_until()
                .map(|date| date.format(DATE_FORMAT).to_string()),
            verification_token: certificate.verification_token().as_str().to_owned(),
            pdf_url: certificate.pdf_url().map(str::to_owned),
            status: certificate.status().as_str().to_owned(),
            notes: certificate.notes().to_owned(),
            created_at: certificate.created_at().to_rfc3339(),
            student_name,
            student_nisn,
            issued_by_name,
        }
    }
}

/// Student block shown alongside a certificate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub nisn: String,
    pub full_name: String,
    pub birth_place: String,
    #[schema(format = "date")]
    pub birth_date: Option<String>,
    pub gender: String,
    pub class_name: String,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.to_string(),
            nisn: student.nisn,
            full_name: student.full_name,
            birth_place: student.birth_place,
            birth_date: student
                .birth_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            gender: student.gender,
            class_name: student.class_name,
        }
    }
}

/// File evidence attached to an achievement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub label: String,
    #[schema(format = "date-time")]
    pub uploaded_at: String,
}

impl From<AchievementAttachment> for AttachmentResponse {
    fn from(attachment: AchievementAttachment) -> Self {
        Self {
            id: attachment.id.to_string(),
            file_url: attachment.file_url,
            file_name: attachment.file_name,
            file_type: attachment.file_type,
            label: attachment.label,
            uploaded_at: attachment.uploaded_at.to_rfc3339(),
        }
    }
}

/// Achievement with its category and level names.
///
/// `attachments` is present on the authenticated detail view and omitted
/// from public verification responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AchievementResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub competition_name: String,
    pub organizer: String,
    pub rank: String,
    pub year: i32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentResponse>>,
}

impl From<AchievementView> for AchievementResponse {
    fn from(view: AchievementView) -> Self {
        let AchievementView {
            achievement,
            category_name,
            level_name,
        } = view;
        Self {
            id: achievement.id.to_string(),
            competition_name: achievement.competition_name,
            organizer: achievement.organizer,
            rank: achievement.rank,
            year: achievement.year,
            description: achievement.description,
            category_name,
            level_name,
            attachments: None,
        }
    }
}

impl From<AchievementWithAttachments> for AchievementResponse {
    fn from(item: AchievementWithAttachments) -> Self {
        let attachments = item
            .attachments
            .into_iter()
            .map(AttachmentResponse::from)
            .collect();
        Self {
            attachments: Some(attachments),
            ..Self::from(item.view)
        }
    }
}

/// Certificate with its student and listed achievements.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateDetailResponse {
    pub certificate: CertificateResponse,
    pub student: StudentResponse,
    pub achievements: Vec<AchievementResponse>,
}

impl From<CertificateDetail> for CertificateDetailResponse {
    fn from(detail: CertificateDetail) -> Self {
        Self {
            certificate: CertificateResponse::from(detail.summary),
            student: StudentResponse::from(detail.student),
            achievements: detail
                .achievements
                .into_iter()
                .map(AchievementResponse::from)
                .collect(),
        }
    }
}

/// Query string accepted by `GET /api/v1/certificates`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ListCertificatesQuery {
    /// Only certificates for this student.
    pub student_id: Option<String>,
    /// `active` or `revoked`.
    pub status: Option<String>,
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size; defaults to 10 and is capped at 100.
    pub per_page: Option<u32>,
}

/// One page of certificates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateListResponse {
    pub items: Vec<CertificateResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl From<CertificateListing> for CertificateListResponse {
    fn from(listing: CertificateListing) -> Self {
        Self {
            items: listing
                .items
                .into_iter()
                .map(CertificateResponse::from)
                .collect(),
            page: listing.page,
            per_page: listing.per_page,
            total_items: listing.total_items,
            total_pages: listing.total_pages,
        }
    }
}

/// Public verification result. Absent fields are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<AchievementResponse>>,
    pub message: String,
}

impl From<VerificationOutcome> for VerificationResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        let is_valid = outcome.is_valid();
        let message = outcome.message().to_owned();
        match outcome {
            VerificationOutcome::NotFound => Self {
                is_valid,
                certificate: None,
                student: None,
                achievements: None,
                message,
            },
            VerificationOutcome::Revoked { certificate } => Self {
                is_valid,
                certificate: Some(CertificateResponse::from(certificate)),
                student: None,
                achievements: None,
                message,
            },
            VerificationOutcome::Valid {
                certificate,
                student,
                achievements,
            } => Self {
                is_valid,
                certificate: Some(CertificateResponse::from(certificate)),
                student: Some(StudentResponse::from(student)),
                achievements: Some(
                    achievements
                        .into_iter()
                        .map(AchievementResponse::from)
                        .collect(),
                ),
                message,
            },
        }
    }
}
