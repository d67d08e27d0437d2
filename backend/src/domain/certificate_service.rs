//! Certificate domain service.
//!
//! Implements the certificate driving ports on top of the repository,
//! renderer and render queue ports. Issuance stores the record first and
//! hands PDF rendering to the background runner; the caller never waits for
//! or sees rendering failures. Downloads render synchronously.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AchievementRepository, AchievementRepositoryError, CertificateCommand, CertificateListFilter,
    CertificateListing, CertificateQuery, CertificateRenderer, CertificateRepository,
    CertificateRepositoryError, CertificateVerification, IssueCertificateRequest,
    ListCertificatesRequest, PageRequest, RenderJob, RenderJobQueue, RenderReason,
    RenderedCertificate, RevokeCertificateRequest, StudentRepository, StudentRepositoryError,
    VerificationOutcome,
};
use crate::domain::{
    Achievement, AchievementId, AchievementView, AchievementWithAttachments, Certificate,
    CertificateDetail, CertificateDocument, CertificateDraft, CertificateId, CertificateNumber,
    CertificateSummary, DocumentSettings, Error, OfficeCode, Student, VerificationToken,
    order_for_certificate,
};

/// Issuance attempts before a uniqueness collision is reported as a conflict.
const ISSUE_ATTEMPTS: u32 = 2;

fn map_certificate_error(error: CertificateRepositoryError) -> Error {
    match error {
        CertificateRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("certificate repository unavailable: {message}"))
        }
        CertificateRepositoryError::Query { message } => {
            Error::internal(format!("certificate repository error: {message}"))
        }
        CertificateRepositoryError::DuplicateNumber { number } => {
            Error::conflict(format!("certificate number {number} is already taken"))
        }
        CertificateRepositoryError::DuplicateToken => {
            Error::conflict("verification token collided with an existing certificate")
        }
        CertificateRepositoryError::ReferenceViolation { message } => {
            Error::not_found(format!("referenced record no longer exists: {message}"))
        }
    }
}

fn map_student_error(error: StudentRepositoryError) -> Error {
    match error {
        StudentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("student repository unavailable: {message}"))
        }
        StudentRepositoryError::Query { message } => {
            Error::internal(format!("student repository error: {message}"))
        }
    }
}

fn map_achievement_error(error: AchievementRepositoryError) -> Error {
    match error {
        AchievementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("achievement repository unavailable: {message}"))
        }
        AchievementRepositoryError::Query { message } => {
            Error::internal(format!("achievement repository error: {message}"))
        }
    }
}

fn certificate_not_found(id: &CertificateId) -> Error {
    Error::not_found(format!("certificate {id} not found"))
}

/// Reject empty selections and repeated ids.
fn validate_selection(ids: &[AchievementId]) -> Result<(), Error> {
    if ids.is_empty() {
        return Err(Error::invalid_request("at least one achievement must be selected")
            .with_details(json!({ "field": "achievement_ids", "code": "empty" })));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    let duplicates: Vec<String> = ids
        .iter()
        .filter(|id| !seen.insert(**id))
        .map(ToString::to_string)
        .collect();
    if !duplicates.is_empty() {
        return Err(Error::invalid_request("achievement_ids must not repeat")
            .with_details(json!({
                "field": "achievement_ids",
                "code": "duplicate",
                "achievement_ids": duplicates,
            })));
    }
    Ok(())
}

/// Detail assembled from the data checked during issuance, without the
/// joined display names.
fn detail_from_selection(
    certificate: Certificate,
    student: Student,
    achievements: Vec<Achievement>,
) -> CertificateDetail {
    let summary = CertificateSummary {
        certificate,
        student_name: Some(student.full_name.clone()),
        student_nisn: Some(student.nisn.clone()),
        issued_by_name: None,
    };
    let achievements = achievements
        .into_iter()
        .map(|achievement| AchievementWithAttachments {
            view: AchievementView {
                achievement,
                category_name: None,
                level_name: None,
            },
            attachments: Vec::new(),
        })
        .collect();
    ordered(CertificateDetail {
        summary,
        student,
        achievements,
    })
}

fn ordered(mut detail: CertificateDetail) -> CertificateDetail {
    order_for_certificate(&mut detail.achievements, |item| &item.view.achievement);
    detail
}

/// Repositories and collaborators used by [`CertificateService`].
#[derive(Clone)]
pub struct CertificateServicePorts {
    pub certificates: Arc<dyn CertificateRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub renderer: Arc<dyn CertificateRenderer>,
    pub render_jobs: Arc<dyn RenderJobQueue>,
}

/// Certificate service implementing the command, query and verification
/// driving ports.
#[derive(Clone)]
pub struct CertificateService {
    ports: CertificateServicePorts,
    documents: Arc<DocumentSettings>,
    office: OfficeCode,
    clock: Arc<dyn Clock>,
}

impl CertificateService {
    /// Create a service over the supplied ports.
    pub fn new(
        ports: CertificateServicePorts,
        documents: Arc<DocumentSettings>,
        office: OfficeCode,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ports,
            documents,
            office,
            clock,
        }
    }

    async fn load_detail(&self, id: &CertificateId) -> Result<CertificateDetail, Error> {
        self.ports
            .certificates
            .find_detail(id)
            .await
            .map_err(map_certificate_error)?
            .map(ordered)
            .ok_or_else(|| certificate_not_found(id))
    }

    /// Validate the selection and return the student and achievements it
    /// names.
    async fn check_selection(
        &self,
        request: &IssueCertificateRequest,
    ) -> Result<(Student, Vec<Achievement>), Error> {
        validate_selection(&request.achievement_ids)?;

        let student = self
            .ports
            .students
            .find_by_id(&request.student_id)
            .await
            .map_err(map_student_error)?
            .ok_or_else(|| Error::not_found(format!("student {} not found", request.student_id)))?;

        let found = self
            .ports
            .achievements
            .find_by_ids(&request.achievement_ids)
            .await
            .map_err(map_achievement_error)?;

        let found_ids: HashSet<AchievementId> = found.iter().map(|item| item.id).collect();
        let missing: Vec<String> = request
            .achievement_ids
            .iter()
            .filter(|id| !found_ids.contains(*id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(Error::not_found("one or more achievements do not exist")
                .with_details(json!({ "achievement_ids": missing })));
        }

        let foreign: Vec<String> = found
            .iter()
            .filter(|item| !item.belongs_to(&request.student_id))
            .map(|item| item.id.to_string())
            .collect();
        if !foreign.is_empty() {
            return Err(
                Error::invalid_request("achievements must belong to the certificate's student")
                    .with_details(json!({
                        "field": "achievement_ids",
                        "code": "foreign_achievement",
                        "achievement_ids": foreign,
                    })),
            );
        }
        Ok((student, found))
    }

    /// Allocate a number and token and store the certificate, retrying once
    /// when a concurrent issuance took the same number or token.
    async fn store_certificate(
        &self,
        request: &IssueCertificateRequest,
    ) -> Result<Certificate, Error> {
        let issued_at = self.clock.utc();
        if request
            .valid_until
            .is_some_and(|valid_until| valid_until < issued_at.date_naive())
        {
            return Err(
                Error::invalid_request("valid_until must not be before the issue date")
                    .with_details(json!({ "field": "valid_until", "code": "before_issue_date" })),
            );
        }
        let year = issued_at.year();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let issued_in_year = self
                .ports
                .certificates
                .count_issued_in_year(year)
                .await
                .map_err(map_certificate_error)?;
            let certificate = Certificate::issue(CertificateDraft {
                id: CertificateId::random(),
                student_id: request.student_id,
                number: CertificateNumber::next_in_year(&self.office, year, issued_in_year),
                issued_at,
                issued_by: Some(request.issued_by),
                valid_until: request.valid_until,
                verification_token: VerificationToken::generate(),
                notes: request.notes.clone(),
            });

            match self
                .ports
                .certificates
                .create(&certificate, &request.achievement_ids)
                .await
            {
                Ok(()) => return Ok(certificate),
                Err(err) if err.is_uniqueness_violation() && attempt < ISSUE_ATTEMPTS => {
                    warn!(attempt, error = %err, "certificate issuance collided; retrying");
                }
                Err(err) if err.is_uniqueness_violation() => {
                    return Err(Error::conflict(
                        "certificate issuance collided with a concurrent issuance; try again",
                    )
                    .with_details(json!({ "reason": err.to_string() })));
                }
                Err(err) => return Err(map_certificate_error(err)),
            }
        }
    }

    fn queue_render(&self, certificate_id: CertificateId, reason: RenderReason) {
        if let Err(err) = self
            .ports
            .render_jobs
            .submit(RenderJob::new(certificate_id, reason))
        {
            warn!(%certificate_id, error = %err, "certificate render job was not queued");
        }
    }
}

#[async_trait]
impl CertificateCommand for CertificateService {
    async fn issue(&self, request: IssueCertificateRequest) -> Result<CertificateDetail, Error> {
        let (student, achievements) = self.check_selection(&request).await?;
        let certificate = self.store_certificate(&request).await?;
        let id = certificate.id();
        info!(
            certificate_id = %id,
            number = %certificate.number(),
            student_id = %request.student_id,
            issued_by = %request.issued_by,
            achievements = request.achievement_ids.len(),
            "certificate issued"
        );

        self.queue_render(id, RenderReason::Issued);

        // The record is committed; a failed re-read must not invite a retry
        // that would issue a second certificate.
        match self.load_detail(&id).await {
            Ok(detail) => Ok(detail),
            Err(err) => {
                warn!(
                    certificate_id = %id,
                    error = %err,
                    "issued certificate could not be re-read; answering from the request"
                );
                Ok(detail_from_selection(certificate, student, achievements))
            }
        }
    }

    async fn revoke(&self, request: RevokeCertificateRequest) -> Result<(), Error> {
        let id = request.certificate_id;
        let summary = self
            .ports
            .certificates
            .find_by_id(&id)
            .await
            .map_err(map_certificate_error)?
            .ok_or_else(|| certificate_not_found(&id))?;

        let mut certificate = summary.certificate;
        certificate
            .revoke()
            .map_err(|err| Error::conflict(err.to_string()))?;

        let revoked = self
            .ports
            .certificates
            .revoke(&id)
            .await
            .map_err(map_certificate_error)?;
        if !revoked {
            return Err(Error::conflict("certificate has already been revoked"));
        }

        info!(certificate_id = %id, revoked_by = %request.revoked_by, "certificate revoked");
        Ok(())
    }
}

#[async_trait]
impl CertificateQuery for CertificateService {
    async fn get_certificate(&self, id: &CertificateId) -> Result<CertificateDetail, Error> {
        self.load_detail(id).await
    }

    async fn list_certificates(
        &self,
        request: ListCertificatesRequest,
    ) -> Result<CertificateListing, Error> {
        let page = PageRequest::new(request.page, request.per_page);
        let filter = CertificateListFilter {
            student_id: request.student_id,
            status: request.status,
            page,
        };
        let result = self
            .ports
            .certificates
            .list(&filter)
            .await
            .map_err(map_certificate_error)?;

        Ok(CertificateListing {
            items: result.items,
            page: page.page(),
            per_page: page.per_page(),
            total_items: result.total,
            total_pages: page.total_pages(result.total),
        })
    }

    async fn download_certificate(&self, id: &CertificateId) -> Result<RenderedCertificate, Error> {
        let detail = self.load_detail(id).await?;
        let document = CertificateDocument::assemble(&detail, &self.documents);
        let file_name = document.file_name.clone();

        let renderer = Arc::clone(&self.ports.renderer);
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|err| Error::internal(format!("certificate render task failed: {err}")))?
            .map_err(|err| Error::internal(format!("certificate render failed: {err}")))?;

        if detail.certificate().pdf_url().is_none() {
            self.queue_render(*id, RenderReason::Backfill);
        }

        Ok(RenderedCertificate { file_name, bytes })
    }
}

#[async_trait]
impl CertificateVerification for CertificateService {
    async fn verify(&self, token: &str) -> Result<VerificationOutcome, Error> {
        let Ok(token) = VerificationToken::parse(token) else {
            return Ok(VerificationOutcome::NotFound);
        };

        let Some(summary) = self
            .ports
            .certificates
            .find_by_token(&token)
            .await
            .map_err(map_certificate_error)?
        else {
            return Ok(VerificationOutcome::NotFound);
        };

        if summary.certificate.is_revoked() {
            return Ok(VerificationOutcome::Revoked {
                certificate: summary,
            });
        }

        let detail = self.load_detail(&summary.certificate.id()).await?;
        if detail.summary.certificate.is_revoked() {
            return Ok(VerificationOutcome::Revoked {
                certificate: detail.summary,
            });
        }
        Ok(VerificationOutcome::Valid {
            certificate: detail.summary,
            student: detail.student,
            achievements: detail
                .achievements
                .into_iter()
                .map(|item| item.view)
                .collect(),
        })
    }
}

#[cfg(test)]
#[path = "certificate_service_tests.rs"]
mod tests;
