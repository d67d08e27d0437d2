//! Certificate HTTP handlers for authenticated staff.
//!
//! ```text
//! POST /api/v1/certificates {"student_id":"…","achievement_ids":["…"]}
//! GET  /api/v1/certificates?student_id=…&status=active&page=1&per_page=10
//! GET  /api/v1/certificates/{id}
//! GET  /api/v1/certificates/{id}/download
//! POST /api/v1/certificates/{id}/revoke
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::ports::{ListCertificatesRequest, RevokeCertificateRequest};
use crate::domain::{CertificateId, Error, StudentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::certificate_dto::{
    CertificateDetailResponse, CertificateListResponse, IssueCertificateBody,
    ListCertificatesQuery,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_status, parse_optional_uuid, parse_uuid,
};

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Deserialize)]
pub(crate) struct CertificatePath {
    id: String,
}

fn parse_certificate_id(path: CertificatePath) -> Result<CertificateId, Error> {
    parse_uuid(path.id, FieldName::new("id")).map(CertificateId::from_uuid)
}

fn parse_list_query(query: ListCertificatesQuery) -> Result<ListCertificatesRequest, Error> {
    Ok(ListCertificatesRequest {
        student_id: parse_optional_uuid(query.student_id, FieldName::new("student_id"))?
            .map(StudentId::from_uuid),
        status: parse_optional_status(query.status, FieldName::new("status"))?,
        page: query.page,
        per_page: query.per_page,
    })
}

/// Issue a certificate for a student's selected achievements.
///
/// The record is stored immediately; the PDF is rendered and uploaded in the
/// background, so `pdf_url` is usually empty in this response.
#[utoipa::path(
    post,
    path = "/api/v1/certificates",
    request_body = IssueCertificateBody,
    responses(
        (status = 201, description = "Certificate issued", body = CertificateDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Student or achievement not found", body = ErrorSchema),
        (status = 409, description = "Certificate number collision", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["certificates"],
    operation_id = "issueCertificate",
    security(("SessionCookie" = []))
)]
#[post("/certificates")]
pub async fn issue_certificate(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<IssueCertificateBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = payload.into_inner().into_request(user_id)?;

    let detail = state.certificates.issue(request).await?;
    info!(
        certificate_id = %detail.certificate().id(),
        number = %detail.certificate().number(),
        "certificate issued over http"
    );

    Ok(HttpResponse::Created().json(CertificateDetailResponse::from(detail)))
}

/// List certificates, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/certificates",
    params(
        ("student_id" = Option<String>, Query, description = "Only certificates for this student"),
        ("status" = Option<String>, Query, description = "active or revoked"),
        ("page" = Option<u32>, Query, description = "1-based page number, default 1"),
        ("per_page" = Option<u32>, Query, description = "Page size, default 10, at most 100")
    ),
    responses(
        (status = 200, description = "Certificates", body = CertificateListResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["certificates"],
    operation_id = "listCertificates",
    security(("SessionCookie" = []))
)]
#[get("/certificates")]
pub async fn list_certificates(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListCertificatesQuery>,
) -> ApiResult<web::Json<CertificateListResponse>> {
    session.require_user_id()?;
    let request = parse_list_query(query.into_inner())?;

    let listing = state.certificates_query.list_certificates(request).await?;
    Ok(web::Json(CertificateListResponse::from(listing)))
}

/// Fetch one certificate with its student and achievements.
#[utoipa::path(
    get,
    path = "/api/v1/certificates/{id}",
    params(("id" = String, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "Certificate detail", body = CertificateDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["certificates"],
    operation_id = "getCertificate",
    security(("SessionCookie" = []))
)]
#[get("/certificates/{id}")]
pub async fn get_certificate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CertificatePath>,
) -> ApiResult<web::Json<CertificateDetailResponse>> {
    session.require_user_id()?;
    let id = parse_certificate_id(path.into_inner())?;

    let detail = state.certificates_query.get_certificate(&id).await?;
    Ok(web::Json(CertificateDetailResponse::from(detail)))
}

/// Render the certificate PDF and return it as an attachment.
#[utoipa::path(
    get,
    path = "/api/v1/certificates/{id}/download",
    params(("id" = String, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "Certificate PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Rendering failed", body = ErrorSchema)
    ),
    tags = ["certificates"],
    operation_id = "downloadCertificate",
    security(("SessionCookie" = []))
)]
#[get("/certificates/{id}/download")]
pub async fn download_certificate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CertificatePath>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = parse_certificate_id(path.into_inner())?;

    let rendered = state.certificates_query.download_certificate(&id).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(rendered.file_name)],
    };

    Ok(HttpResponse::Ok()
        .content_type(PDF_CONTENT_TYPE)
        .insert_header(disposition)
        .body(rendered.bytes))
}

/// Revoke an active certificate. Revocation cannot be undone.
#[utoipa::path(
    post,
    path = "/api/v1/certificates/{id}/revoke",
    params(("id" = String, Path, description = "Certificate id")),
    responses(
        (status = 204, description = "Certificate revoked"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already revoked", body = ErrorSchema)
    ),
    tags = ["certificates"],
    operation_id = "revokeCertificate",
    security(("SessionCookie" = []))
)]
#[post("/certificates/{id}/revoke")]
pub async fn revoke_certificate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CertificatePath>,
) -> ApiResult<HttpResponse> {
    let revoked_by = session.require_user_id()?;
    let certificate_id = parse_certificate_id(path.into_inner())?;

    state
        .certificates
        .revoke(RevokeCertificateRequest {
            certificate_id,
            revoked_by,
        })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "certificates_tests.rs"]
mod tests;
