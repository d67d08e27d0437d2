//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: certificate management, public verification and health probes
//! - **Schemas**: request and response DTOs plus the error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that keep domain types free of
//!   utoipa derives
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::certificate_dto::{
    AchievementResponse, AttachmentResponse, CertificateDetailResponse, CertificateListResponse,
    CertificateResponse, IssueCertificateBody, StudentResponse, VerificationResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie carrying the signed-in staff member's user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Achievement ledger API",
        description = "Issue, list, download and revoke student achievement certificates, and verify them publicly."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::certificates::issue_certificate,
        crate::inbound::http::certificates::list_certificates,
        crate::inbound::http::certificates::get_certificate,
        crate::inbound::http::certificates::download_certificate,
        crate::inbound::http::certificates::revoke_certificate,
        crate::inbound::http::verification::verify_certificate,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        IssueCertificateBody,
        CertificateResponse,
        StudentResponse,
        AttachmentResponse,
        AchievementResponse,
        CertificateDetailResponse,
        CertificateListResponse,
        VerificationResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "certificates", description = "Certificate issuance and management for staff"),
        (name = "verification", description = "Public certificate verification"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
