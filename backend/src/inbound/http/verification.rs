//! Public certificate verification.
//!
//! ```text
//! GET /api/v1/verify/{token}
//! ```
//!
//! The QR code printed on every certificate points here. No session is
//! required. Valid certificates answer `200`; unknown or revoked tokens
//! answer `422` with the same body shape so scanners can show the message.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::info;

use crate::inbound::http::ApiResult;
use crate::inbound::http::certificate_dto::VerificationResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPath {
    token: String,
}

/// Verify a certificate by its public token.
#[utoipa::path(
    get,
    path = "/api/v1/verify/{token}",
    params(("token" = String, Path, description = "Verification token from the QR code")),
    responses(
        (status = 200, description = "Certificate is valid", body = VerificationResponse),
        (status = 422, description = "Certificate not found or revoked", body = VerificationResponse),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["verification"],
    operation_id = "verifyCertificate",
    security([])
)]
#[get("/verify/{token}")]
pub async fn verify_certificate(
    state: web::Data<HttpState>,
    path: web::Path<TokenPath>,
) -> ApiResult<HttpResponse> {
    let outcome = state.verification.verify(&path.token).await?;
    let valid = outcome.is_valid();
    info!(valid, "certificate verification requested");

    let body = VerificationResponse::from(outcome);
    let response = if valid {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::UnprocessableEntity().json(body)
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::Error;
    use crate::domain::ports::{
        MockCertificateCommand, MockCertificateQuery, MockCertificateVerification,
        NOT_FOUND_MESSAGE, REVOKED_MESSAGE, VALID_MESSAGE, VerificationOutcome,
    };
    use crate::domain::{AchievementView, CertificateSummary};
    use crate::test_support::{
        SAMPLE_TOKEN, sample_achievement, sample_certificate, sample_student, sample_summary,
    };

    fn summary() -> CertificateSummary {
        let student = sample_student();
        sample_summary(sample_certificate(student.id), &student)
    }

    fn valid_outcome() -> VerificationOutcome {
        let student = sample_student();
        let certificate = sample_summary(sample_certificate(student.id), &student);
        let achievements = [2023, 2024]
            .into_iter()
            .rev()
            .map(|year| AchievementView {
                achievement: sample_achievement(student.id, "Lomba Debat", year),
                category_name: Some("Non-Akademik".to_owned()),
                level_name: None,
            })
            .collect();
        VerificationOutcome::Valid {
            certificate,
            student,
            achievements,
        }
    }

    async fn verify(
        result: Result<VerificationOutcome, Error>,
    ) -> actix_web::dev::ServiceResponse {
        let mut verification = MockCertificateVerification::new();
        verification
            .expect_verify()
            .withf(|token| token == SAMPLE_TOKEN)
            .times(1)
            .return_once(move |_| result);
        let state = HttpState::new(
            Arc::new(MockCertificateCommand::new()),
            Arc::new(MockCertificateQuery::new()),
            Arc::new(verification),
        );
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(verify_certificate)),
        )
        .await;
        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/verify/{SAMPLE_TOKEN}"))
            .to_request();
        actix_test::call_service(&app, request).await
    }

    #[rstest]
    #[actix_web::test]
    async fn active_certificate_is_valid_with_full_record() {
        let response = verify(Ok(valid_outcome())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["message"], VALID_MESSAGE);
        assert_eq!(body["student"]["nisn"], "1234567890");
        let years: Vec<i64> = body["achievements"]
            .as_array()
            .expect("achievements array")
            .iter()
            .filter_map(|item| item["year"].as_i64())
            .collect();
        assert_eq!(years, vec![2024, 2023]);
        assert!(body["achievements"][0].get("attachments").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn revoked_certificate_is_unprocessable_with_metadata_only() {
        let mut certificate = summary();
        certificate.certificate.revoke().expect("active certificate");

        let response = verify(Ok(VerificationOutcome::Revoked { certificate })).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["is_valid"], false);
        assert_eq!(body["message"], REVOKED_MESSAGE);
        assert_eq!(body["certificate"]["status"], "revoked");
        assert!(body.get("student").is_none());
        assert!(body.get("achievements").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_token_discloses_nothing() {
        let response = verify(Ok(VerificationOutcome::NotFound)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["is_valid"], false);
        assert_eq!(body["message"], NOT_FOUND_MESSAGE);
        assert!(body.get("certificate").is_none());
        assert!(body.get("student").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn lookup_failures_surface_as_errors() {
        let response = verify(Err(Error::service_unavailable("database down"))).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "service_unavailable");
    }
}
