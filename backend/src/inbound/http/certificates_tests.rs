//! Tests for the certificate HTTP handlers.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::UserId;
use crate::domain::ports::{
    CertificateListing, MockCertificateCommand, MockCertificateQuery,
    MockCertificateVerification, RenderedCertificate,
};
use crate::domain::{CertificateDetail, CertificateStatus};
use crate::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::inbound::http::test_utils::{
    SEED_SESSION_PATH, seed_session_route, session_cookie_for, test_session_middleware,
};
use crate::test_support::{
    sample_achievement, sample_certificate, sample_detail, sample_student, sample_summary,
};

const STAFF_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const ACHIEVEMENT_ID: &str = "0b9f3c58-2c8e-4d9b-a5c4-6f1d2f1a9e01";

fn staff() -> UserId {
    UserId::new(STAFF_ID).expect("fixture user id")
}

fn detail() -> CertificateDetail {
    let student = sample_student();
    let achievement = sample_achievement(student.id, "Olimpiade Matematika", 2024);
    sample_detail(sample_certificate(student.id), student, vec![achievement])
}

fn test_app(
    command: MockCertificateCommand,
    query: MockCertificateQuery,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(command),
        Arc::new(query),
        Arc::new(MockCertificateVerification::new()),
    );
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(test_session_middleware())
        .route(SEED_SESSION_PATH, seed_session_route())
        .service(
            web::scope("/api/v1")
                .service(issue_certificate)
                .service(list_certificates)
                .service(download_certificate)
                .service(get_certificate)
                .service(revoke_certificate),
        )
}

fn issue_payload() -> Value {
    json!({
        "student_id": "9b2f6a3e-1c4d-4e5f-8a7b-6c5d4e3f2a1b",
        "achievement_ids": [ACHIEVEMENT_ID],
        "valid_until": "2026-12-31",
        "notes": "  Untuk beasiswa  "
    })
}

#[actix_web::test]
async fn issue_returns_created_detail_and_attributes_issuer() {
    let mut command = MockCertificateCommand::new();
    let issued = detail();
    command
        .expect_issue()
        .withf(|request| {
            request.issued_by == staff()
                && request.notes == "Untuk beasiswa"
                && request.achievement_ids.len() == 1
                && request.achievement_ids[0].to_string() == ACHIEVEMENT_ID
                && request.valid_until.map(|date| date.to_string()).as_deref()
                    == Some("2026-12-31")
        })
        .times(1)
        .return_once(move |_| Ok(issued));
    let app = actix_test::init_service(test_app(command, MockCertificateQuery::new())).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/certificates")
            .cookie(cookie)
            .set_json(issue_payload())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["certificate"]["certificate_number"], "421.2/SKP/2024/0001");
    assert_eq!(body["certificate"]["status"], "active");
    assert_eq!(body["student"]["nisn"], "1234567890");
    assert_eq!(body["achievements"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[case::bad_student(json!({"student_id": "nope", "achievement_ids": [ACHIEVEMENT_ID]}), "student_id", "invalid_uuid")]
#[case::missing_student(json!({"achievement_ids": [ACHIEVEMENT_ID]}), "student_id", "missing_field")]
#[case::bad_achievement(json!({"student_id": STAFF_ID, "achievement_ids": ["x"]}), "achievement_ids", "invalid_uuid")]
#[case::bad_date(json!({"student_id": STAFF_ID, "achievement_ids": [ACHIEVEMENT_ID], "valid_until": "31-12-2026"}), "valid_until", "invalid_date")]
#[actix_web::test]
async fn issue_rejects_malformed_payloads(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut command = MockCertificateCommand::new();
    command.expect_issue().never();
    let app = actix_test::init_service(test_app(command, MockCertificateQuery::new())).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/certificates")
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn issue_maps_domain_conflicts() {
    let mut command = MockCertificateCommand::new();
    command
        .expect_issue()
        .return_once(|_| Err(Error::conflict("certificate number 421.2/SKP/2024/0001 is already taken")));
    let app = actix_test::init_service(test_app(command, MockCertificateQuery::new())).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/certificates")
            .cookie(cookie)
            .set_json(issue_payload())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[rstest]
#[case::issue(actix_test::TestRequest::post().uri("/api/v1/certificates").set_json(issue_payload()))]
#[case::list(actix_test::TestRequest::get().uri("/api/v1/certificates"))]
#[case::detail(actix_test::TestRequest::get().uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}")))]
#[case::download(actix_test::TestRequest::get().uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}/download")))]
#[case::revoke(actix_test::TestRequest::post().uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}/revoke")))]
#[actix_web::test]
async fn certificate_routes_require_a_session(#[case] request: actix_test::TestRequest) {
    let app = actix_test::init_service(test_app(
        MockCertificateCommand::new(),
        MockCertificateQuery::new(),
    ))
    .await;

    let response = actix_test::call_service(&app, request.to_request()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn list_forwards_filters_and_paging() {
    let student = sample_student();
    let student_id = student.id;
    let mut query = MockCertificateQuery::new();
    let item = sample_summary(sample_certificate(student.id), &student);
    query
        .expect_list_certificates()
        .withf(move |request| {
            request.student_id == Some(student_id)
                && request.status == Some(CertificateStatus::Active)
                && request.page == Some(2)
                && request.per_page == Some(5)
        })
        .times(1)
        .return_once(move |_| {
            Ok(CertificateListing {
                items: vec![item],
                page: 2,
                per_page: 5,
                total_items: 6,
                total_pages: 2,
            })
        });
    let app = actix_test::init_service(test_app(MockCertificateCommand::new(), query)).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!(
                "/api/v1/certificates?student_id={student_id}&status=active&page=2&per_page=5"
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total_items"], 6);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["items"][0]["student_nisn"], "1234567890");
}

#[rstest]
#[case::status("status=expired")]
#[case::student("student_id=abc")]
#[case::page("page=-1")]
#[actix_web::test]
async fn list_rejects_invalid_filters(#[case] query_string: &str) {
    let mut query = MockCertificateQuery::new();
    query.expect_list_certificates().never();
    let app = actix_test::init_service(test_app(MockCertificateCommand::new(), query)).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/certificates?{query_string}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn get_returns_not_found_from_domain() {
    let mut query = MockCertificateQuery::new();
    query
        .expect_get_certificate()
        .return_once(|id| Err(Error::not_found(format!("certificate {id} not found"))));
    let app = actix_test::init_service(test_app(MockCertificateCommand::new(), query)).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn get_rejects_malformed_ids() {
    let mut query = MockCertificateQuery::new();
    query.expect_get_certificate().never();
    let app = actix_test::init_service(test_app(MockCertificateCommand::new(), query)).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/certificates/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "id");
}

#[actix_web::test]
async fn download_streams_pdf_attachment() {
    let mut query = MockCertificateQuery::new();
    query
        .expect_download_certificate()
        .times(1)
        .return_once(|_| {
            Ok(RenderedCertificate {
                file_name: "SKP-421.2-SKP-2024-0001.pdf".to_owned(),
                bytes: b"%PDF-1.3 fixture".to_vec(),
            })
        });
    let app = actix_test::init_service(test_app(MockCertificateCommand::new(), query)).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}/download"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let header_value = |name| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(
        header_value(header::CONTENT_TYPE).as_deref(),
        Some("application/pdf")
    );
    let disposition = header_value(header::CONTENT_DISPOSITION).expect("disposition header");
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("SKP-421.2-SKP-2024-0001.pdf"));
    let body = actix_test::read_body(response).await;
    assert!(body.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn revoke_passes_actor_and_returns_no_content() {
    let mut command = MockCertificateCommand::new();
    command
        .expect_revoke()
        .withf(|request| {
            request.revoked_by == staff() && request.certificate_id.to_string() == ACHIEVEMENT_ID
        })
        .times(1)
        .return_once(|_| Ok(()));
    let app = actix_test::init_service(test_app(command, MockCertificateQuery::new())).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}/revoke"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn revoking_twice_is_a_conflict() {
    let mut command = MockCertificateCommand::new();
    command
        .expect_revoke()
        .return_once(|_| Err(Error::conflict("certificate has already been revoked")));
    let app = actix_test::init_service(test_app(command, MockCertificateQuery::new())).await;
    let cookie = session_cookie_for(&app, &staff()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/certificates/{ACHIEVEMENT_ID}/revoke"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
}
