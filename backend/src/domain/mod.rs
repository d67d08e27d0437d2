//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed certificate workflow used by the HTTP
//! and persistence adapters. Entities stay framework agnostic; adapters talk
//! to the domain exclusively through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - Certificate and its value types (number, token, status).
//! - Student and achievement read models with their enriched projections.
//! - CertificateDocument: render-ready data assembled from a certificate.
//! - CertificateService and RenderJobRunner: the driving-port services.

pub mod achievement;
pub mod certificate;
pub mod certificate_service;
pub mod document;
pub mod error;
pub mod ports;
pub mod render_jobs;
pub mod student;
pub mod trace_id;
pub mod user;

pub use self::achievement::{
    Achievement, AchievementAttachment, AchievementId, AchievementView,
    AchievementWithAttachments, order_for_certificate,
};
pub use self::certificate::{
    Certificate, CertificateDetail, CertificateDraft, CertificateId, CertificateNumber,
    CertificateNumberError, CertificateRecord, CertificateStateError, CertificateStatus,
    CertificateSummary, OfficeCode, OfficeCodeError, ParseCertificateStatusError,
    VerificationToken, VerificationTokenError,
};
pub use self::certificate_service::{CertificateService, CertificateServicePorts};
pub use self::document::{
    CertificateDocument, DocumentRow, DocumentSettings, SchoolProfile, StudentBlock,
    VerificationUrlBuilder, VerificationUrlError, download_file_name, format_indonesian_date,
    truncate_to_width,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::render_jobs::{RenderJobPorts, RenderJobRunner, RenderWorker};
pub use self::student::{Student, StudentId};
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserValidationError};
