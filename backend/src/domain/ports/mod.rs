//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, storage, rendering, the render queue and its
//! outcome sink) are implemented by outbound adapters. Driving ports
//! (`CertificateCommand`, `CertificateQuery`, `CertificateVerification`) are
//! implemented by the certificate service and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod achievement_repository;
mod certificate_command;
mod certificate_query;
mod certificate_renderer;
mod certificate_repository;
mod certificate_verification;
mod object_storage;
mod render_job_queue;
mod render_outcome_sink;
mod student_repository;

#[cfg(test)]
pub use achievement_repository::MockAchievementRepository;
pub use achievement_repository::{AchievementRepository, AchievementRepositoryError};
#[cfg(test)]
pub use certificate_command::MockCertificateCommand;
pub use certificate_command::{
    CertificateCommand, IssueCertificateRequest, RevokeCertificateRequest,
};
#[cfg(test)]
pub use certificate_query::MockCertificateQuery;
pub use certificate_query::{
    CertificateListing, CertificateQuery, ListCertificatesRequest, RenderedCertificate,
};
#[cfg(test)]
pub use certificate_renderer::MockCertificateRenderer;
pub use certificate_renderer::{CertificateRenderError, CertificateRenderer};
#[cfg(test)]
pub use certificate_repository::MockCertificateRepository;
pub use certificate_repository::{
    CertificateListFilter, CertificatePage, CertificateRepository, CertificateRepositoryError,
    DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE, PageRequest,
};
#[cfg(test)]
pub use certificate_verification::MockCertificateVerification;
pub use certificate_verification::{
    CertificateVerification, NOT_FOUND_MESSAGE, REVOKED_MESSAGE, VALID_MESSAGE,
    VerificationOutcome,
};
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{
    MAX_OBJECT_BYTES, ObjectStorage, ObjectStorageError, StoredContentType, validate_upload,
};
#[cfg(test)]
pub use render_job_queue::MockRenderJobQueue;
pub use render_job_queue::{RenderJob, RenderJobQueue, RenderJobQueueError, RenderReason};
#[cfg(test)]
pub use render_outcome_sink::MockRenderOutcomeSink;
pub use render_outcome_sink::{
    RenderOutcome, RenderOutcomeSink, RenderStage, TracingRenderOutcomeSink,
};
#[cfg(test)]
pub use student_repository::MockStudentRepository;
pub use student_repository::{StudentRepository, StudentRepositoryError};
