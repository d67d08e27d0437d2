//! Builders wiring repositories, the certificate service and the render
//! worker into HTTP state.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::Clock;
use tokio::task::JoinHandle;

use achievement_ledger::domain::ports::{
    AchievementRepository, CertificateRenderer, CertificateRepository, ObjectStorage,
    StudentRepository, TracingRenderOutcomeSink,
};
use achievement_ledger::domain::{
    CertificateService, CertificateServicePorts, DocumentSettings, OfficeCode, RenderJobPorts,
    RenderJobRunner, RenderWorker,
};
use achievement_ledger::inbound::http::health::DependencyProbe;
use achievement_ledger::inbound::http::state::HttpState;
use achievement_ledger::outbound::persistence::{
    DbPool, DieselAchievementRepository, DieselCertificateRepository, DieselStudentRepository,
};

/// Readiness probe backed by a pooled `SELECT 1`.
pub(crate) struct DbReadiness {
    pool: DbPool,
}

impl DbReadiness {
    pub(crate) fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DependencyProbe for DbReadiness {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        self.pool.ping().await.map_err(|err| err.to_string())
    }
}

/// Repository ports used by the certificate service and render worker.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) certificates: Arc<dyn CertificateRepository>,
    pub(crate) students: Arc<dyn StudentRepository>,
    pub(crate) achievements: Arc<dyn AchievementRepository>,
}

impl Repositories {
    /// Diesel-backed repositories sharing one pool.
    pub(crate) fn diesel(pool: &DbPool) -> Self {
        Self {
            certificates: Arc::new(DieselCertificateRepository::new(pool.clone())),
            students: Arc::new(DieselStudentRepository::new(pool.clone())),
            achievements: Arc::new(DieselAchievementRepository::new(pool.clone())),
        }
    }
}

/// Collaborators shared by issuance and background rendering.
pub(crate) struct CertificateCollaborators {
    pub(crate) storage: Arc<dyn ObjectStorage>,
    pub(crate) renderer: Arc<dyn CertificateRenderer>,
    pub(crate) documents: Arc<DocumentSettings>,
    pub(crate) office: OfficeCode,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) render_queue_capacity: usize,
}

/// Build the shared HTTP state and start the render worker.
///
/// Must be called inside a Tokio runtime. The worker exits once the returned
/// state, and with it every render queue handle, has been dropped.
pub(crate) fn build_http_state(
    repositories: Repositories,
    collaborators: CertificateCollaborators,
) -> (web::Data<HttpState>, JoinHandle<()>) {
    let CertificateCollaborators {
        storage,
        renderer,
        documents,
        office,
        clock,
        render_queue_capacity,
    } = collaborators;

    let worker = RenderWorker::new(
        RenderJobPorts {
            certificates: repositories.certificates.clone(),
            storage,
            renderer: renderer.clone(),
            outcomes: Arc::new(TracingRenderOutcomeSink),
        },
        documents.clone(),
    );
    let (runner, render_worker) = RenderJobRunner::spawn(worker, render_queue_capacity);

    let service = Arc::new(CertificateService::new(
        CertificateServicePorts {
            certificates: repositories.certificates,
            students: repositories.students,
            achievements: repositories.achievements,
            renderer,
            render_jobs: Arc::new(runner),
        },
        documents,
        office,
        clock,
    ));

    let state = HttpState::new(service.clone(), service.clone(), service);
    (web::Data::new(state), render_worker)
}
