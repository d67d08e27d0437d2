//! Server entry-point: loads settings, prepares persistence and storage, and
//! serves the certificate API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use achievement_ledger::inbound::http::health::HealthState;
use achievement_ledger::outbound::persistence::{DbPool, run_pending_migrations};
use achievement_ledger::outbound::rendering::PdfCertificateRenderer;
use achievement_ledger::outbound::storage::LocalObjectStorage;

use server::{
    AppSettings, CertificateCollaborators, DbReadiness, Repositories, ServerConfig,
    build_http_state, create_server, load_session_key,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;

    let key = load_session_key(&settings.session_key_file(), settings.allow_ephemeral_session)
        .wrap_err("session key")?;
    let config = ServerConfig::new(
        key,
        settings.cookie_secure(),
        settings.same_site()?,
        settings.bind_addr()?,
    );

    let database_url = settings.database_url()?;
    if settings.run_migrations() {
        let applied = run_pending_migrations(database_url)
            .await
            .wrap_err("database migrations")?;
        info!(applied, "database migrations complete");
    }
    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("database pool")?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let storage_root = settings.storage_root();
    let storage = LocalObjectStorage::open(
        &storage_root,
        settings.storage_public_url(),
        clock.clone(),
    )
    .wrap_err_with(|| format!("object storage at {}", storage_root.display()))?;

    let (http_state, render_worker) = build_http_state(
        Repositories::diesel(&pool),
        CertificateCollaborators {
            storage: Arc::new(storage),
            renderer: Arc::new(PdfCertificateRenderer::new()),
            documents: Arc::new(settings.document_settings()?),
            office: settings.office_code()?,
            clock,
            render_queue_capacity: settings.render_queue_capacity(),
        },
    );

    let health_state =
        web::Data::new(HealthState::new().with_dependency(Arc::new(DbReadiness::new(pool))));
    let bind_addr = config.bind_addr();
    let server = create_server(health_state, http_state, config)
        .wrap_err_with(|| format!("bind {bind_addr}"))?;
    info!(%bind_addr, "achievement ledger listening");

    let served = server.await;
    render_worker.abort();
    served.wrap_err("http server")
}
