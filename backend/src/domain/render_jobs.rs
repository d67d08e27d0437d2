//! Background rendering of certificate PDFs.
//!
//! [`RenderJobRunner`] owns a bounded queue drained by a single consumer
//! task. Each job loads the certificate, renders it on a blocking thread,
//! uploads the PDF and records the URL. Every job ends with exactly one
//! [`RenderOutcome`] reported to the [`RenderOutcomeSink`]; failures never
//! reach the request that queued the job.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::ports::{
    CertificateRenderer, CertificateRepository, ObjectStorage, RenderJob, RenderJobQueue,
    RenderJobQueueError, RenderOutcome, RenderOutcomeSink, RenderReason, RenderStage,
    StoredContentType, validate_upload,
};
use crate::domain::{CertificateDocument, CertificateId, DocumentSettings, TraceId};

/// Storage folder for rendered certificates.
pub const CERTIFICATE_FOLDER: &str = "certificates";

/// Collaborators used while processing a job.
#[derive(Clone)]
pub struct RenderJobPorts {
    pub certificates: Arc<dyn CertificateRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub renderer: Arc<dyn CertificateRenderer>,
    pub outcomes: Arc<dyn RenderOutcomeSink>,
}

type StageError = (RenderStage, String);

/// Processes one render job at a time.
#[derive(Clone)]
pub struct RenderWorker {
    ports: RenderJobPorts,
    documents: Arc<DocumentSettings>,
}

impl RenderWorker {
    pub fn new(ports: RenderJobPorts, documents: Arc<DocumentSettings>) -> Self {
        Self { ports, documents }
    }

    /// Run `job` to completion and report its outcome.
    pub async fn process(&self, job: RenderJob) -> RenderOutcome {
        let certificate_id = job.certificate_id;
        let outcome = match self.render_and_store(&job).await {
            Ok(url) => RenderOutcome::Stored {
                certificate_id,
                url,
            },
            Err((stage, message)) => RenderOutcome::Failed {
                certificate_id,
                stage,
                message,
            },
        };
        self.ports.outcomes.record(&outcome);
        outcome
    }

    async fn render_and_store(&self, job: &RenderJob) -> Result<String, StageError> {
        let id = job.certificate_id;
        let detail = self
            .ports
            .certificates
            .find_detail(&id)
            .await
            .map_err(|err| (RenderStage::Load, err.to_string()))?
            .ok_or_else(|| (RenderStage::Load, format!("certificate {id} not found")))?;

        if job.reason == RenderReason::Backfill {
            if let Some(url) = detail.certificate().pdf_url() {
                debug!(certificate_id = %id, "pdf already stored; skipping backfill");
                return Ok(url.to_owned());
            }
        }

        let document = CertificateDocument::assemble(&detail, &self.documents);
        let renderer = Arc::clone(&self.ports.renderer);
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|err| (RenderStage::Render, err.to_string()))?
            .map_err(|err| (RenderStage::Render, err.to_string()))?;

        let content_type = validate_upload(StoredContentType::Pdf.mime(), bytes.len())
            .map_err(|err| (RenderStage::Upload, err.to_string()))?;
        let url = self
            .ports
            .storage
            .upload(CERTIFICATE_FOLDER, bytes, content_type)
            .await
            .map_err(|err| (RenderStage::Upload, err.to_string()))?;

        if let Err(err) = self.ports.certificates.update_pdf_url(&id, &url).await {
            self.discard_upload(id, &url).await;
            return Err((RenderStage::Record, err.to_string()));
        }
        Ok(url)
    }

    async fn discard_upload(&self, certificate_id: CertificateId, url: &str) {
        if let Err(err) = self.ports.storage.delete(url).await {
            warn!(%certificate_id, %url, error = %err, "orphaned certificate pdf was not removed");
        }
    }
}

/// Handle for queueing render jobs.
#[derive(Clone)]
pub struct RenderJobRunner {
    sender: mpsc::Sender<RenderJob>,
}

impl RenderJobRunner {
    /// Create a queue of `capacity` jobs without starting a consumer.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RenderJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Create a queue and spawn its consumer on the current runtime.
    ///
    /// The consumer stops once every runner handle has been dropped and the
    /// queue is drained.
    pub fn spawn(worker: RenderWorker, capacity: usize) -> (Self, JoinHandle<()>) {
        let (runner, receiver) = Self::channel(capacity);
        let handle = tokio::spawn(drain(worker, receiver));
        (runner, handle)
    }
}

impl RenderJobQueue for RenderJobRunner {
    fn submit(&self, job: RenderJob) -> Result<(), RenderJobQueueError> {
        self.sender.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => RenderJobQueueError::full(),
            TrySendError::Closed(_) => RenderJobQueueError::closed(),
        })
    }
}

/// Process queued jobs until the queue closes.
///
/// Each job runs with the trace identifier of the request that queued it,
/// or a fresh one when it was queued outside a request.
pub async fn drain(worker: RenderWorker, mut receiver: mpsc::Receiver<RenderJob>) {
    while let Some(job) = receiver.recv().await {
        let trace_id = job.trace_id.unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "render_job",
            certificate_id = %job.certificate_id,
            trace_id = %trace_id,
            reason = ?job.reason,
        );
        TraceId::scope(trace_id, worker.process(job))
            .instrument(span)
            .await;
    }
    debug!("render queue closed");
}
