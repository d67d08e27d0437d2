//! Port for handing rendering work to the background runner.

use crate::domain::{CertificateId, TraceId};

use super::define_port_error;

define_port_error! {
    /// Errors raised when a render job cannot be queued.
    pub enum RenderJobQueueError {
        /// The queue is at capacity.
        Full => "render queue is full",
        /// The runner has stopped.
        Closed => "render queue is closed",
    }
}

/// Why a render job was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderReason {
    /// First render after issuance.
    Issued,
    /// A download found no stored PDF.
    Backfill,
}

/// Request to render and store the PDF of one certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderJob {
    pub certificate_id: CertificateId,
    pub reason: RenderReason,
    /// Trace identifier of the request that queued the job.
    pub trace_id: Option<TraceId>,
}

impl RenderJob {
    /// Build a job carrying the trace identifier currently in scope.
    pub fn new(certificate_id: CertificateId, reason: RenderReason) -> Self {
        Self {
            certificate_id,
            reason,
            trace_id: TraceId::current(),
        }
    }
}

/// Accepts render jobs without waiting for them to run.
#[cfg_attr(test, mockall::automock)]
pub trait RenderJobQueue: Send + Sync {
    /// Queue `job`, failing immediately when the queue cannot take it.
    fn submit(&self, job: RenderJob) -> Result<(), RenderJobQueueError>;
}
