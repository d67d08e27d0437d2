//! Port receiving the result of each background render job.

use tracing::{error, info};

use crate::domain::CertificateId;

/// Step of a render job that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Loading the certificate detail.
    Load,
    /// Drawing the PDF.
    Render,
    /// Uploading the PDF to object storage.
    Upload,
    /// Recording the PDF URL on the certificate.
    Record,
}

impl RenderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Render => "render",
            Self::Upload => "upload",
            Self::Record => "record",
        }
    }
}

/// Result of one render job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The PDF was stored and its URL recorded.
    Stored {
        certificate_id: CertificateId,
        url: String,
    },
    /// The job stopped at `stage`.
    Failed {
        certificate_id: CertificateId,
        stage: RenderStage,
        message: String,
    },
}

impl RenderOutcome {
    pub fn certificate_id(&self) -> CertificateId {
        match self {
            Self::Stored { certificate_id, .. } | Self::Failed { certificate_id, .. } => {
                *certificate_id
            }
        }
    }
}

/// Observer for render job results.
#[cfg_attr(test, mockall::automock)]
pub trait RenderOutcomeSink: Send + Sync {
    /// Record the result of one job.
    fn record(&self, outcome: &RenderOutcome);
}

/// Sink that writes every outcome to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRenderOutcomeSink;

impl RenderOutcomeSink for TracingRenderOutcomeSink {
    fn record(&self, outcome: &RenderOutcome) {
        match outcome {
            RenderOutcome::Stored {
                certificate_id,
                url,
            } => info!(%certificate_id, %url, "certificate pdf stored"),
            RenderOutcome::Failed {
                certificate_id,
                stage,
                message,
            } => error!(
                %certificate_id,
                stage = stage.as_str(),
                error = %message,
                "certificate pdf render failed"
            ),
        }
    }
}
