//! Port for drawing a certificate document as PDF bytes.
//!
//! Rendering is CPU bound and synchronous; callers run it on a blocking
//! thread.

use crate::domain::CertificateDocument;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a PDF.
    pub enum CertificateRenderError {
        /// Fonts or page setup could not be prepared.
        Layout { message: String } => "certificate layout failed: {message}",
        /// The finished document could not be serialised.
        Encode { message: String } => "certificate encoding failed: {message}",
    }
}

/// Produces PDF bytes for a certificate document.
#[cfg_attr(test, mockall::automock)]
pub trait CertificateRenderer: Send + Sync {
    /// Render `document` to PDF bytes.
    fn render(&self, document: &CertificateDocument) -> Result<Vec<u8>, CertificateRenderError>;
}
