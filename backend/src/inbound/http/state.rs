//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CertificateCommand, CertificateQuery, CertificateVerification};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub certificates: Arc<dyn CertificateCommand>,
    pub certificates_query: Arc<dyn CertificateQuery>,
    pub verification: Arc<dyn CertificateVerification>,
}

impl HttpState {
    /// Construct state from the certificate driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use achievement_ledger::domain::CertificateService;
    /// use achievement_ledger::inbound::http::state::HttpState;
    ///
    /// fn wire(service: CertificateService) -> HttpState {
    ///     let service = Arc::new(service);
    ///     HttpState::new(service.clone(), service.clone(), service)
    /// }
    /// ```
    pub fn new(
        certificates: Arc<dyn CertificateCommand>,
        certificates_query: Arc<dyn CertificateQuery>,
        verification: Arc<dyn CertificateVerification>,
    ) -> Self {
        Self {
            certificates,
            certificates_query,
            verification,
        }
    }
}
