//! Driving port for certificate reads and document downloads.

use async_trait::async_trait;

use crate::domain::{
    CertificateDetail, CertificateId, CertificateStatus, CertificateSummary, Error, StudentId,
};

/// Listing request as received from a caller; paging values are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListCertificatesRequest {
    pub student_id: Option<StudentId>,
    pub status: Option<CertificateStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// One page of certificates with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateListing {
    pub items: Vec<CertificateSummary>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

/// A freshly rendered certificate PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCertificate {
    /// Suggested attachment name, e.g. `SKP-421.2-SKP-2024-0001.pdf`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Certificate reads exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateQuery: Send + Sync {
    /// Load one certificate with student and achievements.
    async fn get_certificate(&self, id: &CertificateId) -> Result<CertificateDetail, Error>;

    /// List certificates, newest first.
    async fn list_certificates(
        &self,
        request: ListCertificatesRequest,
    ) -> Result<CertificateListing, Error>;

    /// Render the certificate PDF on demand.
    async fn download_certificate(&self, id: &CertificateId) -> Result<RenderedCertificate, Error>;
}
