//! Port for certificate persistence and certificate read projections.

use async_trait::async_trait;

use crate::domain::{
    AchievementId, Certificate, CertificateDetail, CertificateId, CertificateStatus,
    CertificateSummary, StudentId, VerificationToken,
};

use super::define_port_error;

/// Page used when the caller does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

define_port_error! {
    /// Errors raised by certificate repository adapters.
    pub enum CertificateRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "certificate repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "certificate repository query failed: {message}",
        /// Another certificate already holds this number. Retryable.
        DuplicateNumber { number: String } =>
            "certificate number {number} is already taken",
        /// Another certificate already holds this verification token. Retryable.
        DuplicateToken =>
            "verification token collided with an existing certificate",
        /// The certificate references a student or achievement that does not exist.
        ReferenceViolation { message: String } =>
            "certificate references a missing record: {message}",
    }
}

impl CertificateRepositoryError {
    /// Whether issuing again with a fresh number and token may succeed.
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::DuplicateNumber { .. } | Self::DuplicateToken)
    }
}

/// One-based page window, with the page size clamped to [`MAX_PER_PAGE`].
///
/// # Examples
/// ```
/// use achievement_ledger::domain::ports::PageRequest;
///
/// let page = PageRequest::new(Some(3), Some(500));
/// assert_eq!(page.per_page(), 100);
/// assert_eq!(page.offset(), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a page window; missing or zero values fall back to the defaults.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.filter(|value| *value > 0).unwrap_or(DEFAULT_PAGE);
        let per_page = per_page
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_PER_PAGE)
            .min(MAX_PER_PAGE);
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Rows to return.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Number of pages needed for `total` rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.per_page))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filters for listing certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CertificateListFilter {
    pub student_id: Option<StudentId>,
    pub status: Option<CertificateStatus>,
    pub page: PageRequest,
}

/// One page of certificates plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertificatePage {
    pub items: Vec<CertificateSummary>,
    pub total: u64,
}

/// Port for storing certificates and reading their projections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Count certificates whose `issued_at` falls inside `year` (UTC).
    async fn count_issued_in_year(&self, year: i32) -> Result<u64, CertificateRepositoryError>;

    /// Persist a certificate and its achievement links in one transaction.
    async fn create(
        &self,
        certificate: &Certificate,
        achievement_ids: &[AchievementId],
    ) -> Result<(), CertificateRepositoryError>;

    /// Find a certificate by id.
    async fn find_by_id(
        &self,
        id: &CertificateId,
    ) -> Result<Option<CertificateSummary>, CertificateRepositoryError>;

    /// Find a certificate by its public verification token.
    async fn find_by_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<CertificateSummary>, CertificateRepositoryError>;

    /// Load the certificate with its student and linked achievements.
    async fn find_detail(
        &self,
        id: &CertificateId,
    ) -> Result<Option<CertificateDetail>, CertificateRepositoryError>;

    /// List certificates, newest issuance first.
    async fn list(
        &self,
        filter: &CertificateListFilter,
    ) -> Result<CertificatePage, CertificateRepositoryError>;

    /// Record the URL of the rendered PDF.
    async fn update_pdf_url(
        &self,
        id: &CertificateId,
        url: &str,
    ) -> Result<(), CertificateRepositoryError>;

    /// Flip an active certificate to revoked.
    ///
    /// Returns `false` when no active certificate with this id exists.
    async fn revoke(&self, id: &CertificateId) -> Result<bool, CertificateRepositoryError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), Some(0), 1, 10)]
    #[case(Some(2), Some(25), 2, 25)]
    #[case(Some(1), Some(101), 1, 100)]
    fn page_request_applies_defaults_and_cap(
        #[case] page: Option<u32>,
        #[case] per_page: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::new(page, per_page);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(95, 10)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] expected: u64) {
        assert_eq!(PageRequest::default().total_pages(total), expected);
    }

    #[rstest]
    fn uniqueness_violations_are_flagged() {
        assert!(CertificateRepositoryError::duplicate_number("421.2/SKP/2024/0001")
            .is_uniqueness_violation());
        assert!(CertificateRepositoryError::duplicate_token().is_uniqueness_violation());
        assert!(!CertificateRepositoryError::query("boom").is_uniqueness_violation());
        assert!(!CertificateRepositoryError::reference_violation("student").is_uniqueness_violation());
    }
}
