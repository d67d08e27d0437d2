//! Port for reading achievement records.

use async_trait::async_trait;

use crate::domain::{Achievement, AchievementId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by achievement repository adapters.
    pub enum AchievementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "achievement repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "achievement repository query failed: {message}",
    }
}

/// Read-only access to achievements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Load the achievements with the given ids.
    ///
    /// Ids with no matching row are omitted from the result; order is not
    /// guaranteed.
    async fn find_by_ids(
        &self,
        ids: &[AchievementId],
    ) -> Result<Vec<Achievement>, AchievementRepositoryError>;
}
