//! PostgreSQL-backed `AchievementRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AchievementRepository, AchievementRepositoryError};
use crate::domain::{Achievement, AchievementId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AchievementRow;
use super::pool::{DbPool, PoolError};
use super::schema::achievements;

/// Diesel-backed implementation of the achievement read port.
#[derive(Clone)]
pub struct DieselAchievementRepository {
    pool: DbPool,
}

impl DieselAchievementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AchievementRepositoryError {
    map_basic_pool_error(error, AchievementRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AchievementRepositoryError {
    map_basic_diesel_error(
        error,
        AchievementRepositoryError::query,
        AchievementRepositoryError::connection,
    )
}

#[async_trait]
impl AchievementRepository for DieselAchievementRepository {
    async fn find_by_ids(
        &self,
        ids: &[AchievementId],
    ) -> Result<Vec<Achievement>, AchievementRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = achievements::table
            .filter(achievements::id.eq_any(&ids))
            .order((achievements::year.desc(), achievements::created_at.asc()))
            .select(AchievementRow::as_select())
            .load::<AchievementRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Achievement::from).collect())
    }
}
