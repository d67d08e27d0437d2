//! PostgreSQL-backed `CertificateRepository` implementation using Diesel ORM.
//!
//! Certificates are written together with their achievement join rows inside
//! one transaction. Read paths join students and users so summaries carry the
//! denormalized names, and the detail read takes every projection from the
//! same transaction snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{
    CertificateListFilter, CertificatePage, CertificateRepository, CertificateRepositoryError,
};
use crate::domain::{
    AchievementAttachment, AchievementId, AchievementView, AchievementWithAttachments,
    Certificate, CertificateDetail, CertificateId, CertificateStatus, CertificateSummary,
    Student, VerificationToken,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    AchievementRow, AttachmentRow, CertificateRow, NewCertificateAchievementRow,
    NewCertificateRow, StudentRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    achievement_attachments, achievement_categories, achievements, certificate_achievements,
    certificates, competition_levels, students, users,
};

const NUMBER_CONSTRAINT: &str = "certificates_number_key";
const TOKEN_CONSTRAINT: &str = "certificates_verification_token_key";

/// A certificate row with the names joined from students and users.
type SummaryRow = (CertificateRow, Option<String>, Option<String>, Option<String>);

/// An achievement row with its category and level names.
type AchievementViewRow = (AchievementRow, Option<String>, Option<String>);

struct DetailRows {
    summary: SummaryRow,
    student: StudentRow,
    achievements: Vec<AchievementViewRow>,
    attachments: Vec<AttachmentRow>,
}

/// Diesel-backed implementation of the certificate repository port.
#[derive(Clone)]
pub struct DieselCertificateRepository {
    pool: DbPool,
}

impl DieselCertificateRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CertificateRepositoryError {
    map_basic_pool_error(error, CertificateRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> CertificateRepositoryError {
    map_basic_diesel_error(
        error,
        CertificateRepositoryError::query,
        CertificateRepositoryError::connection,
    )
}

/// Map write failures, recognising the uniqueness and reference constraints.
fn map_write_error(error: DieselError, number: &str) -> CertificateRepositoryError {
    match &error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!(
                constraint = ?info.constraint_name(),
                "certificate uniqueness constraint violated"
            );
            match info.constraint_name() {
                Some(NUMBER_CONSTRAINT) => CertificateRepositoryError::duplicate_number(number),
                Some(TOKEN_CONSTRAINT) => CertificateRepositoryError::duplicate_token(),
                other => {
                    warn!(constraint = ?other, "unrecognised unique violation on certificates");
                    CertificateRepositoryError::query("unique constraint violation")
                }
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            CertificateRepositoryError::reference_violation(
                info.constraint_name().unwrap_or("foreign key"),
            )
        }
        _ => map_diesel_error(error),
    }
}

fn decode_certificate(row: CertificateRow) -> Result<Certificate, CertificateRepositoryError> {
    row.into_domain().map_err(|message| {
        CertificateRepositoryError::query(format!("stored certificate is invalid: {message}"))
    })
}

fn summary_from_row(row: SummaryRow) -> Result<CertificateSummary, CertificateRepositoryError> {
    let (certificate, student_name, student_nisn, issued_by_name) = row;
    Ok(CertificateSummary {
        certificate: decode_certificate(certificate)?,
        student_name,
        student_nisn,
        issued_by_name,
    })
}

fn detail_from_rows(rows: DetailRows) -> Result<CertificateDetail, CertificateRepositoryError> {
    let mut attachments: HashMap<Uuid, Vec<AchievementAttachment>> = HashMap::new();
    for row in rows.attachments {
        attachments
            .entry(row.achievement_id)
            .or_default()
            .push(AchievementAttachment::from(row));
    }

    let achievements = rows
        .achievements
        .into_iter()
        .map(|(achievement, category_name, level_name)| {
            let attachments = attachments.remove(&achievement.id).unwrap_or_default();
            AchievementWithAttachments {
                view: AchievementView {
                    achievement: achievement.into(),
                    category_name,
                    level_name,
                },
                attachments,
            }
        })
        .collect();

    Ok(CertificateDetail {
        summary: summary_from_row(rows.summary)?,
        student: Student::from(rows.student),
        achievements,
    })
}

fn year_bounds(
    year: i32,
) -> Result<(chrono::DateTime<Utc>, chrono::DateTime<Utc>), CertificateRepositoryError> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
    let end = year
        .checked_add(1)
        .and_then(|next| Utc.with_ymd_and_hms(next, 1, 1, 0, 0, 0).single());
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(CertificateRepositoryError::query(format!(
            "year {year} is out of range"
        ))),
    }
}

macro_rules! summary_query {
    () => {
        certificates::table
            .left_join(students::table)
            .left_join(users::table)
            .select((
                CertificateRow::as_select(),
                students::full_name.nullable(),
                students::nisn.nullable(),
                users::full_name.nullable(),
            ))
    };
}

#[async_trait]
impl CertificateRepository for DieselCertificateRepository {
    async fn count_issued_in_year(&self, year: i32) -> Result<u64, CertificateRepositoryError> {
        let (start, end) = year_bounds(year)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = certificates::table
            .filter(certificates::issued_at.ge(start))
            .filter(certificates::issued_at.lt(end))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(count)
            .map_err(|_| CertificateRepositoryError::query("negative certificate count"))
    }

    async fn create(
        &self,
        certificate: &Certificate,
        achievement_ids: &[AchievementId],
    ) -> Result<(), CertificateRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let new_row = NewCertificateRow::from(certificate);
        let join_rows: Vec<NewCertificateAchievementRow> = achievement_ids
            .iter()
            .map(|achievement_id| NewCertificateAchievementRow {
                certificate_id: *certificate.id().as_uuid(),
                achievement_id: *achievement_id.as_uuid(),
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(certificates::table)
                    .values(&new_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(certificate_achievements::table)
                    .values(&join_rows)
                    .execute(conn)
                    .await?;
                Ok::<_, DieselError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| map_write_error(error, certificate.number().as_str()))
    }

    async fn find_by_id(
        &self,
        id: &CertificateId,
    ) -> Result<Option<CertificateSummary>, CertificateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<SummaryRow> = summary_query!()
            .filter(certificates::id.eq(id.as_uuid()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(summary_from_row).transpose()
    }

    async fn find_by_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<CertificateSummary>, CertificateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<SummaryRow> = summary_query!()
            .filter(certificates::verification_token.eq(token.as_str()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(summary_from_row).transpose()
    }

    async fn find_detail(
        &self,
        id: &CertificateId,
    ) -> Result<Option<CertificateDetail>, CertificateRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let certificate_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = conn
            .transaction(|conn| {
                async move {
                    let summary: Option<SummaryRow> = summary_query!()
                        .filter(certificates::id.eq(certificate_id))
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(summary) = summary else {
                        return Ok(None);
                    };

                    let student = students::table
                        .filter(students::id.eq(summary.0.student_id))
                        .select(StudentRow::as_select())
                        .first(conn)
                        .await?;

                    let achievements: Vec<AchievementViewRow> = achievements::table
                        .inner_join(certificate_achievements::table)
                        .left_join(achievement_categories::table)
                        .left_join(competition_levels::table)
                        .filter(certificate_achievements::certificate_id.eq(certificate_id))
                        .order((achievements::year.desc(), achievements::created_at.asc()))
                        .select((
                            AchievementRow::as_select(),
                            achievement_categories::name.nullable(),
                            competition_levels::name.nullable(),
                        ))
                        .load(conn)
                        .await?;

                    let achievement_ids: Vec<Uuid> =
                        achievements.iter().map(|(row, _, _)| row.id).collect();
                    let attachments = achievement_attachments::table
                        .filter(achievement_attachments::achievement_id.eq_any(&achievement_ids))
                        .order(achievement_attachments::uploaded_at.asc())
                        .select(AttachmentRow::as_select())
                        .load(conn)
                        .await?;

                    Ok::<_, DieselError>(Some(DetailRows {
                        summary,
                        student,
                        achievements,
                        attachments,
                    }))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        rows.map(detail_from_rows).transpose()
    }

    async fn list(
        &self,
        filter: &CertificateListFilter,
    ) -> Result<CertificatePage, CertificateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count_query = certificates::table.count().into_boxed();
        let mut page_query = summary_query!().into_boxed();
        if let Some(student_id) = filter.student_id {
            count_query = count_query.filter(certificates::student_id.eq(*student_id.as_uuid()));
            page_query = page_query.filter(certificates::student_id.eq(*student_id.as_uuid()));
        }
        if let Some(status) = filter.status {
            count_query = count_query.filter(certificates::status.eq(status.as_str()));
            page_query = page_query.filter(certificates::status.eq(status.as_str()));
        }

        let total: i64 = count_query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<SummaryRow> = page_query
            .order((certificates::issued_at.desc(), certificates::id.desc()))
            .limit(filter.page.limit())
            .offset(filter.page.offset())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(summary_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total)
            .map_err(|_| CertificateRepositoryError::query("negative certificate count"))?;

        Ok(CertificatePage { items, total })
    }

    async fn update_pdf_url(
        &self,
        id: &CertificateId,
        url: &str,
    ) -> Result<(), CertificateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(certificates::table.filter(certificates::id.eq(id.as_uuid())))
            .set(certificates::pdf_url.eq(url))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(CertificateRepositoryError::query(format!(
                "certificate {id} not found"
            )));
        }
        Ok(())
    }

    async fn revoke(&self, id: &CertificateId) -> Result<bool, CertificateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            certificates::table
                .filter(certificates::id.eq(id.as_uuid()))
                .filter(certificates::status.eq(CertificateStatus::Active.as_str())),
        )
        .set(certificates::status.eq(CertificateStatus::Revoked.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated == 1)
    }
}
