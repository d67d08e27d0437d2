//! Achievement read models.
//!
//! Achievements are recorded elsewhere; certificates reference them. The base
//! [`Achievement`] mirrors the stored row while [`AchievementView`] carries
//! the display names joined from the category and level lookups.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StudentId;

/// Stable achievement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(Uuid);

impl AchievementId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A competition result recorded for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: AchievementId,
    pub student_id: StudentId,
    pub competition_name: String,
    pub organizer: String,
    pub category_id: Option<i32>,
    /// Placement, e.g. "Juara 1".
    pub rank: String,
    pub level_id: Option<i32>,
    pub year: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Achievement {
    /// Whether this achievement is owned by `student`.
    pub fn belongs_to(&self, student: &StudentId) -> bool {
        self.student_id == *student
    }
}

/// Achievement enriched with its category and level display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementView {
    pub achievement: Achievement,
    pub category_name: Option<String>,
    pub level_name: Option<String>,
}

/// File evidence attached to an achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementAttachment {
    pub id: Uuid,
    pub achievement_id: AchievementId,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub label: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Achievement view plus its attachments ordered by upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementWithAttachments {
    pub view: AchievementView,
    pub attachments: Vec<AchievementAttachment>,
}

fn certificate_order(left: &Achievement, right: &Achievement) -> Ordering {
    right
        .year
        .cmp(&left.year)
        .then_with(|| left.created_at.cmp(&right.created_at))
}

/// Sort achievements the way certificates list them: newest year first,
/// then in recording order. The sort is stable.
///
/// # Examples
/// ```
/// use achievement_ledger::domain::{order_for_certificate, AchievementView};
///
/// let mut views: Vec<AchievementView> = Vec::new();
/// order_for_certificate(&mut views, |view| &view.achievement);
/// assert!(views.is_empty());
/// ```
pub fn order_for_certificate<T>(items: &mut [T], achievement: impl Fn(&T) -> &Achievement) {
    items.sort_by(|left, right| certificate_order(achievement(left), achievement(right)));
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn achievement(name: &str, year: i32, created_minute: u32) -> Achievement {
        Achievement {
            id: AchievementId::random(),
            student_id: StudentId::from_uuid(Uuid::nil()),
            competition_name: name.to_owned(),
            organizer: "Dinas Pendidikan".to_owned(),
            category_id: None,
            rank: "Juara 1".to_owned(),
            level_id: None,
            year,
            description: String::new(),
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 8, created_minute, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn orders_by_year_descending_then_creation() {
        let mut items = vec![
            achievement("old", 2022, 0),
            achievement("new-late", 2024, 30),
            achievement("new-early", 2024, 5),
            achievement("mid", 2023, 0),
        ];
        order_for_certificate(&mut items, |item| item);
        let names: Vec<_> = items.iter().map(|a| a.competition_name.as_str()).collect();
        assert_eq!(names, ["new-early", "new-late", "mid", "old"]);
    }

    #[rstest]
    fn belongs_to_compares_student() {
        let item = achievement("olimpiade", 2024, 0);
        assert!(item.belongs_to(&StudentId::from_uuid(Uuid::nil())));
        assert!(!item.belongs_to(&StudentId::random()));
    }
}
