//! Reference rows for repository suites, written with plain SQL.

use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

pub const ISSUER_NAME: &str = "Admin Kesiswaan";
pub const STUDENT_NAME: &str = "Budi Santoso";
pub const STUDENT_NISN: &str = "1234567890";

/// Identifiers of the seeded rows.
#[derive(Debug, Clone)]
pub struct SeededLedger {
    pub issuer_id: Uuid,
    pub student_id: Uuid,
    /// Newest first: the 2024 achievement, then the 2023 one.
    pub achievement_ids: Vec<Uuid>,
    /// Achievement belonging to a different student.
    pub foreign_achievement_id: Uuid,
}

/// Insert one issuer, two students and their achievements.
///
/// The 2024 achievement carries one attachment; the 2023 one has no level.
pub fn seed_ledger(url: &str) -> Result<SeededLedger, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let issuer_id = Uuid::new_v4();
    let student_id = Uuid::new_v4();
    let other_student_id = Uuid::new_v4();
    let recent = Uuid::new_v4();
    let older = Uuid::new_v4();
    let foreign = Uuid::new_v4();

    let mut tx = client
        .transaction()
        .map_err(|err| format_postgres_error(&err))?;
    let category_id: i32 = tx
        .query_one(
            "INSERT INTO achievement_categories (name) VALUES ('Akademik') RETURNING id",
            &[],
        )
        .map_err(|err| format_postgres_error(&err))?
        .get(0);
    let level_id: i32 = tx
        .query_one(
            "INSERT INTO competition_levels (name, rank_order) VALUES ('Provinsi', 3) RETURNING id",
            &[],
        )
        .map_err(|err| format_postgres_error(&err))?
        .get(0);

    tx.execute(
        "INSERT INTO users (id, full_name) VALUES ($1, $2)",
        &[&issuer_id, &ISSUER_NAME],
    )
    .map_err(|err| format_postgres_error(&err))?;
    tx.execute(
        "INSERT INTO students (id, nisn, full_name, birth_place, gender, class_name) \
         VALUES ($1, $2, $3, 'Surabaya', 'L', 'XI IPA 2'), \
                ($4, '0987654321', 'Siti Aminah', 'Malang', 'P', 'X IPS 1')",
        &[&student_id, &STUDENT_NISN, &STUDENT_NAME, &other_student_id],
    )
    .map_err(|err| format_postgres_error(&err))?;
    tx.execute(
        "INSERT INTO achievements \
            (id, student_id, competition_name, organizer, category_id, rank, level_id, year) \
         VALUES \
            ($1, $2, 'Olimpiade Matematika', 'Dinas Pendidikan', $3, 'Juara 1', $4, 2024), \
            ($5, $2, 'Lomba Debat', 'Universitas Negeri', $3, 'Juara 2', NULL, 2023), \
            ($6, $7, 'Lomba Pidato', 'Kecamatan', NULL, 'Harapan 1', NULL, 2024)",
        &[
            &recent,
            &student_id,
            &category_id,
            &level_id,
            &older,
            &foreign,
            &other_student_id,
        ],
    )
    .map_err(|err| format_postgres_error(&err))?;
    tx.execute(
        "INSERT INTO achievement_attachments (id, achievement_id, file_url, file_name, file_type) \
         VALUES ($1, $2, 'http://localhost/files/piagam.pdf', 'piagam.pdf', 'application/pdf')",
        &[&Uuid::new_v4(), &recent],
    )
    .map_err(|err| format_postgres_error(&err))?;
    tx.commit().map_err(|err| format_postgres_error(&err))?;

    Ok(SeededLedger {
        issuer_id,
        student_id,
        achievement_ids: vec![recent, older],
        foreign_achievement_id: foreign,
    })
}
