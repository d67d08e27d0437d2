//! Assembly of the printable certificate document.
//!
//! [`CertificateDocument::assemble`] turns a [`CertificateDetail`] into the
//! exact strings that appear on paper: truncated table cells, Indonesian
//! dates, and the verification URL encoded in the QR block. Drawing those
//! strings is left to a [`CertificateRenderer`](super::ports::CertificateRenderer)
//! adapter.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use url::Url;

use super::{CertificateDetail, CertificateNumber, VerificationToken};

/// Column width, in characters, of the competition name.
pub const COMPETITION_WIDTH: usize = 30;
/// Column width, in characters, of the organiser.
pub const ORGANIZER_WIDTH: usize = 22;
/// Column width, in characters, of the category.
pub const CATEGORY_WIDTH: usize = 14;
/// Column width, in characters, of the rank.
pub const RANK_WIDTH: usize = 10;
/// Column width, in characters, of the competition level.
pub const LEVEL_WIDTH: usize = 14;

const ELLIPSIS: &str = "...";

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Shorten `value` to at most `max` characters.
///
/// Values that fit are returned unchanged; longer values keep their first
/// `max - 3` characters followed by `...`. Widths too narrow for the
/// ellipsis keep a plain prefix instead. Counting is by `char`, so
/// multi-byte text is never split.
///
/// # Examples
/// ```
/// use achievement_ledger::domain::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Olimpiade", 30), "Olimpiade");
/// assert_eq!(truncate_to_width("abcdefghij", 8), "abcde...");
/// ```
pub fn truncate_to_width(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_owned();
    }
    if max <= ELLIPSIS.len() {
        return value.chars().take(max).collect();
    }
    let keep = max - ELLIPSIS.len();
    let mut out: String = value.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Format a date as `<day> <Indonesian month> <year>`, e.g. `5 Maret 2024`.
pub fn format_indonesian_date(date: NaiveDate) -> String {
    let month = MONTHS
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{} {} {}", date.day(), month, date.year())
}

/// School identity printed in the letterhead and signature block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolProfile {
    pub name: String,
    pub address: String,
    pub headmaster_name: String,
    pub headmaster_nip: Option<String>,
}

/// Invalid application URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationUrlError {
    #[error("application url is not a valid url: {0}")]
    Parse(String),
    #[error("application url must use http or https, got {0}")]
    Scheme(String),
}

/// Builds `{app_url}/api/v1/verify/{token}` links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationUrlBuilder {
    base: String,
}

impl VerificationUrlBuilder {
    /// Validate the public application URL.
    ///
    /// # Examples
    /// ```
    /// use achievement_ledger::domain::{VerificationToken, VerificationUrlBuilder};
    ///
    /// let builder = VerificationUrlBuilder::new("https://prestasi.example.sch.id/")
    ///     .expect("valid url");
    /// let token = VerificationToken::parse("00112233445566778899aabbccddeeff").expect("token");
    /// assert_eq!(
    ///     builder.build(&token),
    ///     "https://prestasi.example.sch.id/api/v1/verify/00112233445566778899aabbccddeeff",
    /// );
    /// ```
    pub fn new(app_url: &str) -> Result<Self, VerificationUrlError> {
        let parsed =
            Url::parse(app_url).map_err(|err| VerificationUrlError::Parse(err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(VerificationUrlError::Scheme(other.to_owned())),
        }
        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_owned(),
        })
    }

    pub fn build(&self, token: &VerificationToken) -> String {
        format!("{}/api/v1/verify/{}", self.base, token)
    }
}

/// Configuration shared by every rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    pub school: SchoolProfile,
    pub verification_urls: VerificationUrlBuilder,
}

/// Student identity block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentBlock {
    pub full_name: String,
    pub nisn: String,
    /// `"<place>, <date>"`, or just the place when no birth date is known.
    pub birth_place_and_date: String,
    pub class_name: String,
}

/// One line in the achievements table, already truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub position: usize,
    pub competition: String,
    pub organizer: String,
    pub category: String,
    pub rank: String,
    pub level: String,
    pub year: i32,
}

/// Printable certificate content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    pub school: SchoolProfile,
    pub number: String,
    pub student: StudentBlock,
    pub rows: Vec<DocumentRow>,
    pub verification_url: String,
    /// Issue date in Indonesian long form.
    pub issued_on: String,
    /// Issue timestamp printed in the footer, `dd/mm/yyyy HH:MM` UTC.
    pub issued_stamp: String,
    pub valid_until: Option<String>,
    pub revoked: bool,
    pub file_name: String,
}

impl CertificateDocument {
    /// Build the document from a loaded certificate.
    pub fn assemble(detail: &CertificateDetail, settings: &DocumentSettings) -> Self {
        let certificate = detail.certificate();
        let student = &detail.student;
        let birth_place_and_date = match student.birth_date {
            Some(date) => format!("{}, {}", student.birth_place, format_indonesian_date(date)),
            None => student.birth_place.clone(),
        };

        let rows = detail
            .achievements
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let view = &item.view;
                let achievement = &view.achievement;
                DocumentRow {
                    position: index + 1,
                    competition: truncate_to_width(
                        &achievement.competition_name,
                        COMPETITION_WIDTH,
                    ),
                    organizer: truncate_to_width(&achievement.organizer, ORGANIZER_WIDTH),
                    category: truncate_to_width(
                        view.category_name.as_deref().unwrap_or_default(),
                        CATEGORY_WIDTH,
                    ),
                    rank: truncate_to_width(&achievement.rank, RANK_WIDTH),
                    level: truncate_to_width(
                        view.level_name.as_deref().unwrap_or_default(),
                        LEVEL_WIDTH,
                    ),
                    year: achievement.year,
                }
            })
            .collect();

        let issued_at = certificate.issued_at();
        Self {
            school: settings.school.clone(),
            number: certificate.number().to_string(),
            student: StudentBlock {
                full_name: student.full_name.clone(),
                nisn: student.nisn.clone(),
                birth_place_and_date,
                class_name: student.class_name.clone(),
            },
            rows,
            verification_url: settings
                .verification_urls
                .build(certificate.verification_token()),
            issued_on: format_indonesian_date(issued_at.date_naive()),
            issued_stamp: issued_at.format("%d/%m/%Y %H:%M").to_string(),
            valid_until: certificate.valid_until().map(format_indonesian_date),
            revoked: certificate.is_revoked(),
            file_name: download_file_name(certificate.number()),
        }
    }
}

/// Attachment name offered when downloading, e.g. `SKP-421.2-SKP-2024-0001.pdf`.
pub fn download_file_name(number: &CertificateNumber) -> String {
    format!("SKP-{}.pdf", number.as_str().replace('/', "-"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{
        Achievement, AchievementId, AchievementView, AchievementWithAttachments, Certificate,
        CertificateDraft, CertificateId, CertificateSummary, OfficeCode, Student, StudentId,
    };

    #[fixture]
    fn settings() -> DocumentSettings {
        DocumentSettings {
            school: SchoolProfile {
                name: "SMA Negeri 1".to_owned(),
                address: "Jl. Pendidikan No. 1".to_owned(),
                headmaster_name: "Drs. Hartono".to_owned(),
                headmaster_nip: Some("196501011990031001".to_owned()),
            },
            verification_urls: VerificationUrlBuilder::new("http://localhost:8080")
                .expect("valid url"),
        }
    }

    fn detail_with(competition: &str, birth_date: Option<NaiveDate>) -> CertificateDetail {
        let student_id = StudentId::random();
        let issued_at = Utc
            .with_ymd_and_hms(2024, 8, 17, 10, 5, 0)
            .single()
            .expect("valid timestamp");
        let certificate = Certificate::issue(CertificateDraft {
            id: CertificateId::random(),
            student_id,
            number: CertificateNumber::next_in_year(&OfficeCode::default(), 2024, 0),
            issued_at,
            issued_by: None,
            valid_until: NaiveDate::from_ymd_opt(2025, 1, 31),
            verification_token: VerificationToken::parse("00112233445566778899aabbccddeeff")
                .expect("token"),
            notes: String::new(),
        });
        let achievement = Achievement {
            id: AchievementId::random(),
            student_id,
            competition_name: competition.to_owned(),
            organizer: "Kementerian Pendidikan dan Kebudayaan".to_owned(),
            category_id: Some(1),
            rank: "Juara 1".to_owned(),
            level_id: Some(3),
            year: 2024,
            description: String::new(),
            created_at: issued_at,
        };
        CertificateDetail {
            summary: CertificateSummary {
                certificate,
                student_name: Some("Siti Aminah".to_owned()),
                student_nisn: Some("1234567890".to_owned()),
                issued_by_name: None,
            },
            student: Student {
                id: student_id,
                nisn: "1234567890".to_owned(),
                full_name: "Siti Aminah".to_owned(),
                birth_place: "Bandung".to_owned(),
                birth_date,
                gender: "P".to_owned(),
                class_name: "XII IPA 1".to_owned(),
            },
            achievements: vec![AchievementWithAttachments {
                view: AchievementView {
                    achievement,
                    category_name: Some("Akademik".to_owned()),
                    level_name: Some("Nasional".to_owned()),
                },
                attachments: Vec::new(),
            }],
        }
    }

    #[rstest]
    #[case("", 30, "")]
    #[case("exactly ten", 11, "exactly ten")]
    #[case("abcdefghijkl", 10, "abcdefg...")]
    #[case("Lomba Cerdas Cermat Sains Tingkat Nasional", 30, "Lomba Cerdas Cermat Sains T...")]
    #[case("ÄÖÜäöüßÄÖÜäöüß", 10, "ÄÖÜäöüß...")]
    #[case("abcd", 2, "ab")]
    #[case("abcd", 3, "abc")]
    fn truncate_counts_characters(#[case] input: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(truncate_to_width(input, max), expected);
    }

    #[rstest]
    fn forty_character_name_keeps_twenty_seven() {
        let name = "a".repeat(40);
        let truncated = truncate_to_width(&name, COMPETITION_WIDTH);
        assert_eq!(truncated, format!("{}...", "a".repeat(27)));
    }

    #[rstest]
    #[case(2024, 1, 5, "5 Januari 2024")]
    #[case(2024, 8, 17, "17 Agustus 2024")]
    #[case(2023, 12, 31, "31 Desember 2023")]
    fn formats_indonesian_dates(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: &str,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        assert_eq!(format_indonesian_date(date), expected);
    }

    #[rstest]
    fn url_builder_rejects_non_http() {
        assert!(matches!(
            VerificationUrlBuilder::new("ftp://example.com"),
            Err(VerificationUrlError::Scheme(_))
        ));
        assert!(matches!(
            VerificationUrlBuilder::new("not a url"),
            Err(VerificationUrlError::Parse(_))
        ));
    }

    #[rstest]
    fn assemble_builds_printable_fields(settings: DocumentSettings) {
        let detail = detail_with(
            "Olimpiade Sains Nasional Bidang Matematika SMA",
            NaiveDate::from_ymd_opt(2007, 3, 9),
        );
        let document = CertificateDocument::assemble(&detail, &settings);

        assert_eq!(document.number, "421.2/SKP/2024/0001");
        assert_eq!(document.file_name, "SKP-421.2-SKP-2024-0001.pdf");
        assert_eq!(
            document.verification_url,
            "http://localhost:8080/api/v1/verify/00112233445566778899aabbccddeeff"
        );
        assert_eq!(document.issued_on, "17 Agustus 2024");
        assert_eq!(document.issued_stamp, "17/08/2024 10:05");
        assert_eq!(document.valid_until.as_deref(), Some("31 Januari 2025"));
        assert_eq!(document.student.birth_place_and_date, "Bandung, 9 Maret 2007");
        assert!(!document.revoked);

        let row = document.rows.first().expect("one row");
        assert_eq!(row.position, 1);
        assert_eq!(row.competition, "Olimpiade Sains Nasional Bi...");
        assert_eq!(row.organizer, "Kementerian Pendidi...");
        assert_eq!(row.category, "Akademik");
        assert_eq!(row.level, "Nasional");
    }

    #[rstest]
    fn assemble_without_birth_date_prints_place_only(settings: DocumentSettings) {
        let detail = detail_with("Lomba", None);
        let document = CertificateDocument::assemble(&detail, &settings);
        assert_eq!(document.student.birth_place_and_date, "Bandung");
    }

    #[rstest]
    fn assemble_marks_revoked(settings: DocumentSettings) {
        let mut detail = detail_with("Lomba", None);
        detail
            .summary
            .certificate
            .revoke()
            .expect("active certificate");
        let document = CertificateDocument::assemble(&detail, &settings);
        assert!(document.revoked);
    }
}
