//! Shared builders for unit tests across the domain and adapters.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Achievement, AchievementId, AchievementView, AchievementWithAttachments, Certificate,
    CertificateDetail, CertificateDraft, CertificateId, CertificateNumber, CertificateSummary,
    DocumentSettings, OfficeCode, SchoolProfile, Student, StudentId, UserId, VerificationToken,
    VerificationUrlBuilder,
};

pub(crate) const SAMPLE_TOKEN: &str = "00112233445566778899aabbccddeeff";

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

pub(crate) fn document_settings() -> DocumentSettings {
    DocumentSettings {
        school: SchoolProfile {
            name: "SMA Negeri 1".to_owned(),
            address: "Jl. Pendidikan No. 1".to_owned(),
            headmaster_name: "Kepala Sekolah".to_owned(),
            headmaster_nip: None,
        },
        verification_urls: VerificationUrlBuilder::new("http://localhost:8080")
            .expect("valid fixture url"),
    }
}

pub(crate) fn sample_student() -> Student {
    Student {
        id: StudentId::random(),
        nisn: "1234567890".to_owned(),
        full_name: "Budi Santoso".to_owned(),
        birth_place: "Surabaya".to_owned(),
        birth_date: NaiveDate::from_ymd_opt(2007, 6, 1),
        gender: "L".to_owned(),
        class_name: "XI IPA 2".to_owned(),
    }
}

pub(crate) fn sample_achievement(student_id: StudentId, name: &str, year: i32) -> Achievement {
    Achievement {
        id: AchievementId::random(),
        student_id,
        competition_name: name.to_owned(),
        organizer: "Dinas Pendidikan Provinsi".to_owned(),
        category_id: Some(1),
        rank: "Juara 2".to_owned(),
        level_id: Some(2),
        year,
        description: String::new(),
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn sample_certificate(student_id: StudentId) -> Certificate {
    let issued_at = fixture_timestamp();
    Certificate::issue(CertificateDraft {
        id: CertificateId::random(),
        student_id,
        number: CertificateNumber::next_in_year(&OfficeCode::default(), 2024, 0),
        issued_at,
        issued_by: Some(UserId::random()),
        valid_until: None,
        verification_token: VerificationToken::parse(SAMPLE_TOKEN).expect("valid token"),
        notes: String::new(),
    })
}

pub(crate) fn sample_summary(certificate: Certificate, student: &Student) -> CertificateSummary {
    CertificateSummary {
        certificate,
        student_name: Some(student.full_name.clone()),
        student_nisn: Some(student.nisn.clone()),
        issued_by_name: Some("Admin Kesiswaan".to_owned()),
    }
}

pub(crate) fn sample_detail(
    certificate: Certificate,
    student: Student,
    achievements: Vec<Achievement>,
) -> CertificateDetail {
    CertificateDetail {
        summary: sample_summary(certificate, &student),
        student,
        achievements: achievements
            .into_iter()
            .map(|achievement| AchievementWithAttachments {
                view: AchievementView {
                    achievement,
                    category_name: Some("Akademik".to_owned()),
                    level_name: Some("Provinsi".to_owned()),
                },
                attachments: Vec::new(),
            })
            .collect(),
    }
}
