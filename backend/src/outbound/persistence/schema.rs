//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Staff accounts that issue and revoke certificates.
    users (id) {
        id -> Uuid,
        full_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student profiles. `nisn` is unique across the table.
    students (id) {
        id -> Uuid,
        nisn -> Varchar,
        full_name -> Varchar,
        birth_place -> Varchar,
        birth_date -> Nullable<Date>,
        gender -> Varchar,
        class_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    achievement_categories (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    competition_levels (id) {
        id -> Int4,
        name -> Varchar,
        rank_order -> Int4,
    }
}

diesel::table! {
    /// Competition results recorded for a single student.
    achievements (id) {
        id -> Uuid,
        student_id -> Uuid,
        competition_name -> Varchar,
        organizer -> Varchar,
        category_id -> Nullable<Int4>,
        rank -> Varchar,
        level_id -> Nullable<Int4>,
        year -> Int4,
        description -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Evidence files attached to an achievement.
    achievement_attachments (id) {
        id -> Uuid,
        achievement_id -> Uuid,
        file_url -> Text,
        file_name -> Varchar,
        file_type -> Varchar,
        label -> Varchar,
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued certificates.
    ///
    /// `certificate_number` and `verification_token` carry unique constraints
    /// (`certificates_number_key`, `certificates_verification_token_key`);
    /// `status` is checked to `active` or `revoked`.
    certificates (id) {
        id -> Uuid,
        student_id -> Uuid,
        certificate_number -> Varchar,
        issued_at -> Timestamptz,
        issued_by -> Nullable<Uuid>,
        valid_until -> Nullable<Date>,
        verification_token -> Varchar,
        pdf_url -> Nullable<Text>,
        status -> Varchar,
        notes -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Join rows linking a certificate to the achievements it lists.
    certificate_achievements (certificate_id, achievement_id) {
        certificate_id -> Uuid,
        achievement_id -> Uuid,
    }
}

diesel::joinable!(achievements -> students (student_id));
diesel::joinable!(achievements -> achievement_categories (category_id));
diesel::joinable!(achievements -> competition_levels (level_id));
diesel::joinable!(achievement_attachments -> achievements (achievement_id));
diesel::joinable!(certificates -> students (student_id));
diesel::joinable!(certificates -> users (issued_by));
diesel::joinable!(certificate_achievements -> certificates (certificate_id));
diesel::joinable!(certificate_achievements -> achievements (achievement_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    students,
    achievement_categories,
    competition_levels,
    achievements,
    achievement_attachments,
    certificates,
    certificate_achievements,
);
