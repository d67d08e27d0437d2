//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the certificate, student and achievement
//! ports backed by PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Issuance rules live in the domain service.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database failures are mapped to the port
//!   error enums, with uniqueness and foreign-key violations on certificates
//!   given their own variants.
//!
//! # Example
//!
//! ```ignore
//! use achievement_ledger::outbound::persistence::{
//!     DbPool, DieselCertificateRepository, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/ledger")).await?;
//! let certificates = DieselCertificateRepository::new(pool);
//! ```

mod diesel_achievement_repository;
mod diesel_basic_error_mapping;
mod diesel_certificate_repository;
mod diesel_student_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_achievement_repository::DieselAchievementRepository;
pub use diesel_certificate_repository::DieselCertificateRepository;
pub use diesel_student_repository::DieselStudentRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
