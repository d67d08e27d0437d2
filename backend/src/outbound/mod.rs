//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **rendering**: PDF certificate drawing with an embedded QR code
//! - **storage**: local-directory object storage for rendered documents
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
pub mod rendering;
pub mod storage;
