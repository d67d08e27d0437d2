//! HTTP inbound adapter exposing REST endpoints.
//!
//! ```text
//! POST /api/v1/certificates
//! GET  /api/v1/certificates
//! GET  /api/v1/certificates/{id}
//! GET  /api/v1/certificates/{id}/download
//! POST /api/v1/certificates/{id}/revoke
//! GET  /api/v1/verify/{token}
//! GET  /health/ready
//! GET  /health/live
//! ```

pub mod certificate_dto;
pub mod certificates;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod verification;

pub use error::ApiResult;
