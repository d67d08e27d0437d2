//! Achievement ledger library modules.
//!
//! The crate is organised as a hexagon: `domain` holds entities, services
//! and ports, `inbound` exposes them over HTTP, and `outbound` provides the
//! PostgreSQL, storage and document rendering adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

#[cfg(test)]
pub(crate) mod test_support;
