//! Animal spotting backend library.
//!
//! Sightings are ingested through the domain services, persisted through
//! repository ports, and fanned out to subscribers by the notification
//! dispatcher. Adapters live under [`inbound`] and [`outbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
