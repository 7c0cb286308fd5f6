//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: Diesel/PostgreSQL and in-memory repositories, plus the
//!   delivery ledger.
//! - **notification**: transports behind the notification channel port.
//! - **queue**: the in-process dispatch queue and its worker.
//! - **metrics**: Prometheus delivery counters (feature-gated).
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod notification;
pub mod persistence;
pub mod queue;
