//! Prometheus-backed implementations of domain metrics ports.
//!
//! Compiled only with the `metrics` feature.

mod prometheus_delivery;

pub use prometheus_delivery::PrometheusDeliveryMetrics;
