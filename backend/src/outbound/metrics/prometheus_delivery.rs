//! Prometheus adapter for notification delivery counters.
//!
//! `notification_deliveries_total` counts outcomes by status and failure
//! kind; `notification_delivery_attempts_total` counts channel calls so retry
//! pressure is visible separately from outcomes.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{
    DeliveryFailure, DeliveryMetrics, DeliveryMetricsError, DeliverySuccess,
};

const NO_FAILURE: &str = "none";

/// Prometheus-backed recorder for delivery outcomes.
pub struct PrometheusDeliveryMetrics {
    deliveries_total: CounterVec,
    attempts_total: CounterVec,
}

impl PrometheusDeliveryMetrics {
    /// Create and register counters with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let deliveries_total = CounterVec::new(
            Opts::new(
                "notification_deliveries_total",
                "Notification deliveries by outcome",
            ),
            &["status", "kind"],
        )?;
        let attempts_total = CounterVec::new(
            Opts::new(
                "notification_delivery_attempts_total",
                "Notification channel calls by final outcome",
            ),
            &["status"],
        )?;
        registry.register(Box::new(deliveries_total.clone()))?;
        registry.register(Box::new(attempts_total.clone()))?;
        Ok(Self {
            deliveries_total,
            attempts_total,
        })
    }

    fn record(&self, status: &str, kind: &str, attempts: u32) {
        self.deliveries_total
            .with_label_values(&[status, kind])
            .inc();
        self.attempts_total
            .with_label_values(&[status])
            .inc_by(f64::from(attempts));
    }
}

#[async_trait]
impl DeliveryMetrics for PrometheusDeliveryMetrics {
    async fn record_delivered(&self, payload: &DeliverySuccess) -> Result<(), DeliveryMetricsError> {
        self.record("delivered", NO_FAILURE, payload.attempt_count);
        Ok(())
    }

    async fn record_failed(&self, payload: &DeliveryFailure) -> Result<(), DeliveryMetricsError> {
        self.record("failed", payload.kind.as_str(), payload.attempt_count);
        Ok(())
    }
}
