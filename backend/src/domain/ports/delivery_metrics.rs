//! Domain port surface for notification delivery counters.
//!
//! Keeps delivery observability at the domain boundary so adapters can emit
//! Prometheus counters without the dispatcher knowing about exporters.

use async_trait::async_trait;

use super::{DeliveryFailureKind, define_port_error};

define_port_error! {
    /// Errors exposed when recording delivery metrics.
    pub enum DeliveryMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } =>
            "delivery metrics exporter failed: {message}",
    }
}

/// Success metric payload for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySuccess {
    /// Channel calls used, including the successful one.
    pub attempt_count: u32,
}

/// Failure metric payload for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryFailure {
    /// Channel calls made before giving up.
    pub attempt_count: u32,
    pub kind: DeliveryFailureKind,
}

/// Metrics recording port for delivery counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryMetrics: Send + Sync {
    /// Record a delivered notification.
    ///
    /// ```rust,ignore
    /// use spotting::domain::ports::{DeliveryMetrics, DeliverySuccess, NoOpDeliveryMetrics};
    ///
    /// # async fn demo() {
    /// let metrics = NoOpDeliveryMetrics;
    /// let result = metrics.record_delivered(&DeliverySuccess { attempt_count: 1 }).await;
    /// assert!(result.is_ok());
    /// # }
    /// ```
    async fn record_delivered(&self, payload: &DeliverySuccess) -> Result<(), DeliveryMetricsError>;

    /// Record a delivery that ended in failure.
    async fn record_failed(&self, payload: &DeliveryFailure) -> Result<(), DeliveryMetricsError>;
}

/// No-op implementation used when metrics are disabled or in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDeliveryMetrics;

#[async_trait]
impl DeliveryMetrics for NoOpDeliveryMetrics {
    async fn record_delivered(
        &self,
        _payload: &DeliverySuccess,
    ) -> Result<(), DeliveryMetricsError> {
        Ok(())
    }

    async fn record_failed(&self, _payload: &DeliveryFailure) -> Result<(), DeliveryMetricsError> {
        Ok(())
    }
}
