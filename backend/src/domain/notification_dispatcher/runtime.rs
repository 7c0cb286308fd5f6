//! Port and runtime dependency bundles for the notification dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::domain::ports::{
    DeliveryLedger, DeliveryMetrics, NoOpDeliveryLedger, NoOpDeliveryMetrics, NotificationChannel,
    SubscriptionIndex,
};

use super::{BackoffJitter, DeliverySleeper};

/// Port bundle required by the dispatcher.
pub struct DispatcherPorts {
    /// Subscriber lookup.
    pub index: Arc<dyn SubscriptionIndex>,
    /// Outbound notification transport.
    pub channel: Arc<dyn NotificationChannel>,
    /// Delivery outcome ledger.
    pub ledger: Arc<dyn DeliveryLedger>,
    /// Delivery counters.
    pub metrics: Arc<dyn DeliveryMetrics>,
}

impl DispatcherPorts {
    /// Bundle the index and channel with no-op ledger and metrics.
    pub fn new(index: Arc<dyn SubscriptionIndex>, channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            index,
            channel,
            ledger: Arc::new(NoOpDeliveryLedger),
            metrics: Arc::new(NoOpDeliveryMetrics),
        }
    }

    /// Record every delivery outcome in `ledger`.
    pub fn with_ledger(mut self, ledger: Arc<dyn DeliveryLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Report delivery counts to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn DeliveryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Runtime helpers used by the retry policy.
pub struct DispatcherRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn DeliverySleeper>,
    /// Jitter strategy for retry delays.
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for DispatcherRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl DeliverySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds up to a quarter of the base delay, drawn from the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32, _now: DateTime<Utc>) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = (base_ms / 4).max(1);
        let extra = rand::thread_rng().gen_range(0..=max_extra);
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Duration::from_millis(200))]
    #[case(Duration::from_millis(3))]
    fn random_jitter_stays_within_a_quarter(#[case] base: Duration) {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid time");
        let ceiling = base + Duration::from_millis((base.as_millis() as u64 / 4).max(1));
        for attempt in 1..=20 {
            let delay = RandomJitter.jittered_delay(base, attempt, now);
            assert!(delay >= base, "delay {delay:?} below base {base:?}");
            assert!(delay <= ceiling, "delay {delay:?} above {ceiling:?}");
        }
    }
}
