//! Domain service fanning recorded sightings out to subscribers.
//!
//! The dispatcher owns call admission (a semaphore shared by every fan-out),
//! retry policy (jittered exponential backoff for transient channel errors),
//! and per-subscriber failure isolation. One subscriber's failure never stops
//! delivery to the others.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use mockable::Clock;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    DeliveryFailure, DeliveryFailureKind, DeliveryLedger, DeliveryMetrics, DeliveryRecord,
    DeliveryStatus, DeliverySuccess, NotificationChannel, SubscriptionIndex,
    SubscriptionIndexError,
};
use crate::domain::{Error, OutboundMessage, SightingNotification, SightingRecorded, Subscriber};

mod attempt_error;
mod report;
mod runtime;

use attempt_error::AttemptError;
pub use report::{DeliveryOutcome, FanOutReport};
pub use runtime::{DispatcherPorts, DispatcherRuntime, RandomJitter, TokioSleeper};

/// Dispatcher configuration controlling concurrency and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Concurrent channel calls allowed across all fan-outs.
    pub max_concurrent_deliveries: usize,
    /// Maximum channel calls per subscriber (including the first).
    pub max_attempts: u32,
    /// Initial retry backoff.
    pub initial_backoff: Duration,
    /// Maximum retry backoff cap.
    pub max_backoff: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deliveries: 4,
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Async clock-independent sleeping abstraction for retries.
#[async_trait]
pub trait DeliverySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Retry backoff jitter abstraction.
pub trait BackoffJitter: Send + Sync {
    /// Return a jittered delay from the exponential base delay.
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use spotting::domain::BackoffJitter;
    /// use std::time::Duration;
    ///
    /// struct FixedOffset;
    /// impl BackoffJitter for FixedOffset {
    ///     fn jittered_delay(&self, base: Duration, attempt: u32, _now: chrono::DateTime<Utc>) -> Duration {
    ///         base + Duration::from_millis(u64::from(attempt) * 5)
    ///     }
    /// }
    /// let now = Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).single().expect("valid time");
    /// assert_eq!(
    ///     FixedOffset.jittered_delay(Duration::from_millis(100), 2, now),
    ///     Duration::from_millis(110)
    /// );
    /// ```
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration;
}

/// Domain-owned notification fan-out service.
pub struct NotificationDispatcher {
    index: Arc<dyn SubscriptionIndex>,
    channel: Arc<dyn NotificationChannel>,
    ledger: Arc<dyn DeliveryLedger>,
    metrics: Arc<dyn DeliveryMetrics>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn DeliverySleeper>,
    jitter: Arc<dyn BackoffJitter>,
    delivery_semaphore: Arc<Semaphore>,
    config: DispatcherConfig,
}

impl NotificationDispatcher {
    /// Build a dispatcher using default runtime dependencies.
    /// ```rust,ignore
    /// let dispatcher = NotificationDispatcher::new(ports, clock, DispatcherConfig::default());
    /// ```
    pub fn new(ports: DispatcherPorts, clock: Arc<dyn Clock>, config: DispatcherConfig) -> Self {
        Self::with_runtime(ports, clock, DispatcherRuntime::default(), config)
    }

    /// Build a dispatcher with injected runtime abstractions.
    pub fn with_runtime(
        ports: DispatcherPorts,
        clock: Arc<dyn Clock>,
        runtime: DispatcherRuntime,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            index: ports.index,
            channel: ports.channel,
            ledger: ports.ledger,
            metrics: ports.metrics,
            clock,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            delivery_semaphore: Arc::new(Semaphore::new(config.max_concurrent_deliveries.max(1))),
            config,
        }
    }

    /// Notify every subscriber of the sighted animal.
    ///
    /// Fails only when the subscriber set cannot be resolved, in which case
    /// nothing is sent. Individual delivery failures are reported in the
    /// returned [`FanOutReport`].
    /// ```rust,ignore
    /// let report = dispatcher.dispatch(&event).await?;
    /// assert_eq!(report.len(), subscriber_count);
    /// ```
    pub async fn dispatch(&self, event: &SightingRecorded) -> Result<FanOutReport, Error> {
        let sighting_id = event.sighting.id();
        let animal_id = event.sighting.animal_id();

        let subscribers = self
            .index
            .subscribers_for(animal_id)
            .await
            .map_err(|error| {
                warn!(%sighting_id, %animal_id, %error, "subscriber lookup failed; nothing sent");
                map_index_error(error)
            })?;

        if subscribers.is_empty() {
            debug!(%sighting_id, %animal_id, "no subscribers for sighted animal");
            return Ok(FanOutReport {
                sighting_id,
                outcomes: Vec::new(),
            });
        }

        // Each delivery owns its failure; join_all preserves index order.
        let outcomes = join_all(
            subscribers
                .iter()
                .map(|subscriber| self.deliver(event, subscriber)),
        )
        .await;

        let report = FanOutReport {
            sighting_id,
            outcomes,
        };
        info!(
            %sighting_id,
            %animal_id,
            subscribers = report.len(),
            delivered = report.delivered(),
            failed = report.failed(),
            "sighting fan-out finished"
        );
        Ok(report)
    }

    async fn deliver(&self, event: &SightingRecorded, subscriber: &Subscriber) -> DeliveryOutcome {
        let (status, attempts) = match SightingNotification::for_subscriber(event, subscriber) {
            Some(notification) => self.send_with_retry(&notification.render()).await,
            None => (
                DeliveryStatus::Failed {
                    kind: DeliveryFailureKind::MissingAddress,
                    reason: "subscriber has no email address".to_owned(),
                },
                0,
            ),
        };

        let outcome = DeliveryOutcome {
            subscription_id: subscriber.subscription_id,
            user_id: subscriber.user_id,
            status,
            attempts,
        };
        self.log_outcome(event, &outcome);
        self.record_outcome(event, &outcome).await;
        outcome
    }

    async fn send_with_retry(&self, message: &OutboundMessage) -> (DeliveryStatus, u32) {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.run_single_attempt(message).await {
                Ok(()) => return (DeliveryStatus::Delivered, attempt),
                Err(AttemptError::Retryable(error)) if attempt < max_attempts => {
                    let base_delay = self.retry_base_delay(attempt);
                    let delay = self
                        .jitter
                        .jittered_delay(base_delay, attempt, self.clock.utc());
                    debug!(attempt, ?delay, %error, "transient delivery failure; retrying");
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(AttemptError::Retryable(error)) => {
                    return (
                        DeliveryStatus::Failed {
                            kind: DeliveryFailureKind::RetryExhausted,
                            reason: error.to_string(),
                        },
                        attempt,
                    );
                }
                Err(AttemptError::Rejected(error)) => {
                    return (
                        DeliveryStatus::Failed {
                            kind: DeliveryFailureKind::Rejected,
                            reason: error.to_string(),
                        },
                        attempt,
                    );
                }
                Err(AttemptError::PermitUnavailable) => {
                    return (
                        DeliveryStatus::Failed {
                            kind: DeliveryFailureKind::Internal,
                            reason: "delivery semaphore closed".to_owned(),
                        },
                        attempt - 1,
                    );
                }
            }
        }
    }

    async fn run_single_attempt(&self, message: &OutboundMessage) -> Result<(), AttemptError> {
        let _permit = self
            .delivery_semaphore
            .acquire()
            .await
            .map_err(|_| AttemptError::PermitUnavailable)?;
        self.channel.send(message).await.map_err(AttemptError::from)
    }

    fn log_outcome(&self, event: &SightingRecorded, outcome: &DeliveryOutcome) {
        let sighting_id = event.sighting.id();
        let subscription_id = outcome.subscription_id;
        match &outcome.status {
            DeliveryStatus::Delivered => debug!(
                %sighting_id,
                %subscription_id,
                attempts = outcome.attempts,
                "notification delivered"
            ),
            DeliveryStatus::Failed { kind, reason } => warn!(
                %sighting_id,
                %subscription_id,
                attempts = outcome.attempts,
                kind = kind.as_str(),
                reason = reason.as_str(),
                "notification delivery failed"
            ),
        }
    }

    async fn record_outcome(&self, event: &SightingRecorded, outcome: &DeliveryOutcome) {
        let record = DeliveryRecord {
            sighting_id: event.sighting.id(),
            subscription_id: outcome.subscription_id,
            user_id: outcome.user_id,
            status: outcome.status.clone(),
            attempts: outcome.attempts,
            completed_at: self.clock.utc(),
        };
        if let Err(error) = self.ledger.record(&record).await {
            warn!(%error, subscription_id = %outcome.subscription_id, "delivery ledger write failed");
        }

        // Exporter errors never affect delivery.
        let _ = match outcome.failure_kind() {
            None => {
                self.metrics
                    .record_delivered(&DeliverySuccess {
                        attempt_count: outcome.attempts,
                    })
                    .await
            }
            Some(kind) => {
                self.metrics
                    .record_failed(&DeliveryFailure {
                        attempt_count: outcome.attempts,
                        kind,
                    })
                    .await
            }
        };
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

fn map_index_error(error: SubscriptionIndexError) -> Error {
    match error {
        SubscriptionIndexError::Unavailable { message } => {
            Error::service_unavailable(format!("subscription index unavailable: {message}"))
        }
        SubscriptionIndexError::Query { message } => {
            Error::internal(format!("subscription index error: {message}"))
        }
    }
}
