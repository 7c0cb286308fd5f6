//! Fan-out summaries returned by the dispatcher.
//!
//! Reports exist for logs and tests. Nothing on the request path reads them.

use crate::domain::ports::{DeliveryFailureKind, DeliveryStatus};
use crate::domain::{SightingId, SubscriptionId, UserId};

/// Outcome of one subscriber's delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Subscription the notification was sent for.
    pub subscription_id: SubscriptionId,
    /// Owner of the subscription, which may no longer exist.
    pub user_id: UserId,
    /// Final status after retries were exhausted or the send succeeded.
    pub status: DeliveryStatus,
    /// Channel calls made for this subscriber.
    pub attempts: u32,
}

impl DeliveryOutcome {
    /// Why delivery failed, or `None` when it succeeded.
    pub fn failure_kind(&self) -> Option<DeliveryFailureKind> {
        match &self.status {
            DeliveryStatus::Delivered => None,
            DeliveryStatus::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Result of fanning one sighting out to its subscribers.
///
/// Holds exactly one outcome per subscription returned by the index, in index
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    /// Sighting that was fanned out.
    pub sighting_id: SightingId,
    /// One entry per subscriber, in index order.
    pub outcomes: Vec<DeliveryOutcome>,
}

impl FanOutReport {
    /// Number of subscribers the fan-out covered.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the sighting had no subscribers.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of subscribers whose notification was accepted.
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_delivered())
            .count()
    }

    /// Number of subscribers whose delivery failed for any reason.
    pub fn failed(&self) -> usize {
        self.len() - self.delivered()
    }

    /// Total channel calls across every subscriber.
    pub fn total_attempts(&self) -> u32 {
        self.outcomes.iter().map(|outcome| outcome.attempts).sum()
    }
}
