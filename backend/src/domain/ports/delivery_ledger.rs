//! Port recording the outcome of each notification delivery.
//!
//! Records are written after the fact; nothing replays them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{SightingId, SubscriptionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors exposed when writing delivery records.
    pub enum DeliveryLedgerError {
        /// Ledger storage rejected the write.
        Write { message: String } =>
            "delivery ledger write failed: {message}",
    }
}

/// Why a delivery ended without success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DeliveryFailureKind {
    /// The subscriber has no address on file.
    MissingAddress,
    /// The channel refused the message permanently.
    Rejected,
    /// Every allowed attempt failed transiently.
    RetryExhausted,
    /// The dispatcher could not run the delivery (for example a closed
    /// semaphore).
    Internal,
}

impl DeliveryFailureKind {
    /// Stable label used by storage and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingAddress => "missing_address",
            Self::Rejected => "rejected",
            Self::RetryExhausted => "retry_exhausted",
            Self::Internal => "internal",
        }
    }
}

/// Final state of one subscriber's delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed {
        kind: DeliveryFailureKind,
        reason: String,
    },
}

impl DeliveryStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Stable label used by storage.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed { .. } => "failed",
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub sighting_id: SightingId,
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub status: DeliveryStatus,
    /// Channel calls made, zero when nothing was sent.
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryLedger: Send + Sync {
    /// Append one delivery outcome.
    async fn record(&self, record: &DeliveryRecord) -> Result<(), DeliveryLedgerError>;
}

/// Ledger that discards records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDeliveryLedger;

#[async_trait]
impl DeliveryLedger for NoOpDeliveryLedger {
    async fn record(&self, _record: &DeliveryRecord) -> Result<(), DeliveryLedgerError> {
        Ok(())
    }
}
