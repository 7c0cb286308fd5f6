//! Domain port handing recorded sightings to the dispatch worker.
use async_trait::async_trait;

use crate::domain::SightingRecorded;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by dispatch queue adapters.
    pub enum DispatchQueueError {
        /// The queue is at capacity.
        Full => "dispatch queue is full",
        /// The consuming worker has shut down.
        Closed => "dispatch queue is closed",
    }
}

/// Fire-and-forget hand-off from ingest to the notification dispatcher.
///
/// Implementations must not wait for delivery; `enqueue` returns as soon as
/// the event is accepted or refused.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    async fn enqueue(&self, event: SightingRecorded) -> Result<(), DispatchQueueError>;
}
