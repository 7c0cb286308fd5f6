//! In-process dispatch queue backed by a bounded Tokio channel.
//!
//! [`TokioDispatchQueue`] is the ingest side: `enqueue` never waits, so a
//! full queue is reported immediately instead of stalling the request.
//! [`DispatchWorker`] is the consuming side: it spawns one fan-out task per
//! event and, once every sender has been dropped, waits for the in-flight
//! fan-outs before returning. Nothing is persisted; events still queued when
//! the process stops are lost.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use crate::domain::ports::{DispatchQueue, DispatchQueueError};
use crate::domain::{NotificationDispatcher, SightingRecorded, TraceId};

/// Queue capacity used when none is configured.
pub const DEFAULT_DISPATCH_QUEUE_CAPACITY: usize = 1024;

/// Sending half of the dispatch queue.
#[derive(Debug, Clone)]
pub struct TokioDispatchQueue {
    sender: mpsc::Sender<SightingRecorded>,
}

/// Receiving half of the dispatch queue, consumed by [`DispatchWorker`].
#[derive(Debug)]
pub struct DispatchReceiver {
    receiver: mpsc::Receiver<SightingRecorded>,
}

impl TokioDispatchQueue {
    /// Create a queue holding at most `capacity` pending events.
    ///
    /// A zero capacity is raised to one, the smallest channel Tokio accepts.
    pub fn bounded(capacity: usize) -> (Self, DispatchReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, DispatchReceiver { receiver })
    }
}

#[async_trait]
impl DispatchQueue for TokioDispatchQueue {
    async fn enqueue(&self, event: SightingRecorded) -> Result<(), DispatchQueueError> {
        self.sender.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => DispatchQueueError::full(),
            TrySendError::Closed(_) => DispatchQueueError::closed(),
        })
    }
}

/// Background consumer running the dispatcher for each queued event.
pub struct DispatchWorker {
    receiver: DispatchReceiver,
    dispatcher: Arc<NotificationDispatcher>,
}

impl DispatchWorker {
    pub fn new(receiver: DispatchReceiver, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            receiver,
            dispatcher,
        }
    }

    /// Run the worker on the current Tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Consume events until the queue closes, then wait for in-flight
    /// fan-outs to finish.
    pub async fn run(self) {
        let Self {
            mut receiver,
            dispatcher,
        } = self;
        let mut in_flight = JoinSet::new();

        while let Some(event) = receiver.receiver.recv().await {
            in_flight.spawn(dispatch_event(Arc::clone(&dispatcher), event));
            // Reap finished fan-outs so the set does not grow without bound.
            while in_flight.try_join_next().is_some() {}
        }

        while let Some(result) = in_flight.join_next().await {
            if let Err(err) = result {
                warn!(error = %err, "dispatch task ended abnormally");
            }
        }
        info!("dispatch queue closed; worker stopped");
    }
}

async fn dispatch_event(dispatcher: Arc<NotificationDispatcher>, event: SightingRecorded) {
    let trace_id = event.trace_id;
    TraceId::scope_optional(trace_id, async move {
        let sighting_id = event.sighting.id();
        match dispatcher.dispatch(&event).await {
            Ok(report) => info!(
                %sighting_id,
                subscribers = report.len(),
                delivered = report.delivered(),
                failed = report.failed(),
                "sighting fan-out finished"
            ),
            Err(err) => error!(
                %sighting_id,
                code = ?err.code(),
                message = err.message(),
                "sighting fan-out aborted"
            ),
        }
    })
    .await;
}
