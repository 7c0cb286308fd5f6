//! Shared test doubles for notification dispatch tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{NotificationChannel, NotificationChannelError};
use crate::domain::{BackoffJitter, DeliverySleeper, OutboundMessage};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex poisoned"),
    }
}

/// Clock frozen at a chosen instant until advanced.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0, "clock") += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl DeliverySleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Sleeper that records requested delays without waiting.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0, "sleeper").clone()
    }
}

#[async_trait]
impl DeliverySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0, "sleeper").push(duration);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl BackoffJitter for NoJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32, _now: DateTime<Utc>) -> Duration {
        base
    }
}

/// Notification channel that records every call and replays scripted
/// results per recipient.
///
/// Recipients without a script succeed. A recipient marked with
/// [`RecordingChannel::fail_always`] fails every call once its script runs
/// out.
#[derive(Default)]
pub struct RecordingChannel {
    scripts: Mutex<HashMap<String, VecDeque<Result<(), NotificationChannelError>>>>,
    persistent_failures: Mutex<HashMap<String, NotificationChannelError>>,
    calls: Mutex<Vec<OutboundMessage>>,
    latency: Option<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each call for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue results returned, in order, for calls addressed to `recipient`.
    pub fn script(
        &self,
        recipient: &str,
        results: impl IntoIterator<Item = Result<(), NotificationChannelError>>,
    ) {
        lock(&self.scripts, "scripts")
            .entry(recipient.to_owned())
            .or_default()
            .extend(results);
    }

    /// Fail every unscripted call to `recipient` with `error`.
    pub fn fail_always(&self, recipient: &str, error: NotificationChannelError) {
        lock(&self.persistent_failures, "failures").insert(recipient.to_owned(), error);
    }

    /// Every message passed to `send`, in call order.
    pub fn calls(&self) -> Vec<OutboundMessage> {
        lock(&self.calls, "calls").clone()
    }

    /// Number of calls addressed to `recipient`.
    pub fn calls_to(&self, recipient: &str) -> usize {
        lock(&self.calls, "calls")
            .iter()
            .filter(|message| message.to.as_ref() == recipient)
            .count()
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn next_result(&self, recipient: &str) -> Result<(), NotificationChannelError> {
        let scripted = lock(&self.scripts, "scripts")
            .get_mut(recipient)
            .and_then(VecDeque::pop_front);
        if let Some(result) = scripted {
            return result;
        }
        match lock(&self.persistent_failures, "failures").get(recipient) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationChannelError> {
        lock(&self.calls, "calls").push(message.clone());
        let active_now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active_now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.next_result(message.to.as_ref())
    }
}
