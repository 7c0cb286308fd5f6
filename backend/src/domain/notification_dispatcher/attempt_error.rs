//! Attempt-local outcomes for one channel call.
//!
//! Keeps the retry decision explicit inside the delivery loop without leaking
//! attempt-control details into the report.

use crate::domain::ports::NotificationChannelError;

pub(super) enum AttemptError {
    Retryable(NotificationChannelError),
    Rejected(NotificationChannelError),
    PermitUnavailable,
}

impl From<NotificationChannelError> for AttemptError {
    fn from(error: NotificationChannelError) -> Self {
        if error.is_retryable() {
            Self::Retryable(error)
        } else {
            Self::Rejected(error)
        }
    }
}
