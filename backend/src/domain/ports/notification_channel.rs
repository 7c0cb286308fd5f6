//! Driven port for the transport that delivers notifications.
//!
//! Delivery semantics are opaque to the dispatcher beyond success, a
//! retryable failure, or a permanent rejection.

use async_trait::async_trait;

use crate::domain::OutboundMessage;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by notification transports.
    pub enum NotificationChannelError {
        /// Temporary failure; the same message may succeed later.
        Transient { message: String } =>
            "notification transport failed temporarily: {message}",
        /// The transport refused the message permanently.
        Rejected { message: String } =>
            "notification transport rejected the message: {message}",
    }
}

impl NotificationChannelError {
    /// Whether the dispatcher may retry the send.
    pub fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

/// Port accepting one rendered message per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Attempt delivery of `message`.
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationChannelError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(NotificationChannelError::transient("timeout"), true)]
    #[case(NotificationChannelError::rejected("mailbox unknown"), false)]
    fn only_transient_errors_are_retryable(
        #[case] error: NotificationChannelError,
        #[case] expected: bool,
    ) {
        assert_eq!(error.is_retryable(), expected);
    }
}
