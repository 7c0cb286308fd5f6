//! Notification channel adapters.
//!
//! [`TracingNotificationChannel`] writes each message to the structured log
//! instead of a mail transport. Deployments that need real delivery plug in
//! their own [`NotificationChannel`] implementation.

use async_trait::async_trait;
use tracing::info;

use crate::domain::OutboundMessage;
use crate::domain::ports::{NotificationChannel, NotificationChannelError};

/// Channel that logs messages and always reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationChannel;

impl TracingNotificationChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for TracingNotificationChannel {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationChannelError> {
        info!(
            to = message.to.as_ref(),
            subject = %message.subject,
            body = %message.body,
            is_html = message.is_html,
            is_multipart = message.is_multipart,
            "notification sent"
        );
        Ok(())
    }
}
