//! Driving port for the minimal user directory.

use async_trait::async_trait;

use crate::domain::{Error, User, UserCandidate, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Register a user so their address can receive notifications.
    async fn register(&self, candidate: UserCandidate) -> Result<User, Error>;

    async fn get(&self, id: UserId) -> Result<User, Error>;
}
