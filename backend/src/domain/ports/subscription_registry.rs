//! Driving port for subscription management.

use async_trait::async_trait;

use crate::domain::{Error, Subscription, SubscriptionCandidate, SubscriptionId};

/// Driving port for creating and maintaining subscriptions.
///
/// Both the user and the animal must exist when a subscription is created or
/// replaced.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    async fn create(&self, candidate: SubscriptionCandidate) -> Result<Subscription, Error>;

    async fn update(
        &self,
        id: SubscriptionId,
        candidate: SubscriptionCandidate,
    ) -> Result<Subscription, Error>;

    async fn get(&self, id: SubscriptionId) -> Result<Subscription, Error>;

    async fn list(&self) -> Result<Vec<Subscription>, Error>;

    async fn delete(&self, id: SubscriptionId) -> Result<(), Error>;
}
