//! Port for subscription persistence and the subscriber lookup used by
//! dispatch.

use async_trait::async_trait;

use crate::domain::{AnimalId, NewSubscription, Subscriber, Subscription, SubscriptionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscription repository adapters.
    pub enum SubscriptionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "subscription repository query failed: {message}",
    }
}

/// Port for storing subscriptions and answering "who follows animal X".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription and return it with its assigned identifier.
    async fn create(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError>;

    /// Replace an existing subscription. Returns `None` when `id` is unknown.
    async fn update(
        &self,
        id: SubscriptionId,
        subscription: &NewSubscription,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError>;

    async fn find_by_id(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError>;

    /// All subscriptions in identifier order.
    async fn list_all(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError>;

    /// Delete a subscription. Returns `false` when nothing was removed.
    async fn delete(&self, id: SubscriptionId) -> Result<bool, SubscriptionRepositoryError>;

    /// Subscriptions to `animal_id` joined with each owner's address,
    /// ordered by subscription identifier.
    ///
    /// Owners missing from the user directory yield `email: None`.
    async fn subscribers_for_animal(
        &self,
        animal_id: AnimalId,
    ) -> Result<Vec<Subscriber>, SubscriptionRepositoryError>;
}
