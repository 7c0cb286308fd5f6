//! Read path resolving the subscribers of an animal.
//!
//! The dispatcher depends on this port rather than on the subscription store
//! so a cached or denormalised lookup can replace the default without touching
//! fan-out logic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AnimalId, Subscriber};

use super::{SubscriptionRepository, SubscriptionRepositoryError, define_port_error};

define_port_error! {
    /// Errors raised while resolving subscribers.
    pub enum SubscriptionIndexError {
        /// The backing store could not be reached.
        Unavailable { message: String } =>
            "subscription index is unavailable: {message}",
        /// The lookup failed while executing.
        Query { message: String } =>
            "subscription index query failed: {message}",
    }
}

/// Port answering which subscriptions follow an animal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionIndex: Send + Sync {
    /// Snapshot of the subscribers to `animal_id`, ordered by subscription
    /// identifier.
    ///
    /// Reflects every subscription committed before the call. An animal with
    /// no subscribers yields an empty vector.
    async fn subscribers_for(
        &self,
        animal_id: AnimalId,
    ) -> Result<Vec<Subscriber>, SubscriptionIndexError>;
}

/// Index that reads straight from the subscription store.
///
/// # Examples
/// ```rust,ignore
/// let index = RepositorySubscriptionIndex::new(Arc::new(repository));
/// let subscribers = index.subscribers_for(animal_id).await?;
/// ```
#[derive(Clone)]
pub struct RepositorySubscriptionIndex {
    repository: Arc<dyn SubscriptionRepository>,
}

impl RepositorySubscriptionIndex {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl SubscriptionIndex for RepositorySubscriptionIndex {
    async fn subscribers_for(
        &self,
        animal_id: AnimalId,
    ) -> Result<Vec<Subscriber>, SubscriptionIndexError> {
        self.repository
            .subscribers_for_animal(animal_id)
            .await
            .map_err(|error| match error {
                SubscriptionRepositoryError::Connection { message } => {
                    SubscriptionIndexError::unavailable(message)
                }
                SubscriptionRepositoryError::Query { message } => {
                    SubscriptionIndexError::query(message)
                }
            })
    }
}
