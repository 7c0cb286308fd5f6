//! PostgreSQL-backed `SubscriptionRepository` implementation using Diesel ORM.
//!
//! Subscribers are resolved with a LEFT JOIN onto `users` so a subscription
//! whose owner has been removed still yields a subscriber without an address.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError};
use crate::domain::{
    AnimalId, EmailAddress, NewSubscription, Subscriber, Subscription, SubscriptionCandidate,
    SubscriptionId, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{SubscriberRow, SubscriptionRow, SubscriptionWrite};
use super::pool::{DbPool, PoolError};
use super::schema::{subscriptions, users};

/// Diesel-backed implementation of the subscription repository port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriptionRepositoryError {
    map_basic_pool_error(error, |message| {
        SubscriptionRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> SubscriptionRepositoryError {
    map_basic_diesel_error(
        error,
        SubscriptionRepositoryError::query,
        SubscriptionRepositoryError::connection,
    )
}

fn to_write(subscription: &NewSubscription) -> SubscriptionWrite<'_> {
    SubscriptionWrite {
        user_id: subscription.user_id().value(),
        animal_id: subscription.animal_id().value(),
        description: subscription.description(),
    }
}

fn row_to_subscription(row: SubscriptionRow) -> Result<Subscription, SubscriptionRepositoryError> {
    let SubscriptionRow {
        id,
        user_id,
        animal_id,
        description,
    } = row;
    let id = SubscriptionId::new(id)
        .map_err(|err| SubscriptionRepositoryError::query(err.to_string()))?;
    let subscription = NewSubscription::try_from(SubscriptionCandidate {
        user_id: Some(user_id),
        animal_id: Some(animal_id),
        description,
    })
    .map_err(|err| SubscriptionRepositoryError::query(format!("stored subscription {id}: {err}")))?;
    Ok(subscription.with_id(id))
}

/// Convert a joined row into a subscriber. An address that no longer parses
/// is treated as missing rather than failing the whole fan-out.
fn row_to_subscriber(row: SubscriberRow) -> Result<Subscriber, SubscriptionRepositoryError> {
    let SubscriberRow {
        subscription_id,
        user_id,
        description,
        email,
    } = row;
    Ok(Subscriber {
        subscription_id: SubscriptionId::new(subscription_id)
            .map_err(|err| SubscriptionRepositoryError::query(err.to_string()))?,
        user_id: UserId::new(user_id)
            .map_err(|err| SubscriptionRepositoryError::query(err.to_string()))?,
        email: email.and_then(|raw| EmailAddress::new(raw).ok()),
        description,
    })
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn create(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(subscriptions::table)
            .values(&to_write(subscription))
            .returning(SubscriptionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_subscription(row)
    }

    async fn update(
        &self,
        id: SubscriptionId,
        subscription: &NewSubscription,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(subscriptions::table.filter(subscriptions::id.eq(id.value())))
            .set(&to_write(subscription))
            .returning(SubscriptionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_subscription).transpose()
    }

    async fn find_by_id(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = subscriptions::table
            .filter(subscriptions::id.eq(id.value()))
            .select(SubscriptionRow::as_select())
            .first::<SubscriptionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_subscription).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SubscriptionRow> = subscriptions::table
            .order(subscriptions::id.asc())
            .select(SubscriptionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_subscription).collect()
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed =
            diesel::delete(subscriptions::table.filter(subscriptions::id.eq(id.value())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn subscribers_for_animal(
        &self,
        animal_id: AnimalId,
    ) -> Result<Vec<Subscriber>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SubscriberRow> = subscriptions::table
            .left_join(users::table)
            .filter(subscriptions::animal_id.eq(animal_id.value()))
            .order(subscriptions::id.asc())
            .select((
                subscriptions::id,
                subscriptions::user_id,
                subscriptions::description,
                users::email.nullable(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_subscriber).collect()
    }
}
