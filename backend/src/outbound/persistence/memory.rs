//! In-memory repository adapters for development and tests.
//!
//! All repositories handed out by one [`InMemoryDatabase`] share the same
//! tables, so subscribers resolve addresses from the user table exactly as the
//! Diesel adapter's join does. Identifiers are allocated per table starting at
//! one and are never reused.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AnimalRepository, AnimalRepositoryError, DeliveryLedger, DeliveryLedgerError, DeliveryRecord,
    SightingRepository, SightingRepositoryError, SubscriptionRepository,
    SubscriptionRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Animal, AnimalId, InvalidEntityId, NewAnimal, NewSighting, NewSubscription, NewUser,
    Sighting, SightingId, Subscriber, Subscription, SubscriptionId, User, UserId,
};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Replace an existing row, leaving absent ids untouched.
    fn replace(&mut self, id: i64, row: T) -> Option<T> {
        let slot = self.rows.get_mut(&id)?;
        *slot = row.clone();
        Some(row)
    }

    fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    animals: Table<Animal>,
    subscriptions: Table<Subscription>,
    sightings: Table<Sighting>,
    /// Append-only and never pruned. The in-memory store serves development
    /// runs and tests; production deployments record deliveries in
    /// PostgreSQL.
    deliveries: Vec<DeliveryRecord>,
}

/// Shared in-memory store backing every repository it hands out.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animals(&self) -> InMemoryAnimalRepository {
        InMemoryAnimalRepository { db: self.clone() }
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository { db: self.clone() }
    }

    pub fn subscriptions(&self) -> InMemorySubscriptionRepository {
        InMemorySubscriptionRepository { db: self.clone() }
    }

    pub fn sightings(&self) -> InMemorySightingRepository {
        InMemorySightingRepository { db: self.clone() }
    }

    pub fn delivery_ledger(&self) -> InMemoryDeliveryLedger {
        InMemoryDeliveryLedger { db: self.clone() }
    }

    /// Delivery records written so far, in completion order.
    pub fn delivery_records(&self) -> Vec<DeliveryRecord> {
        self.lock()
            .map(|tables| tables.deliveries.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        self.tables
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

fn invalid_id(error: InvalidEntityId) -> String {
    error.to_string()
}

/// In-memory animal repository.
#[derive(Clone)]
pub struct InMemoryAnimalRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl AnimalRepository for InMemoryAnimalRepository {
    async fn create(&self, animal: &NewAnimal) -> Result<Animal, AnimalRepositoryError> {
        let mut tables = self.db.lock().map_err(AnimalRepositoryError::query)?;
        let raw = tables.animals.allocate();
        let id = AnimalId::new(raw).map_err(|err| AnimalRepositoryError::query(invalid_id(err)))?;
        let stored = animal.clone().with_id(id);
        tables.animals.rows.insert(raw, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: AnimalId,
        animal: &NewAnimal,
    ) -> Result<Option<Animal>, AnimalRepositoryError> {
        let mut tables = self.db.lock().map_err(AnimalRepositoryError::query)?;
        Ok(tables
            .animals
            .replace(id.value(), animal.clone().with_id(id)))
    }

    async fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, AnimalRepositoryError> {
        let tables = self.db.lock().map_err(AnimalRepositoryError::query)?;
        Ok(tables.animals.get(id.value()))
    }

    async fn list_all(&self) -> Result<Vec<Animal>, AnimalRepositoryError> {
        let tables = self.db.lock().map_err(AnimalRepositoryError::query)?;
        Ok(tables.animals.all())
    }

    async fn delete(&self, id: AnimalId) -> Result<bool, AnimalRepositoryError> {
        let mut tables = self.db.lock().map_err(AnimalRepositoryError::query)?;
        Ok(tables.animals.remove(id.value()))
    }
}

/// In-memory user repository enforcing unique logins.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut tables = self.db.lock().map_err(UserRepositoryError::query)?;
        let login = user.login();
        if tables
            .users
            .rows
            .values()
            .any(|existing| existing.login() == login)
        {
            return Err(UserRepositoryError::duplicate_login(login.as_ref()));
        }
        let raw = tables.users.allocate();
        let id = UserId::new(raw).map_err(|err| UserRepositoryError::query(invalid_id(err)))?;
        let stored = user.clone().with_id(id);
        tables.users.rows.insert(raw, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.db.lock().map_err(UserRepositoryError::query)?;
        Ok(tables.users.get(id.value()))
    }
}

/// In-memory subscription repository.
#[derive(Clone)]
pub struct InMemorySubscriptionRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let mut tables = self.db.lock().map_err(SubscriptionRepositoryError::query)?;
        let raw = tables.subscriptions.allocate();
        let id = SubscriptionId::new(raw)
            .map_err(|err| SubscriptionRepositoryError::query(invalid_id(err)))?;
        let stored = subscription.clone().with_id(id);
        tables.subscriptions.rows.insert(raw, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: SubscriptionId,
        subscription: &NewSubscription,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let mut tables = self.db.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(tables
            .subscriptions
            .replace(id.value(), subscription.clone().with_id(id)))
    }

    async fn find_by_id(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let tables = self.db.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(tables.subscriptions.get(id.value()))
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        let tables = self.db.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(tables.subscriptions.all())
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, SubscriptionRepositoryError> {
        let mut tables = self.db.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(tables.subscriptions.remove(id.value()))
    }

    async fn subscribers_for_animal(
        &self,
        animal_id: AnimalId,
    ) -> Result<Vec<Subscriber>, SubscriptionRepositoryError> {
        let tables = self.db.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(tables
            .subscriptions
            .rows
            .values()
            .filter(|subscription| subscription.animal_id() == animal_id)
            .map(|subscription| Subscriber {
                subscription_id: subscription.id(),
                user_id: subscription.user_id(),
                email: tables
                    .users
                    .rows
                    .get(&subscription.user_id().value())
                    .and_then(|user| user.email().cloned()),
                description: subscription.description().map(str::to_owned),
            })
            .collect())
    }
}

/// In-memory sighting repository.
#[derive(Clone)]
pub struct InMemorySightingRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl SightingRepository for InMemorySightingRepository {
    async fn create(
        &self,
        sighting: &NewSighting,
        recorded_at: DateTime<Utc>,
    ) -> Result<Sighting, SightingRepositoryError> {
        let mut tables = self.db.lock().map_err(SightingRepositoryError::query)?;
        let raw = tables.sightings.allocate();
        let id =
            SightingId::new(raw).map_err(|err| SightingRepositoryError::query(invalid_id(err)))?;
        let stored = sighting.clone().into_stored(id, recorded_at);
        tables.sightings.rows.insert(raw, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: SightingId,
        sighting: &NewSighting,
    ) -> Result<Option<Sighting>, SightingRepositoryError> {
        let mut tables = self.db.lock().map_err(SightingRepositoryError::query)?;
        let Some(recorded_at) = tables
            .sightings
            .rows
            .get(&id.value())
            .map(Sighting::recorded_at)
        else {
            return Ok(None);
        };
        Ok(tables
            .sightings
            .replace(id.value(), sighting.clone().into_stored(id, recorded_at)))
    }

    async fn find_by_id(
        &self,
        id: SightingId,
    ) -> Result<Option<Sighting>, SightingRepositoryError> {
        let tables = self.db.lock().map_err(SightingRepositoryError::query)?;
        Ok(tables.sightings.get(id.value()))
    }

    async fn list_all(&self) -> Result<Vec<Sighting>, SightingRepositoryError> {
        let tables = self.db.lock().map_err(SightingRepositoryError::query)?;
        Ok(tables.sightings.all())
    }

    async fn delete(&self, id: SightingId) -> Result<bool, SightingRepositoryError> {
        let mut tables = self.db.lock().map_err(SightingRepositoryError::query)?;
        Ok(tables.sightings.remove(id.value()))
    }
}

/// In-memory delivery ledger.
#[derive(Clone)]
pub struct InMemoryDeliveryLedger {
    db: InMemoryDatabase,
}

#[async_trait]
impl DeliveryLedger for InMemoryDeliveryLedger {
    async fn record(&self, record: &DeliveryRecord) -> Result<(), DeliveryLedgerError> {
        let mut tables = self.db.lock().map_err(DeliveryLedgerError::write)?;
        tables.deliveries.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
