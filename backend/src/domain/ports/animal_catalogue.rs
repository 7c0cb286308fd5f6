//! Driving port for managing animal reference data.

use async_trait::async_trait;

use crate::domain::{Animal, AnimalCandidate, AnimalId, Error};

/// Driving port for animal administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimalCatalogue: Send + Sync {
    /// Validate and store a new animal.
    async fn create(&self, candidate: AnimalCandidate) -> Result<Animal, Error>;

    /// Replace an existing animal. Fails with `not_found` for unknown ids.
    async fn update(&self, id: AnimalId, candidate: AnimalCandidate) -> Result<Animal, Error>;

    async fn get(&self, id: AnimalId) -> Result<Animal, Error>;

    async fn list(&self) -> Result<Vec<Animal>, Error>;

    /// Remove an animal. Sightings and subscriptions that reference it are
    /// left untouched.
    async fn delete(&self, id: AnimalId) -> Result<(), Error>;
}
