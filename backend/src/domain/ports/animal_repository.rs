//! Port for animal reference data persistence.

use async_trait::async_trait;

use crate::domain::{Animal, AnimalId, NewAnimal};

use super::define_port_error;

define_port_error! {
    /// Errors raised by animal repository adapters.
    pub enum AnimalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "animal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "animal repository query failed: {message}",
    }
}

/// Port for storing and reading animals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    /// Insert a new animal and return it with its assigned identifier.
    async fn create(&self, animal: &NewAnimal) -> Result<Animal, AnimalRepositoryError>;

    /// Replace an existing animal. Returns `None` when `id` is unknown.
    async fn update(
        &self,
        id: AnimalId,
        animal: &NewAnimal,
    ) -> Result<Option<Animal>, AnimalRepositoryError>;

    /// Find an animal by identifier.
    async fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, AnimalRepositoryError>;

    /// All animals in identifier order.
    async fn list_all(&self) -> Result<Vec<Animal>, AnimalRepositoryError>;

    /// Delete an animal. Returns `false` when nothing was removed.
    async fn delete(&self, id: AnimalId) -> Result<bool, AnimalRepositoryError>;
}
