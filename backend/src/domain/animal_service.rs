//! Animal catalogue domain service.
//!
//! Implements the [`AnimalCatalogue`] driving port over an
//! [`AnimalRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{AnimalCatalogue, AnimalRepository, AnimalRepositoryError};
use crate::domain::{Animal, AnimalCandidate, AnimalId, AnimalValidationError, Error, NewAnimal};

pub(crate) fn map_animal_repository_error(error: AnimalRepositoryError) -> Error {
    match error {
        AnimalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("animal repository unavailable: {message}"))
        }
        AnimalRepositoryError::Query { message } => {
            Error::internal(format!("animal repository error: {message}"))
        }
    }
}

fn animal_not_found(id: AnimalId) -> Error {
    Error::not_found(format!("animal {id} not found")).with_details(json!({ "id": id.value() }))
}

fn validate(candidate: AnimalCandidate) -> Result<NewAnimal, Error> {
    NewAnimal::try_from(candidate).map_err(|err| {
        let field = match err {
            AnimalValidationError::InvalidPictureUrl { .. } => "pictureUrl",
            AnimalValidationError::EmptyName | AnimalValidationError::NameTooLong { .. } => "name",
        };
        Error::invalid_request(format!("invalid animal: {err}"))
            .with_details(json!({ "field": field }))
    })
}

/// Animal catalogue backed by a repository port.
#[derive(Clone)]
pub struct AnimalCatalogueService {
    animals: Arc<dyn AnimalRepository>,
}

impl AnimalCatalogueService {
    pub fn new(animals: Arc<dyn AnimalRepository>) -> Self {
        Self { animals }
    }
}

#[async_trait]
impl AnimalCatalogue for AnimalCatalogueService {
    async fn create(&self, candidate: AnimalCandidate) -> Result<Animal, Error> {
        let animal = validate(candidate)?;
        self.animals
            .create(&animal)
            .await
            .map_err(map_animal_repository_error)
    }

    async fn update(&self, id: AnimalId, candidate: AnimalCandidate) -> Result<Animal, Error> {
        let animal = validate(candidate)?;
        self.animals
            .update(id, &animal)
            .await
            .map_err(map_animal_repository_error)?
            .ok_or_else(|| animal_not_found(id))
    }

    async fn get(&self, id: AnimalId) -> Result<Animal, Error> {
        self.animals
            .find_by_id(id)
            .await
            .map_err(map_animal_repository_error)?
            .ok_or_else(|| animal_not_found(id))
    }

    async fn list(&self) -> Result<Vec<Animal>, Error> {
        self.animals
            .list_all()
            .await
            .map_err(map_animal_repository_error)
    }

    async fn delete(&self, id: AnimalId) -> Result<(), Error> {
        let removed = self
            .animals
            .delete(id)
            .await
            .map_err(map_animal_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(animal_not_found(id))
        }
    }
}
