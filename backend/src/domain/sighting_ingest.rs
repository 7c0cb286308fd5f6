//! Sighting ingest domain service.
//!
//! Validates a candidate, commits it, and only then hands a
//! [`SightingRecorded`] event to the dispatch queue. The caller gets the
//! stored sighting whether or not the hand-off succeeds; delivery runs
//! elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::animal_service::map_animal_repository_error;
use crate::domain::ports::{
    AnimalRepository, DispatchQueue, SightingRepository, SightingRepositoryError, SightingService,
    UserRepository,
};
use crate::domain::user_service::map_user_repository_error;
use crate::domain::{
    AnimalName, Error, LocationPolicy, NewSighting, Sighting, SightingCandidate, SightingId,
    SightingRecorded, TraceId,
};

fn map_sighting_repository_error(error: SightingRepositoryError) -> Error {
    match error {
        SightingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("sighting repository unavailable: {message}"))
        }
        SightingRepositoryError::Query { message } => {
            Error::internal(format!("sighting repository error: {message}"))
        }
    }
}

fn sighting_not_found(id: SightingId) -> Error {
    Error::not_found(format!("sighting {id} not found")).with_details(json!({ "id": id.value() }))
}

/// Port bundle required by the ingest service.
pub struct SightingIngestPorts {
    pub sightings: Arc<dyn SightingRepository>,
    pub animals: Arc<dyn AnimalRepository>,
    pub users: Arc<dyn UserRepository>,
    pub queue: Arc<dyn DispatchQueue>,
}

/// Sighting service that persists before dispatching.
#[derive(Clone)]
pub struct SightingIngestService {
    sightings: Arc<dyn SightingRepository>,
    animals: Arc<dyn AnimalRepository>,
    users: Arc<dyn UserRepository>,
    queue: Arc<dyn DispatchQueue>,
    clock: Arc<dyn Clock>,
    location_policy: LocationPolicy,
}

impl SightingIngestService {
    pub fn new(
        ports: SightingIngestPorts,
        clock: Arc<dyn Clock>,
        location_policy: LocationPolicy,
    ) -> Self {
        Self {
            sightings: ports.sightings,
            animals: ports.animals,
            users: ports.users,
            queue: ports.queue,
            clock,
            location_policy,
        }
    }

    /// Validate the candidate and confirm its references exist, returning the
    /// referenced animal's name for the notification.
    async fn validate(
        &self,
        candidate: SightingCandidate,
    ) -> Result<(NewSighting, AnimalName), Error> {
        let sighting = NewSighting::validate(candidate, self.location_policy).map_err(|err| {
            Error::invalid_request(format!("invalid sighting: {err}"))
                .with_details(json!({ "field": err.field() }))
        })?;

        let animal_id = sighting.animal_id();
        let animal = self
            .animals
            .find_by_id(animal_id)
            .await
            .map_err(map_animal_repository_error)?
            .ok_or_else(|| {
                Error::invalid_request(format!("animal {animal_id} does not exist"))
                    .with_details(json!({ "field": "animalId" }))
            })?;

        let user_id = sighting.user_id();
        if self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .is_none()
        {
            return Err(Error::invalid_request(format!("user {user_id} does not exist"))
                .with_details(json!({ "field": "userId" })));
        }

        Ok((sighting, animal.name().clone()))
    }

    async fn hand_off(&self, sighting: &Sighting, animal_name: AnimalName) {
        let sighting_id = sighting.id();
        let event = SightingRecorded {
            sighting: sighting.clone(),
            animal_name,
            trace_id: TraceId::current(),
        };
        // The sighting is committed; a refused hand-off only loses
        // notifications.
        if let Err(error) = self.queue.enqueue(event).await {
            warn!(%sighting_id, %error, "sighting recorded but dispatch was not queued");
        }
    }
}

#[async_trait]
impl SightingService for SightingIngestService {
    async fn ingest(&self, candidate: SightingCandidate) -> Result<Sighting, Error> {
        let (new_sighting, animal_name) = self.validate(candidate).await?;

        let sighting = self
            .sightings
            .create(&new_sighting, self.clock.utc())
            .await
            .map_err(map_sighting_repository_error)?;
        info!(
            sighting_id = %sighting.id(),
            animal_id = %sighting.animal_id(),
            user_id = %sighting.user_id(),
            "sighting recorded"
        );

        self.hand_off(&sighting, animal_name).await;
        Ok(sighting)
    }

    async fn update(&self, id: SightingId, candidate: SightingCandidate) -> Result<Sighting, Error> {
        let (new_sighting, _) = self.validate(candidate).await?;
        self.sightings
            .update(id, &new_sighting)
            .await
            .map_err(map_sighting_repository_error)?
            .ok_or_else(|| sighting_not_found(id))
    }

    async fn get(&self, id: SightingId) -> Result<Sighting, Error> {
        self.sightings
            .find_by_id(id)
            .await
            .map_err(map_sighting_repository_error)?
            .ok_or_else(|| sighting_not_found(id))
    }

    async fn list(&self) -> Result<Vec<Sighting>, Error> {
        self.sightings
            .list_all()
            .await
            .map_err(map_sighting_repository_error)
    }

    async fn delete(&self, id: SightingId) -> Result<(), Error> {
        let removed = self
            .sightings
            .delete(id)
            .await
            .map_err(map_sighting_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(sighting_not_found(id))
        }
    }
}

#[cfg(test)]
#[path = "sighting_ingest_tests.rs"]
mod tests;
