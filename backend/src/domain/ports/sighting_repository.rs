//! Port for sighting persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewSighting, Sighting, SightingId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sighting repository adapters.
    pub enum SightingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "sighting repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "sighting repository query failed: {message}",
    }
}

/// Port for writing and reading sightings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SightingRepository: Send + Sync {
    /// Durably insert a sighting. The returned record is committed.
    async fn create(
        &self,
        sighting: &NewSighting,
        recorded_at: DateTime<Utc>,
    ) -> Result<Sighting, SightingRepositoryError>;

    /// Replace the observation fields of a stored sighting, keeping its
    /// original `recorded_at`. Returns `None` when `id` is unknown.
    async fn update(
        &self,
        id: SightingId,
        sighting: &NewSighting,
    ) -> Result<Option<Sighting>, SightingRepositoryError>;

    async fn find_by_id(
        &self,
        id: SightingId,
    ) -> Result<Option<Sighting>, SightingRepositoryError>;

    /// All sightings in identifier order.
    async fn list_all(&self) -> Result<Vec<Sighting>, SightingRepositoryError>;

    /// Delete a sighting. Returns `false` when nothing was removed.
    async fn delete(&self, id: SightingId) -> Result<bool, SightingRepositoryError>;
}
