//! Driving port for sighting ingestion and maintenance.

use async_trait::async_trait;

use crate::domain::{Error, Sighting, SightingCandidate, SightingId};

/// Driving port for recording sightings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SightingService: Send + Sync {
    /// Validate and persist a sighting, then hand it to the dispatcher.
    ///
    /// Returns once the sighting is committed. Notification delivery happens
    /// afterwards and never changes the result.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let sighting = service
    ///     .ingest(SightingCandidate {
    ///         animal_id: Some(1),
    ///         user_id: Some(2),
    ///         place: Some("Loch Ness".to_owned()),
    ///         count: Some(1),
    ///         ..SightingCandidate::default()
    ///     })
    ///     .await?;
    /// assert!(sighting.id().value() > 0);
    /// ```
    async fn ingest(&self, candidate: SightingCandidate) -> Result<Sighting, Error>;

    /// Replace a stored sighting's observation fields. Subscribers are not
    /// notified again.
    async fn update(
        &self,
        id: SightingId,
        candidate: SightingCandidate,
    ) -> Result<Sighting, Error>;

    async fn get(&self, id: SightingId) -> Result<Sighting, Error>;

    async fn list(&self) -> Result<Vec<Sighting>, Error>;

    async fn delete(&self, id: SightingId) -> Result<(), Error>;
}
