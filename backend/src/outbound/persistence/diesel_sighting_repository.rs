//! PostgreSQL-backed `SightingRepository` implementation using Diesel ORM.
//!
//! A location is stored across three nullable columns: `place` for named
//! places, `latitude`/`longitude` for coordinate pairs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SightingRepository, SightingRepositoryError};
use crate::domain::{LocationPolicy, NewSighting, Sighting, SightingCandidate, SightingId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSightingRow, SightingRow, SightingUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::sightings;

/// Diesel-backed implementation of the sighting repository port.
#[derive(Clone)]
pub struct DieselSightingRepository {
    pool: DbPool,
}

impl DieselSightingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SightingRepositoryError {
    map_basic_pool_error(error, |message| SightingRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> SightingRepositoryError {
    map_basic_diesel_error(
        error,
        SightingRepositoryError::query,
        SightingRepositoryError::connection,
    )
}

/// Column values shared by inserts and updates.
fn to_update(sighting: &NewSighting) -> Result<SightingUpdate<'_>, SightingRepositoryError> {
    let individual_count = sighting
        .count()
        .map(|count| i32::try_from(count.get()))
        .transpose()
        .map_err(|err| SightingRepositoryError::query(format!("sighting count: {err}")))?;
    let (latitude, longitude) = match sighting.location().lat_lon() {
        Some((lat, lon)) => (Some(lat), Some(lon)),
        None => (None, None),
    };
    Ok(SightingUpdate {
        animal_id: sighting.animal_id().value(),
        user_id: sighting.user_id().value(),
        observed_on: sighting.date(),
        place: sighting.location().place_name(),
        latitude,
        longitude,
        individual_count,
    })
}

fn to_insert(
    sighting: &NewSighting,
    recorded_at: DateTime<Utc>,
) -> Result<NewSightingRow<'_>, SightingRepositoryError> {
    let SightingUpdate {
        animal_id,
        user_id,
        observed_on,
        place,
        latitude,
        longitude,
        individual_count,
    } = to_update(sighting)?;
    Ok(NewSightingRow {
        animal_id,
        user_id,
        observed_on,
        place,
        latitude,
        longitude,
        individual_count,
        recorded_at,
    })
}

/// Convert a database row into a validated domain sighting.
///
/// Rows are re-validated under the permissive policy: a deployment that
/// narrows its policy still reads sightings stored before the change.
fn row_to_sighting(row: SightingRow) -> Result<Sighting, SightingRepositoryError> {
    let SightingRow {
        id,
        animal_id,
        user_id,
        observed_on,
        place,
        latitude,
        longitude,
        individual_count,
        recorded_at,
    } = row;
    let id = SightingId::new(id).map_err(|err| SightingRepositoryError::query(err.to_string()))?;
    let sighting = NewSighting::validate(
        SightingCandidate {
            animal_id: Some(animal_id),
            user_id: Some(user_id),
            date: observed_on,
            place,
            latitude,
            longitude,
            count: individual_count,
        },
        LocationPolicy::Either,
    )
    .map_err(|err| SightingRepositoryError::query(format!("stored sighting {id}: {err}")))?;
    Ok(sighting.into_stored(id, recorded_at))
}

#[async_trait]
impl SightingRepository for DieselSightingRepository {
    async fn create(
        &self,
        sighting: &NewSighting,
        recorded_at: DateTime<Utc>,
    ) -> Result<Sighting, SightingRepositoryError> {
        let new_row = to_insert(sighting, recorded_at)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(sightings::table)
            .values(&new_row)
            .returning(SightingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_sighting(row)
    }

    async fn update(
        &self,
        id: SightingId,
        sighting: &NewSighting,
    ) -> Result<Option<Sighting>, SightingRepositoryError> {
        let changes = to_update(sighting)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(sightings::table.filter(sightings::id.eq(id.value())))
            .set(&changes)
            .returning(SightingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_sighting).transpose()
    }

    async fn find_by_id(
        &self,
        id: SightingId,
    ) -> Result<Option<Sighting>, SightingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = sightings::table
            .filter(sightings::id.eq(id.value()))
            .select(SightingRow::as_select())
            .first::<SightingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_sighting).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Sighting>, SightingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SightingRow> = sightings::table
            .order(sightings::id.asc())
            .select(SightingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_sighting).collect()
    }

    async fn delete(&self, id: SightingId) -> Result<bool, SightingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(sightings::table.filter(sightings::id.eq(id.value())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn candidate() -> SightingCandidate {
        SightingCandidate {
            animal_id: Some(7),
            user_id: Some(3),
            latitude: Some(52.7),
            longitude: Some(23.9),
            count: Some(2),
            ..SightingCandidate::default()
        }
    }

    #[rstest]
    fn coordinates_fill_both_columns_and_leave_place_empty() {
        let sighting = NewSighting::validate(candidate(), LocationPolicy::Either).expect("valid");

        let update = to_update(&sighting).expect("columns");

        assert_eq!(update.place, None);
        assert_eq!(update.latitude, Some(52.7));
        assert_eq!(update.longitude, Some(23.9));
        assert_eq!(update.individual_count, Some(2));
    }

    #[rstest]
    fn stored_rows_keep_their_recorded_timestamp() {
        let recorded_at = Utc
            .with_ymd_and_hms(2024, 5, 17, 9, 30, 0)
            .single()
            .expect("time");
        let sighting = row_to_sighting(SightingRow {
            id: 42,
            animal_id: 7,
            user_id: 3,
            observed_on: None,
            place: Some("Bialowieza".to_owned()),
            latitude: None,
            longitude: None,
            individual_count: None,
            recorded_at,
        })
        .expect("valid row");

        assert_eq!(sighting.recorded_at(), recorded_at);
        assert_eq!(sighting.location().place_name(), Some("Bialowieza"));
    }

    #[rstest]
    fn rows_without_any_location_are_query_errors() {
        let err = row_to_sighting(SightingRow {
            id: 42,
            animal_id: 7,
            user_id: 3,
            observed_on: None,
            place: None,
            latitude: Some(1.0),
            longitude: None,
            individual_count: None,
            recorded_at: Utc::now(),
        })
        .expect_err("incomplete location");

        assert!(matches!(err, SightingRepositoryError::Query { .. }));
    }
}
