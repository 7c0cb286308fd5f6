//! User-reported observations of an animal.
//!
//! A sighting is validated from a raw [`SightingCandidate`] into a
//! [`NewSighting`], persisted, and only then handed to the dispatch path. The
//! stored record is never re-dispatched.

use chrono::{DateTime, NaiveDate, Utc};

use super::{
    AnimalId, InvalidEntityId, Location, LocationFields, LocationPolicy, LocationValidationError,
    SightingId, UserId,
};

/// Validation errors raised while building sightings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SightingValidationError {
    #[error("sighting requires an animal")]
    MissingAnimal,
    #[error("sighting requires a reporting user")]
    MissingUser,
    #[error("count must be at least 1, got {value}")]
    CountTooLow { value: i32 },
    #[error(transparent)]
    InvalidId(#[from] InvalidEntityId),
    #[error(transparent)]
    Location(#[from] LocationValidationError),
}

impl SightingValidationError {
    /// Name of the request field at fault, used in error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingAnimal => "animalId",
            Self::MissingUser => "userId",
            Self::CountTooLow { .. } => "count",
            Self::InvalidId(err) if err.entity == "animal" => "animalId",
            Self::InvalidId(_) => "userId",
            Self::Location(_) => "location",
        }
    }
}

/// Number of individuals observed. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SightingCount(u32);

impl SightingCount {
    pub fn new(value: i32) -> Result<Self, SightingValidationError> {
        u32::try_from(value)
            .ok()
            .filter(|count| *count >= 1)
            .map(Self)
            .ok_or(SightingValidationError::CountTooLow { value })
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Raw sighting fields as received from an inbound adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SightingCandidate {
    pub animal_id: Option<i64>,
    pub user_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub place: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub count: Option<i32>,
}

/// Validated sighting awaiting persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSighting {
    animal_id: AnimalId,
    user_id: UserId,
    date: Option<NaiveDate>,
    location: Location,
    count: Option<SightingCount>,
}

impl NewSighting {
    /// Validate `candidate`, resolving its location under `policy`.
    ///
    /// References are checked for presence only; whether they point at
    /// existing records is the ingest service's concern.
    ///
    /// # Examples
    /// ```
    /// use spotting::domain::{LocationPolicy, NewSighting, SightingCandidate};
    ///
    /// let candidate = SightingCandidate {
    ///     animal_id: Some(1),
    ///     user_id: Some(2),
    ///     place: Some("Loch Ness".to_owned()),
    ///     count: Some(1),
    ///     ..SightingCandidate::default()
    /// };
    /// let sighting = NewSighting::validate(candidate, LocationPolicy::Either).expect("valid");
    /// assert_eq!(sighting.count().map(|c| c.get()), Some(1));
    /// ```
    pub fn validate(
        candidate: SightingCandidate,
        policy: LocationPolicy,
    ) -> Result<Self, SightingValidationError> {
        let animal_id = AnimalId::new(
            candidate
                .animal_id
                .ok_or(SightingValidationError::MissingAnimal)?,
        )?;
        let user_id = UserId::new(candidate.user_id.ok_or(SightingValidationError::MissingUser)?)?;
        let count = candidate.count.map(SightingCount::new).transpose()?;
        let location = Location::resolve(
            LocationFields {
                place: candidate.place.as_deref(),
                latitude: candidate.latitude,
                longitude: candidate.longitude,
            },
            policy,
        )?;
        Ok(Self {
            animal_id,
            user_id,
            date: candidate.date,
            location,
            count,
        })
    }

    pub fn animal_id(&self) -> AnimalId {
        self.animal_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn count(&self) -> Option<SightingCount> {
        self.count
    }

    /// Attach the identifier and timestamp assigned on persistence.
    pub fn into_stored(self, id: SightingId, recorded_at: DateTime<Utc>) -> Sighting {
        Sighting {
            id,
            animal_id: self.animal_id,
            user_id: self.user_id,
            date: self.date,
            location: self.location,
            count: self.count,
            recorded_at,
        }
    }
}

/// Persisted sighting.
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    id: SightingId,
    animal_id: AnimalId,
    user_id: UserId,
    date: Option<NaiveDate>,
    location: Location,
    count: Option<SightingCount>,
    recorded_at: DateTime<Utc>,
}

impl Sighting {
    pub fn id(&self) -> SightingId {
        self.id
    }

    pub fn animal_id(&self) -> AnimalId {
        self.animal_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn count(&self) -> Option<SightingCount> {
        self.count
    }

    /// When the service accepted the report.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn candidate() -> SightingCandidate {
        SightingCandidate {
            animal_id: Some(7),
            user_id: Some(3),
            date: NaiveDate::from_ymd_opt(2024, 5, 17),
            place: Some("Bialowieza".to_owned()),
            latitude: None,
            longitude: None,
            count: Some(2),
        }
    }

    #[rstest]
    fn valid_candidate_is_accepted(candidate: SightingCandidate) {
        let sighting = NewSighting::validate(candidate, LocationPolicy::Either).expect("valid");
        assert_eq!(sighting.animal_id().value(), 7);
        assert_eq!(sighting.user_id().value(), 3);
        assert_eq!(sighting.location().place_name(), Some("Bialowieza"));
    }

    #[rstest]
    fn missing_animal_is_rejected(mut candidate: SightingCandidate) {
        candidate.animal_id = None;
        let err = NewSighting::validate(candidate, LocationPolicy::Either).expect_err("invalid");
        assert_eq!(err, SightingValidationError::MissingAnimal);
        assert_eq!(err.field(), "animalId");
    }

    #[rstest]
    fn missing_user_is_rejected(mut candidate: SightingCandidate) {
        candidate.user_id = None;
        let err = NewSighting::validate(candidate, LocationPolicy::Either).expect_err("invalid");
        assert_eq!(err, SightingValidationError::MissingUser);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn count_below_one_is_rejected(mut candidate: SightingCandidate, #[case] count: i32) {
        candidate.count = Some(count);
        let err = NewSighting::validate(candidate, LocationPolicy::Either).expect_err("invalid");
        assert_eq!(err, SightingValidationError::CountTooLow { value: count });
    }

    #[rstest]
    fn count_of_one_is_accepted(mut candidate: SightingCandidate) {
        candidate.count = Some(1);
        let sighting = NewSighting::validate(candidate, LocationPolicy::Either).expect("valid");
        assert_eq!(sighting.count().map(SightingCount::get), Some(1));
    }

    #[rstest]
    fn count_is_optional(mut candidate: SightingCandidate) {
        candidate.count = None;
        let sighting = NewSighting::validate(candidate, LocationPolicy::Either).expect("valid");
        assert!(sighting.count().is_none());
    }

    #[rstest]
    fn missing_location_is_rejected(mut candidate: SightingCandidate) {
        candidate.place = None;
        let err = NewSighting::validate(candidate, LocationPolicy::Either).expect_err("invalid");
        assert_eq!(
            err,
            SightingValidationError::Location(LocationValidationError::Missing)
        );
        assert_eq!(err.field(), "location");
    }
}
