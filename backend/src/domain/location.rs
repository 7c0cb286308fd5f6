//! Where a sighting was observed.
//!
//! Deployments record either a free-text place name or a latitude/longitude
//! pair. [`LocationPolicy`] selects which shapes a deployment accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum accepted place name length in characters.
pub const PLACE_NAME_MAX: usize = 255;

/// Validation errors raised while resolving a location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationValidationError {
    #[error("location is required")]
    Missing,
    #[error("place name must not be empty")]
    EmptyPlace,
    #[error("place name must be at most {max} characters")]
    PlaceTooLong { max: usize },
    #[error("latitude and longitude must both be present")]
    IncompleteCoordinates,
    #[error("latitude must be within [-90, 90], got {value}")]
    LatitudeOutOfRange { value: f64 },
    #[error("longitude must be within [-180, 180], got {value}")]
    LongitudeOutOfRange { value: f64 },
    #[error("this deployment records locations as {policy}")]
    RejectedByPolicy { policy: LocationPolicy },
}

/// Which location shapes a deployment accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPolicy {
    /// Free-text place names only.
    Place,
    /// Latitude/longitude pairs only.
    Coordinates,
    /// Either shape; coordinates win when both are supplied.
    #[default]
    Either,
}

impl fmt::Display for LocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Place => "place",
            Self::Coordinates => "coordinates",
            Self::Either => "either",
        };
        f.write_str(label)
    }
}

/// Error returned when parsing an unknown [`LocationPolicy`] label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location policy `{0}`; expected place, coordinates, or either")]
pub struct ParseLocationPolicyError(String);

impl FromStr for LocationPolicy {
    type Err = ParseLocationPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "place" => Ok(Self::Place),
            "coordinates" => Ok(Self::Coordinates),
            "either" => Ok(Self::Either),
            other => Err(ParseLocationPolicyError(other.to_owned())),
        }
    }
}

/// Raw location fields taken from a sighting candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationFields<'a> {
    pub place: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Validated sighting location.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Place(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl Location {
    /// Build a place location from free text.
    pub fn place(name: impl Into<String>) -> Result<Self, LocationValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LocationValidationError::EmptyPlace);
        }
        if trimmed.chars().count() > PLACE_NAME_MAX {
            return Err(LocationValidationError::PlaceTooLong {
                max: PLACE_NAME_MAX,
            });
        }
        Ok(Self::Place(trimmed.to_owned()))
    }

    /// Build a coordinate location, checking WGS84 ranges.
    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, LocationValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self::Coordinates {
            latitude,
            longitude,
        })
    }

    /// Resolve raw fields into a location accepted by `policy`.
    ///
    /// # Examples
    /// ```
    /// use spotting::domain::{Location, LocationFields, LocationPolicy};
    ///
    /// let fields = LocationFields {
    ///     place: Some("Bialowieza Forest"),
    ///     ..LocationFields::default()
    /// };
    /// let location = Location::resolve(fields, LocationPolicy::Either).expect("valid");
    /// assert_eq!(location, Location::Place("Bialowieza Forest".to_owned()));
    /// ```
    pub fn resolve(
        fields: LocationFields<'_>,
        policy: LocationPolicy,
    ) -> Result<Self, LocationValidationError> {
        let has_coordinates = fields.latitude.is_some() || fields.longitude.is_some();
        let has_place = fields.place.is_some_and(|place| !place.trim().is_empty());

        match policy {
            LocationPolicy::Place => {
                if has_coordinates && !has_place {
                    return Err(LocationValidationError::RejectedByPolicy { policy });
                }
                Self::place(fields.place.ok_or(LocationValidationError::Missing)?)
            }
            LocationPolicy::Coordinates => {
                if has_place && !has_coordinates {
                    return Err(LocationValidationError::RejectedByPolicy { policy });
                }
                Self::from_pair(fields.latitude, fields.longitude)
            }
            LocationPolicy::Either => {
                if has_coordinates {
                    Self::from_pair(fields.latitude, fields.longitude)
                } else if let Some(place) = fields.place {
                    Self::place(place)
                } else {
                    Err(LocationValidationError::Missing)
                }
            }
        }
    }

    fn from_pair(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Self, LocationValidationError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::coordinates(lat, lon),
            (None, None) => Err(LocationValidationError::Missing),
            _ => Err(LocationValidationError::IncompleteCoordinates),
        }
    }

    /// Place name when this is a place location.
    pub fn place_name(&self) -> Option<&str> {
        match self {
            Self::Place(name) => Some(name.as_str()),
            Self::Coordinates { .. } => None,
        }
    }

    /// Latitude/longitude when this is a coordinate location.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self {
            Self::Place(_) => None,
            Self::Coordinates {
                latitude,
                longitude,
            } => Some((*latitude, *longitude)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(name) => f.write_str(name),
            Self::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{latitude:.5}, {longitude:.5}"),
        }
    }
}
