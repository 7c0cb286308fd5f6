//! Animal reference data.
//!
//! Animals are managed by administrators; the dispatch path only reads their
//! name when rendering notifications.

use std::fmt;

use url::Url;

use super::AnimalId;

/// Maximum accepted animal name length in characters.
pub const ANIMAL_NAME_MAX: usize = 255;

/// Validation errors raised while building animals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimalValidationError {
    #[error("animal name must not be empty")]
    EmptyName,
    #[error("animal name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("picture url is invalid: {message}")]
    InvalidPictureUrl { message: String },
}

/// Non-empty animal display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalName(String);

impl AnimalName {
    /// Validate and construct an animal name; surrounding whitespace is trimmed.
    pub fn new(name: impl Into<String>) -> Result<Self, AnimalValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AnimalValidationError::EmptyName);
        }
        if trimmed.chars().count() > ANIMAL_NAME_MAX {
            return Err(AnimalValidationError::NameTooLong {
                max: ANIMAL_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AnimalName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AnimalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw animal fields as received from an inbound adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalCandidate {
    pub name: Option<String>,
    pub picture_url: Option<String>,
}

/// Validated animal awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnimal {
    name: AnimalName,
    picture_url: Option<Url>,
}

impl NewAnimal {
    /// Build a validated animal from its parts.
    pub fn new(name: AnimalName, picture_url: Option<Url>) -> Self {
        Self { name, picture_url }
    }

    pub fn name(&self) -> &AnimalName {
        &self.name
    }

    pub fn picture_url(&self) -> Option<&Url> {
        self.picture_url.as_ref()
    }

    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: AnimalId) -> Animal {
        Animal {
            id,
            name: self.name,
            picture_url: self.picture_url,
        }
    }
}

impl TryFrom<AnimalCandidate> for NewAnimal {
    type Error = AnimalValidationError;

    fn try_from(candidate: AnimalCandidate) -> Result<Self, Self::Error> {
        let name = AnimalName::new(candidate.name.unwrap_or_default())?;
        let picture_url = candidate
            .picture_url
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                Url::parse(raw.trim()).map_err(|err| AnimalValidationError::InvalidPictureUrl {
                    message: err.to_string(),
                })
            })
            .transpose()?;
        Ok(Self { name, picture_url })
    }
}

/// Stored animal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    id: AnimalId,
    name: AnimalName,
    picture_url: Option<Url>,
}

impl Animal {
    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn name(&self) -> &AnimalName {
        &self.name
    }

    pub fn picture_url(&self) -> Option<&Url> {
        self.picture_url.as_ref()
    }
}
