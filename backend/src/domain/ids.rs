//! Store-assigned entity identifiers.
//!
//! Identifiers are positive 64-bit integers allocated by the persistence
//! adapter. Domain code never fabricates them; candidates carry raw values
//! that are validated through [`TryFrom<i64>`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation error for identifiers that are zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{entity} id must be a positive integer, got {value}")]
pub struct InvalidEntityId {
    /// Entity kind the identifier belongs to.
    pub entity: &'static str,
    /// Rejected raw value.
    pub value: i64,
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident => $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Validate and wrap a raw identifier.
            pub fn new(value: i64) -> Result<Self, InvalidEntityId> {
                if value <= 0 {
                    return Err(InvalidEntityId {
                        entity: $entity,
                        value,
                    });
                }
                Ok(Self(value))
            }

            /// Raw integer value as stored.
            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = InvalidEntityId;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of an [`crate::domain::Animal`].
    AnimalId => "animal"
);
define_entity_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId => "user"
);
define_entity_id!(
    /// Identifier of a [`crate::domain::Subscription`].
    SubscriptionId => "subscription"
);
define_entity_id!(
    /// Identifier of a [`crate::domain::Sighting`].
    SightingId => "sighting"
);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(-7)]
    fn rejects_non_positive_values(#[case] raw: i64) {
        let err = AnimalId::new(raw).expect_err("non-positive id");
        assert_eq!(err.entity, "animal");
        assert_eq!(err.value, raw);
    }

    #[rstest]
    fn deserialises_from_integer() {
        let id: SightingId = serde_json::from_str("42").expect("valid id");
        assert_eq!(id.value(), 42);
    }

    #[rstest]
    fn deserialising_zero_fails() {
        let result: Result<UserId, _> = serde_json::from_str("0");
        assert!(result.is_err());
    }
}
