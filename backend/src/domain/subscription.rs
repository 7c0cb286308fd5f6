//! A user's standing interest in an animal.
//!
//! Both references are mandatory at creation. Duplicate (user, animal) pairs
//! are distinct records and each receives its own notification.

use super::{AnimalId, InvalidEntityId, SubscriptionId, UserId};

/// Maximum accepted description length in characters.
pub const DESCRIPTION_MAX: usize = 1024;

/// Validation errors raised while building subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionValidationError {
    #[error("subscription requires a user")]
    MissingUser,
    #[error("subscription requires an animal")]
    MissingAnimal,
    #[error(transparent)]
    InvalidId(#[from] InvalidEntityId),
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
}

/// Raw subscription fields as received from an inbound adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionCandidate {
    pub user_id: Option<i64>,
    pub animal_id: Option<i64>,
    pub description: Option<String>,
}

/// Validated subscription awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    user_id: UserId,
    animal_id: AnimalId,
    description: Option<String>,
}

impl NewSubscription {
    pub fn new(user_id: UserId, animal_id: AnimalId, description: Option<String>) -> Self {
        Self {
            user_id,
            animal_id,
            description,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn animal_id(&self) -> AnimalId {
        self.animal_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: SubscriptionId) -> Subscription {
        Subscription {
            id,
            user_id: self.user_id,
            animal_id: self.animal_id,
            description: self.description,
        }
    }
}

impl TryFrom<SubscriptionCandidate> for NewSubscription {
    type Error = SubscriptionValidationError;

    fn try_from(candidate: SubscriptionCandidate) -> Result<Self, Self::Error> {
        let user_id = UserId::new(
            candidate
                .user_id
                .ok_or(SubscriptionValidationError::MissingUser)?,
        )?;
        let animal_id = AnimalId::new(
            candidate
                .animal_id
                .ok_or(SubscriptionValidationError::MissingAnimal)?,
        )?;
        let description = candidate
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if description
            .as_deref()
            .is_some_and(|text| text.chars().count() > DESCRIPTION_MAX)
        {
            return Err(SubscriptionValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            user_id,
            animal_id,
            description,
        })
    }
}

/// Stored subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    user_id: UserId,
    animal_id: AnimalId,
    description: Option<String>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn animal_id(&self) -> AnimalId {
        self.animal_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, Some(1), SubscriptionValidationError::MissingUser)]
    #[case(Some(1), None, SubscriptionValidationError::MissingAnimal)]
    fn both_references_are_required(
        #[case] user_id: Option<i64>,
        #[case] animal_id: Option<i64>,
        #[case] expected: SubscriptionValidationError,
    ) {
        let err = NewSubscription::try_from(SubscriptionCandidate {
            user_id,
            animal_id,
            description: None,
        })
        .expect_err("missing reference");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn blank_description_is_dropped() {
        let subscription = NewSubscription::try_from(SubscriptionCandidate {
            user_id: Some(3),
            animal_id: Some(9),
            description: Some("   ".to_owned()),
        })
        .expect("valid subscription");
        assert!(subscription.description().is_none());
        assert_eq!(subscription.user_id().value(), 3);
        assert_eq!(subscription.animal_id().value(), 9);
    }

    #[rstest]
    fn non_positive_reference_is_invalid() {
        let err = NewSubscription::try_from(SubscriptionCandidate {
            user_id: Some(0),
            animal_id: Some(9),
            description: None,
        })
        .expect_err("invalid id");
        assert!(matches!(err, SubscriptionValidationError::InvalidId(_)));
    }
}
