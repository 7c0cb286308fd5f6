//! Subscription registry domain service.
//!
//! Subscriptions must reference an existing user and animal when written.
//! Later deletion of either leaves the subscription in place.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::animal_service::map_animal_repository_error;
use crate::domain::ports::{
    AnimalRepository, SubscriptionRegistry, SubscriptionRepository, SubscriptionRepositoryError,
    UserRepository,
};
use crate::domain::user_service::map_user_repository_error;
use crate::domain::{
    Error, NewSubscription, Subscription, SubscriptionCandidate, SubscriptionId,
    SubscriptionValidationError,
};

fn map_subscription_repository_error(error: SubscriptionRepositoryError) -> Error {
    match error {
        SubscriptionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        SubscriptionRepositoryError::Query { message } => {
            Error::internal(format!("subscription repository error: {message}"))
        }
    }
}

fn subscription_not_found(id: SubscriptionId) -> Error {
    Error::not_found(format!("subscription {id} not found"))
        .with_details(json!({ "id": id.value() }))
}

fn invalid_subscription(error: &SubscriptionValidationError) -> Error {
    let field = match error {
        SubscriptionValidationError::MissingUser => "userId",
        SubscriptionValidationError::MissingAnimal => "animalId",
        SubscriptionValidationError::InvalidId(id) if id.entity == "user" => "userId",
        SubscriptionValidationError::InvalidId(_) => "animalId",
        SubscriptionValidationError::DescriptionTooLong { .. } => "description",
    };
    Error::invalid_request(format!("invalid subscription: {error}"))
        .with_details(json!({ "field": field }))
}

/// Subscription registry backed by repository ports.
#[derive(Clone)]
pub struct SubscriptionRegistryService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    animals: Arc<dyn AnimalRepository>,
    users: Arc<dyn UserRepository>,
}

impl SubscriptionRegistryService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        animals: Arc<dyn AnimalRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            subscriptions,
            animals,
            users,
        }
    }

    async fn validate(&self, candidate: SubscriptionCandidate) -> Result<NewSubscription, Error> {
        let subscription =
            NewSubscription::try_from(candidate).map_err(|err| invalid_subscription(&err))?;

        let user_id = subscription.user_id();
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

        let animal_id = subscription.animal_id();
        if self
            .animals
            .find_by_id(animal_id)
            .await
            .map_err(map_animal_repository_error)?
            .is_none()
        {
            return Err(
                Error::invalid_request(format!("animal {animal_id} does not exist"))
                    .with_details(json!({ "field": "animalId" })),
            );
        }

        Ok(subscription)
    }
}

#[async_trait]
impl SubscriptionRegistry for SubscriptionRegistryService {
    async fn create(&self, candidate: SubscriptionCandidate) -> Result<Subscription, Error> {
        let subscription = self.validate(candidate).await?;
        self.subscriptions
            .create(&subscription)
            .await
            .map_err(map_subscription_repository_error)
    }

    async fn update(
        &self,
        id: SubscriptionId,
        candidate: SubscriptionCandidate,
    ) -> Result<Subscription, Error> {
        let subscription = self.validate(candidate).await?;
        self.subscriptions
            .update(id, &subscription)
            .await
            .map_err(map_subscription_repository_error)?
            .ok_or_else(|| subscription_not_found(id))
    }

    async fn get(&self, id: SubscriptionId) -> Result<Subscription, Error> {
        self.subscriptions
            .find_by_id(id)
            .await
            .map_err(map_subscription_repository_error)?
            .ok_or_else(|| subscription_not_found(id))
    }

    async fn list(&self) -> Result<Vec<Subscription>, Error> {
        self.subscriptions
            .list_all()
            .await
            .map_err(map_subscription_repository_error)
    }

    async fn delete(&self, id: SubscriptionId) -> Result<(), Error> {
        let removed = self
            .subscriptions
            .delete(id)
            .await
            .map_err(map_subscription_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(subscription_not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{
        MockAnimalRepository, MockSubscriptionRepository, MockUserRepository,
    };
    use crate::domain::{
        AnimalId, AnimalName, ErrorCode, Login, NewAnimal, NewUser, UserId,
    };

    fn known_user() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(Some(
                NewUser::new(Login::new("ada").expect("login"), None).with_id(id),
            ))
        });
        users
    }

    fn known_animal() -> MockAnimalRepository {
        let mut animals = MockAnimalRepository::new();
        animals.expect_find_by_id().returning(|id| {
            Ok(Some(
                NewAnimal::new(AnimalName::new("Lynx").expect("name"), None).with_id(id),
            ))
        });
        animals
    }

    fn candidate() -> SubscriptionCandidate {
        SubscriptionCandidate {
            user_id: Some(2),
            animal_id: Some(7),
            description: Some("big cats".to_owned()),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_persists_when_references_exist() {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_create()
            .withf(|s| s.user_id().value() == 2 && s.animal_id().value() == 7)
            .times(1)
            .return_once(|s| Ok(s.clone().with_id(SubscriptionId::new(11).expect("id"))));
        let service = SubscriptionRegistryService::new(
            Arc::new(subscriptions),
            Arc::new(known_animal()),
            Arc::new(known_user()),
        );

        let subscription = service.create(candidate()).await.expect("created");

        assert_eq!(subscription.id().value(), 11);
        assert_eq!(subscription.description(), Some("big cats"));
    }

    #[rstest]
    #[case(SubscriptionCandidate { user_id: None, ..candidate() }, "userId")]
    #[case(SubscriptionCandidate { animal_id: None, ..candidate() }, "animalId")]
    #[tokio::test]
    async fn missing_references_are_rejected_before_storage(
        #[case] input: SubscriptionCandidate,
        #[case] field: &str,
    ) {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_create().never();
        let service = SubscriptionRegistryService::new(
            Arc::new(subscriptions),
            Arc::new(MockAnimalRepository::new()),
            Arc::new(MockUserRepository::new()),
        );

        let err = service.create(input).await.expect_err("invalid");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details(), Some(&json!({ "field": field })));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_animal_is_rejected() {
        let mut animals = MockAnimalRepository::new();
        animals.expect_find_by_id().return_once(|_| Ok(None));
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_create().never();
        let service = SubscriptionRegistryService::new(
            Arc::new(subscriptions),
            Arc::new(animals),
            Arc::new(known_user()),
        );

        let err = service.create(candidate()).await.expect_err("unknown");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().contains("animal 7"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        let service = SubscriptionRegistryService::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(known_animal()),
            Arc::new(users),
        );

        let err = service.create(candidate()).await.expect_err("unknown");

        assert!(err.message().contains("user 2"));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_of_missing_subscription_is_not_found() {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_delete().return_once(|_| Ok(false));
        let service = SubscriptionRegistryService::new(
            Arc::new(subscriptions),
            Arc::new(MockAnimalRepository::new()),
            Arc::new(MockUserRepository::new()),
        );

        let err = service
            .delete(SubscriptionId::new(4).expect("id"))
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn subscription_survives_reference_checks_only_at_write_time() {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_find_by_id().return_once(|id| {
            Ok(Some(
                NewSubscription::new(
                    UserId::new(99).expect("id"),
                    AnimalId::new(98).expect("id"),
                    None,
                )
                .with_id(id),
            ))
        });
        let mut animals = MockAnimalRepository::new();
        animals.expect_find_by_id().never();
        let service = SubscriptionRegistryService::new(
            Arc::new(subscriptions),
            Arc::new(animals),
            Arc::new(MockUserRepository::new()),
        );

        let found = service
            .get(SubscriptionId::new(1).expect("id"))
            .await
            .expect("stored subscription");

        assert_eq!(found.animal_id().value(), 98);
    }
}
