//! Tests for the sighting ingest service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{
    DispatchQueueError, MockAnimalRepository, MockDispatchQueue, MockSightingRepository,
    MockUserRepository,
};
use crate::domain::{ErrorCode, Login, NewAnimal, NewUser};
use crate::test_support::dispatch::MutableClock;

const ANIMAL_ID: i64 = 7;
const USER_ID: i64 = 3;
const SIGHTING_ID: i64 = 42;

fn recorded_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0)
        .single()
        .expect("valid time")
}

#[fixture]
fn candidate() -> SightingCandidate {
    SightingCandidate {
        animal_id: Some(ANIMAL_ID),
        user_id: Some(USER_ID),
        date: None,
        place: Some("Bieszczady".to_owned()),
        latitude: None,
        longitude: None,
        count: Some(1),
    }
}

fn lynx_catalogue() -> MockAnimalRepository {
    let mut animals = MockAnimalRepository::new();
    animals.expect_find_by_id().returning(|id| {
        Ok(Some(
            NewAnimal::new(AnimalName::new("Lynx").expect("name"), None).with_id(id),
        ))
    });
    animals
}

fn known_users() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|id| {
        Ok(Some(
            NewUser::new(Login::new("reporter").expect("login"), None).with_id(id),
        ))
    });
    users
}

fn storing_repository() -> MockSightingRepository {
    let mut sightings = MockSightingRepository::new();
    sightings
        .expect_create()
        .times(1)
        .return_once(|sighting, at| {
            Ok(sighting
                .clone()
                .into_stored(SightingId::new(SIGHTING_ID).expect("id"), at))
        });
    sightings
}

fn untouched_repository() -> MockSightingRepository {
    let mut sightings = MockSightingRepository::new();
    sightings.expect_create().never();
    sightings
}

fn queue_expecting(calls: usize) -> MockDispatchQueue {
    let mut queue = MockDispatchQueue::new();
    queue.expect_enqueue().times(calls).returning(|_| Ok(()));
    queue
}

fn service(
    sightings: MockSightingRepository,
    animals: MockAnimalRepository,
    users: MockUserRepository,
    queue: MockDispatchQueue,
) -> SightingIngestService {
    SightingIngestService::new(
        SightingIngestPorts {
            sightings: Arc::new(sightings),
            animals: Arc::new(animals),
            users: Arc::new(users),
            queue: Arc::new(queue),
        },
        Arc::new(MutableClock::new(recorded_at())),
        LocationPolicy::Either,
    )
}

#[rstest]
#[tokio::test]
async fn ingest_persists_then_enqueues_the_recorded_event(candidate: SightingCandidate) {
    let mut queue = MockDispatchQueue::new();
    queue
        .expect_enqueue()
        .withf(|event| {
            event.sighting.id().value() == SIGHTING_ID && event.animal_name.as_ref() == "Lynx"
        })
        .times(1)
        .return_once(|_| Ok(()));
    let service = service(storing_repository(), lynx_catalogue(), known_users(), queue);

    let sighting = service.ingest(candidate).await.expect("ingested");

    assert_eq!(sighting.id().value(), SIGHTING_ID);
    assert_eq!(sighting.recorded_at(), recorded_at());
}

#[rstest]
#[tokio::test]
async fn ingest_carries_the_request_trace_into_the_event(candidate: SightingCandidate) {
    let trace_id = TraceId::generate();
    let mut queue = MockDispatchQueue::new();
    queue
        .expect_enqueue()
        .withf(move |event| event.trace_id == Some(trace_id))
        .times(1)
        .return_once(|_| Ok(()));
    let service = service(storing_repository(), lynx_catalogue(), known_users(), queue);

    TraceId::scope(trace_id, service.ingest(candidate))
        .await
        .expect("ingested");
}

#[rstest]
#[case::missing_animal(SightingCandidate { animal_id: None, ..candidate() }, "animalId")]
#[case::missing_user(SightingCandidate { user_id: None, ..candidate() }, "userId")]
#[case::zero_count(SightingCandidate { count: Some(0), ..candidate() }, "count")]
#[case::missing_location(SightingCandidate { place: None, ..candidate() }, "location")]
#[tokio::test]
async fn invalid_candidates_are_rejected_without_side_effects(
    #[case] input: SightingCandidate,
    #[case] field: &str,
) {
    let service = service(
        untouched_repository(),
        MockAnimalRepository::new(),
        MockUserRepository::new(),
        queue_expecting(0),
    );

    let err = service.ingest(input).await.expect_err("invalid");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&json!({ "field": field })));
}

#[rstest]
#[tokio::test]
async fn unknown_animal_is_a_validation_error(candidate: SightingCandidate) {
    let mut animals = MockAnimalRepository::new();
    animals.expect_find_by_id().return_once(|_| Ok(None));
    let service = service(
        untouched_repository(),
        animals,
        MockUserRepository::new(),
        queue_expecting(0),
    );

    let err = service.ingest(candidate).await.expect_err("unknown animal");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&json!({ "field": "animalId" })));
}

#[rstest]
#[tokio::test]
async fn unknown_user_is_a_validation_error(candidate: SightingCandidate) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));
    let service = service(
        untouched_repository(),
        lynx_catalogue(),
        users,
        queue_expecting(0),
    );

    let err = service.ingest(candidate).await.expect_err("unknown user");

    assert_eq!(err.details(), Some(&json!({ "field": "userId" })));
}

#[rstest]
#[case(SightingRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(SightingRepositoryError::query("constraint"), ErrorCode::InternalError)]
#[tokio::test]
async fn storage_failure_fails_ingest_and_skips_dispatch(
    candidate: SightingCandidate,
    #[case] failure: SightingRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut sightings = MockSightingRepository::new();
    sightings
        .expect_create()
        .return_once(move |_, _| Err(failure));
    let service = service(sightings, lynx_catalogue(), known_users(), queue_expecting(0));

    let err = service.ingest(candidate).await.expect_err("storage failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case(DispatchQueueError::full())]
#[case(DispatchQueueError::closed())]
#[tokio::test]
async fn refused_hand_off_does_not_fail_ingest(
    candidate: SightingCandidate,
    #[case] refusal: DispatchQueueError,
) {
    let mut queue = MockDispatchQueue::new();
    queue
        .expect_enqueue()
        .times(1)
        .return_once(move |_| Err(refusal));
    let service = service(storing_repository(), lynx_catalogue(), known_users(), queue);

    let sighting = service.ingest(candidate).await.expect("still ingested");

    assert_eq!(sighting.id().value(), SIGHTING_ID);
}

#[rstest]
#[tokio::test]
async fn update_replaces_without_dispatching(candidate: SightingCandidate) {
    let mut sightings = MockSightingRepository::new();
    sightings
        .expect_update()
        .withf(|id, sighting| id.value() == SIGHTING_ID && sighting.count().is_some())
        .times(1)
        .return_once(|id, sighting| Ok(Some(sighting.clone().into_stored(id, recorded_at()))));
    let service = service(sightings, lynx_catalogue(), known_users(), queue_expecting(0));

    let updated = service
        .update(SightingId::new(SIGHTING_ID).expect("id"), candidate)
        .await
        .expect("updated");

    assert_eq!(updated.id().value(), SIGHTING_ID);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_sighting_is_not_found(candidate: SightingCandidate) {
    let mut sightings = MockSightingRepository::new();
    sightings.expect_update().return_once(|_, _| Ok(None));
    let service = service(sightings, lynx_catalogue(), known_users(), queue_expecting(0));

    let err = service
        .update(SightingId::new(5).expect("id"), candidate)
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_of_unknown_sighting_is_not_found() {
    let mut sightings = MockSightingRepository::new();
    sightings.expect_delete().return_once(|_| Ok(false));
    let service = service(
        sightings,
        MockAnimalRepository::new(),
        MockUserRepository::new(),
        queue_expecting(0),
    );

    let err = service
        .delete(SightingId::new(5).expect("id"))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
