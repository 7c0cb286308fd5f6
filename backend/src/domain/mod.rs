//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed entities of the spotting service
//! (animals, users, subscriptions, sightings) and the services that ingest
//! sightings and fan notifications out to subscribers. Values are built from
//! raw candidates and are immutable once validated.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Entity values and their identifiers.
//! - `SightingIngestService`: validate, persist, then enqueue dispatch.
//! - `NotificationDispatcher`: per-subscriber isolated fan-out with retries.

pub mod animal;
pub(crate) mod animal_service;
pub mod error;
pub mod ids;
pub mod location;
pub mod notification;
pub mod notification_dispatcher;
pub mod ports;
pub mod sighting;
pub mod sighting_ingest;
pub mod subscription;
pub(crate) mod subscription_service;
pub mod trace_id;
pub mod user;
pub(crate) mod user_service;

pub use self::animal::{
    ANIMAL_NAME_MAX, Animal, AnimalCandidate, AnimalName, AnimalValidationError, NewAnimal,
};
pub use self::animal_service::AnimalCatalogueService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{AnimalId, InvalidEntityId, SightingId, SubscriptionId, UserId};
pub use self::location::{
    Location, LocationFields, LocationPolicy, LocationValidationError, ParseLocationPolicyError,
};
pub use self::notification::{
    OutboundMessage, SightingNotification, SightingRecorded, Subscriber,
};
pub use self::notification_dispatcher::{
    BackoffJitter, DeliveryOutcome, DeliverySleeper, DispatcherConfig, DispatcherPorts,
    DispatcherRuntime, FanOutReport, NotificationDispatcher, RandomJitter, TokioSleeper,
};
pub use self::sighting::{
    NewSighting, Sighting, SightingCandidate, SightingCount, SightingValidationError,
};
pub use self::sighting_ingest::{SightingIngestPorts, SightingIngestService};
pub use self::subscription::{
    NewSubscription, Subscription, SubscriptionCandidate, SubscriptionValidationError,
};
pub use self::subscription_service::SubscriptionRegistryService;
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, Login, NewUser, User, UserCandidate, UserValidationError};
pub use self::user_service::UserDirectoryService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use spotting::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
