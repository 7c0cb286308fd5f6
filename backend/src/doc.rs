//! OpenAPI documentation for the REST API.
//!
//! [`ApiDoc`] collects every `/api/v1` handler plus the health probes. Domain
//! types are documented through the wrappers in
//! [`crate::inbound::http::schemas`]; request and response bodies derive
//! `ToSchema` directly. Swagger UI serves the document in debug builds and
//! the `openapi-dump` binary writes it to stdout.

use utoipa::OpenApi;

use crate::inbound::http::animals::{AnimalRequest, AnimalResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::sightings::{SightingRequest, SightingResponse};
use crate::inbound::http::subscriptions::{SubscriptionRequest, SubscriptionResponse};
use crate::inbound::http::users::{UserRequest, UserResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Animal spotting API",
        description = "Record wildlife sightings and notify subscribers of the animals seen."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::animals::create_animal,
        crate::inbound::http::animals::replace_animal,
        crate::inbound::http::animals::replace_animal_by_id,
        crate::inbound::http::animals::list_animals,
        crate::inbound::http::animals::get_animal,
        crate::inbound::http::animals::delete_animal,
        crate::inbound::http::sightings::create_sighting,
        crate::inbound::http::sightings::replace_sighting,
        crate::inbound::http::sightings::replace_sighting_by_id,
        crate::inbound::http::sightings::list_sightings,
        crate::inbound::http::sightings::get_sighting,
        crate::inbound::http::sightings::delete_sighting,
        crate::inbound::http::subscriptions::create_subscription,
        crate::inbound::http::subscriptions::replace_subscription,
        crate::inbound::http::subscriptions::replace_subscription_by_id,
        crate::inbound::http::subscriptions::list_subscriptions,
        crate::inbound::http::subscriptions::get_subscription,
        crate::inbound::http::subscriptions::delete_subscription,
        crate::inbound::http::users::register_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AnimalRequest,
        AnimalResponse,
        SightingRequest,
        SightingResponse,
        SubscriptionRequest,
        SubscriptionResponse,
        UserRequest,
        UserResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "animals", description = "Animal catalogue"),
        (name = "sightings", description = "Sighting ingest and maintenance"),
        (name = "subscriptions", description = "Who wants to hear about which animal"),
        (name = "users", description = "Minimal user directory"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
