//! Subscription HTTP handlers.
//!
//! A subscription ties a user to an animal. Both must exist when it is
//! written; later deletion of either leaves it in place.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Subscription, SubscriptionCandidate, SubscriptionId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::alerts::{self, Entity};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, resolve_put_target};

/// Request payload for writing a subscription.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Must be absent on create.
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub animal_id: Option<i64>,
    #[schema(max_length = 1024)]
    pub description: Option<String>,
}

impl From<SubscriptionRequest> for SubscriptionCandidate {
    fn from(value: SubscriptionRequest) -> Self {
        Self {
            user_id: value.user_id,
            animal_id: value.animal_id,
            description: value.description,
        }
    }
}

/// Stored subscription.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: i64,
    pub user_id: i64,
    pub animal_id: i64,
    pub description: Option<String>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(value: Subscription) -> Self {
        Self {
            id: value.id().value(),
            user_id: value.user_id().value(),
            animal_id: value.animal_id().value(),
            description: value.description().map(str::to_owned),
        }
    }
}

async fn write_subscription(
    state: &HttpState,
    target: Option<SubscriptionId>,
    candidate: SubscriptionCandidate,
) -> ApiResult<HttpResponse> {
    match target {
        Some(id) => {
            let subscription =
                SubscriptionResponse::from(state.subscriptions.update(id, candidate).await?);
            Ok(alerts::updated(
                Entity::Subscription,
                subscription.id,
                &subscription,
            ))
        }
        None => {
            let subscription =
                SubscriptionResponse::from(state.subscriptions.create(candidate).await?);
            Ok(alerts::created(
                Entity::Subscription,
                subscription.id,
                &subscription,
            ))
        }
    }
}

/// Subscribe a user to sightings of an animal.
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid request, unknown reference, or id supplied", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "createSubscription"
)]
#[post("/subscriptions")]
pub async fn create_subscription(
    state: web::Data<HttpState>,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.id.is_some() {
        return Ok(alerts::id_exists(Entity::Subscription));
    }
    write_subscription(&state, None, payload.into()).await
}

/// Replace the subscription named by the body id, or create one.
#[utoipa::path(
    put,
    path = "/api/v1/subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription replaced", body = SubscriptionResponse),
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Subscription not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "replaceSubscription"
)]
#[put("/subscriptions")]
pub async fn replace_subscription(
    state: web::Data<HttpState>,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let target = resolve_put_target(None, payload.id)?;
    write_subscription(&state, target, payload.into()).await
}

/// Replace the subscription at `id`.
#[utoipa::path(
    put,
    path = "/api/v1/subscriptions/{id}",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription replaced", body = SubscriptionResponse),
        (status = 400, description = "Invalid request or id mismatch", body = ErrorSchema),
        (status = 404, description = "Subscription not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "replaceSubscriptionById"
)]
#[put("/subscriptions/{id}")]
pub async fn replace_subscription_by_id(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let target = resolve_put_target(Some(path.into_inner()), payload.id)?;
    write_subscription(&state, target, payload.into()).await
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    responses(
        (status = 200, description = "All subscriptions", body = [SubscriptionResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/subscriptions")]
pub async fn list_subscriptions(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SubscriptionResponse>>> {
    let subscriptions = state.subscriptions.list().await?;
    Ok(web::Json(
        subscriptions
            .into_iter()
            .map(SubscriptionResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "getSubscription"
)]
#[get("/subscriptions/{id}")]
pub async fn get_subscription(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<SubscriptionResponse>> {
    let id: SubscriptionId = parse_id(path.into_inner())?;
    Ok(web::Json(state.subscriptions.get(id).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions/{id}",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription deleted"),
        (status = 404, description = "Subscription not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "deleteSubscription"
)]
#[delete("/subscriptions/{id}")]
pub async fn delete_subscription(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id: SubscriptionId = parse_id(path.into_inner())?;
    state.subscriptions.delete(id).await?;
    Ok(alerts::deleted(Entity::Subscription, id.value()))
}
