//! Sighting HTTP handlers.
//!
//! A `POST` (or a `PUT` without an id) records a sighting and answers as soon
//! as it is stored; subscribers are notified in the background. Replacing an
//! existing sighting does not notify anyone again.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Sighting, SightingCandidate, SightingId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::alerts::{self, Entity};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, resolve_put_target};

/// Request payload for recording or replacing a sighting.
///
/// A location is either `place` or the `latitude`/`longitude` pair,
/// depending on the configured location policy.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SightingRequest {
    /// Must be absent on create.
    pub id: Option<i64>,
    pub animal_id: Option<i64>,
    pub user_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub place: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(minimum = 1)]
    pub count: Option<i32>,
}

impl From<SightingRequest> for SightingCandidate {
    fn from(value: SightingRequest) -> Self {
        Self {
            animal_id: value.animal_id,
            user_id: value.user_id,
            date: value.date,
            place: value.place,
            latitude: value.latitude,
            longitude: value.longitude,
            count: value.count,
        }
    }
}

/// Stored sighting.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SightingResponse {
    pub id: i64,
    pub animal_id: i64,
    pub user_id: i64,
    pub date: Option<NaiveDate>,
    pub place: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub count: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

impl From<Sighting> for SightingResponse {
    fn from(value: Sighting) -> Self {
        let location = value.location();
        let (latitude, longitude) = location.lat_lon().unzip();
        Self {
            id: value.id().value(),
            animal_id: value.animal_id().value(),
            user_id: value.user_id().value(),
            date: value.date(),
            place: location.place_name().map(str::to_owned),
            latitude,
            longitude,
            count: value.count().map(|count| count.get()),
            recorded_at: value.recorded_at(),
        }
    }
}

async fn write_sighting(
    state: &HttpState,
    target: Option<SightingId>,
    candidate: SightingCandidate,
) -> ApiResult<HttpResponse> {
    match target {
        Some(id) => {
            let sighting = SightingResponse::from(state.sightings.update(id, candidate).await?);
            Ok(alerts::updated(Entity::Sighting, sighting.id, &sighting))
        }
        None => {
            let sighting = SightingResponse::from(state.sightings.ingest(candidate).await?);
            Ok(alerts::created(Entity::Sighting, sighting.id, &sighting))
        }
    }
}

/// Record a sighting and notify the animal's subscribers.
#[utoipa::path(
    post,
    path = "/api/v1/sightings",
    request_body = SightingRequest,
    responses(
        (status = 201, description = "Sighting recorded; notifications queued", body = SightingResponse),
        (status = 400, description = "Invalid sighting or id supplied", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sightings"],
    operation_id = "createSighting"
)]
#[post("/sightings")]
pub async fn create_sighting(
    state: web::Data<HttpState>,
    payload: web::Json<SightingRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.id.is_some() {
        return Ok(alerts::id_exists(Entity::Sighting));
    }
    write_sighting(&state, None, payload.into()).await
}

/// Replace the sighting named by the body id, or record a new one.
#[utoipa::path(
    put,
    path = "/api/v1/sightings",
    request_body = SightingRequest,
    responses(
        (status = 200, description = "Sighting replaced", body = SightingResponse),
        (status = 201, description = "Sighting recorded", body = SightingResponse),
        (status = 400, description = "Invalid sighting", body = ErrorSchema),
        (status = 404, description = "Sighting not found", body = ErrorSchema)
    ),
    tags = ["sightings"],
    operation_id = "replaceSighting"
)]
#[put("/sightings")]
pub async fn replace_sighting(
    state: web::Data<HttpState>,
    payload: web::Json<SightingRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let target = resolve_put_target(None, payload.id)?;
    write_sighting(&state, target, payload.into()).await
}

/// Replace the sighting at `id`.
#[utoipa::path(
    put,
    path = "/api/v1/sightings/{id}",
    params(("id" = i64, Path, description = "Sighting id")),
    request_body = SightingRequest,
    responses(
        (status = 200, description = "Sighting replaced", body = SightingResponse),
        (status = 400, description = "Invalid sighting or id mismatch", body = ErrorSchema),
        (status = 404, description = "Sighting not found", body = ErrorSchema)
    ),
    tags = ["sightings"],
    operation_id = "replaceSightingById"
)]
#[put("/sightings/{id}")]
pub async fn replace_sighting_by_id(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<SightingRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let target = resolve_put_target(Some(path.into_inner()), payload.id)?;
    write_sighting(&state, target, payload.into()).await
}

/// List every sighting in id order.
#[utoipa::path(
    get,
    path = "/api/v1/sightings",
    responses(
        (status = 200, description = "All sightings", body = [SightingResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sightings"],
    operation_id = "listSightings"
)]
#[get("/sightings")]
pub async fn list_sightings(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SightingResponse>>> {
    let sightings = state.sightings.list().await?;
    Ok(web::Json(
        sightings.into_iter().map(SightingResponse::from).collect(),
    ))
}

/// Fetch one sighting.
#[utoipa::path(
    get,
    path = "/api/v1/sightings/{id}",
    params(("id" = i64, Path, description = "Sighting id")),
    responses(
        (status = 200, description = "Sighting", body = SightingResponse),
        (status = 404, description = "Sighting not found", body = ErrorSchema)
    ),
    tags = ["sightings"],
    operation_id = "getSighting"
)]
#[get("/sightings/{id}")]
pub async fn get_sighting(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<SightingResponse>> {
    let id: SightingId = parse_id(path.into_inner())?;
    Ok(web::Json(state.sightings.get(id).await?.into()))
}

/// Remove a sighting. Delivery records for it are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/sightings/{id}",
    params(("id" = i64, Path, description = "Sighting id")),
    responses(
        (status = 200, description = "Sighting deleted"),
        (status = 404, description = "Sighting not found", body = ErrorSchema)
    ),
    tags = ["sightings"],
    operation_id = "deleteSighting"
)]
#[delete("/sightings/{id}")]
pub async fn delete_sighting(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id: SightingId = parse_id(path.into_inner())?;
    state.sightings.delete(id).await?;
    Ok(alerts::deleted(Entity::Sighting, id.value()))
}

#[cfg(test)]
#[path = "sightings_tests.rs"]
mod tests;
