//! Animal catalogue HTTP handlers.
//!
//! ```text
//! POST   /api/v1/animals
//! PUT    /api/v1/animals
//! PUT    /api/v1/animals/{id}
//! GET    /api/v1/animals
//! GET    /api/v1/animals/{id}
//! DELETE /api/v1/animals/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Animal, AnimalCandidate, AnimalId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::alerts::{self, Entity};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, resolve_put_target};

/// Request payload for writing an animal.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRequest {
    /// Must be absent on create.
    pub id: Option<i64>,
    #[schema(max_length = 255)]
    pub name: Option<String>,
    #[schema(format = "uri")]
    pub picture_url: Option<String>,
}

impl From<AnimalRequest> for AnimalCandidate {
    fn from(value: AnimalRequest) -> Self {
        Self {
            name: value.name,
            picture_url: value.picture_url,
        }
    }
}

/// Stored animal.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalResponse {
    pub id: i64,
    pub name: String,
    #[schema(format = "uri")]
    pub picture_url: Option<String>,
}

impl From<Animal> for AnimalResponse {
    fn from(value: Animal) -> Self {
        Self {
            id: value.id().value(),
            name: value.name().to_string(),
            picture_url: value.picture_url().map(ToString::to_string),
        }
    }
}

async fn write_animal(
    state: &HttpState,
    target: Option<AnimalId>,
    candidate: AnimalCandidate,
) -> ApiResult<HttpResponse> {
    match target {
        Some(id) => {
            let animal = AnimalResponse::from(state.animals.update(id, candidate).await?);
            Ok(alerts::updated(Entity::Animal, animal.id, &animal))
        }
        None => {
            let animal = AnimalResponse::from(state.animals.create(candidate).await?);
            Ok(alerts::created(Entity::Animal, animal.id, &animal))
        }
    }
}

/// Add an animal to the catalogue.
#[utoipa::path(
    post,
    path = "/api/v1/animals",
    request_body = AnimalRequest,
    responses(
        (status = 201, description = "Animal created", body = AnimalResponse),
        (status = 400, description = "Invalid request or id supplied", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["animals"],
    operation_id = "createAnimal"
)]
#[post("/animals")]
pub async fn create_animal(
    state: web::Data<HttpState>,
    payload: web::Json<AnimalRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.id.is_some() {
        return Ok(alerts::id_exists(Entity::Animal));
    }
    write_animal(&state, None, payload.into()).await
}

/// Replace the animal named by the body id, or create one when no id is given.
#[utoipa::path(
    put,
    path = "/api/v1/animals",
    request_body = AnimalRequest,
    responses(
        (status = 200, description = "Animal replaced", body = AnimalResponse),
        (status = 201, description = "Animal created", body = AnimalResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Animal not found", body = ErrorSchema)
    ),
    tags = ["animals"],
    operation_id = "replaceAnimal"
)]
#[put("/animals")]
pub async fn replace_animal(
    state: web::Data<HttpState>,
    payload: web::Json<AnimalRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let target = resolve_put_target(None, payload.id)?;
    write_animal(&state, target, payload.into()).await
}

/// Replace the animal at `id`.
#[utoipa::path(
    put,
    path = "/api/v1/animals/{id}",
    params(("id" = i64, Path, description = "Animal id")),
    request_body = AnimalRequest,
    responses(
        (status = 200, description = "Animal replaced", body = AnimalResponse),
        (status = 400, description = "Invalid request or id mismatch", body = ErrorSchema),
        (status = 404, description = "Animal not found", body = ErrorSchema)
    ),
    tags = ["animals"],
    operation_id = "replaceAnimalById"
)]
#[put("/animals/{id}")]
pub async fn replace_animal_by_id(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<AnimalRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let target = resolve_put_target(Some(path.into_inner()), payload.id)?;
    write_animal(&state, target, payload.into()).await
}

/// List every animal in id order.
#[utoipa::path(
    get,
    path = "/api/v1/animals",
    responses(
        (status = 200, description = "All animals", body = [AnimalResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["animals"],
    operation_id = "listAnimals"
)]
#[get("/animals")]
pub async fn list_animals(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<AnimalResponse>>> {
    let animals = state.animals.list().await?;
    Ok(web::Json(
        animals.into_iter().map(AnimalResponse::from).collect(),
    ))
}

/// Fetch one animal.
#[utoipa::path(
    get,
    path = "/api/v1/animals/{id}",
    params(("id" = i64, Path, description = "Animal id")),
    responses(
        (status = 200, description = "Animal", body = AnimalResponse),
        (status = 404, description = "Animal not found", body = ErrorSchema)
    ),
    tags = ["animals"],
    operation_id = "getAnimal"
)]
#[get("/animals/{id}")]
pub async fn get_animal(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<AnimalResponse>> {
    let id: AnimalId = parse_id(path.into_inner())?;
    Ok(web::Json(state.animals.get(id).await?.into()))
}

/// Remove an animal. Subscriptions and sightings naming it are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/animals/{id}",
    params(("id" = i64, Path, description = "Animal id")),
    responses(
        (status = 200, description = "Animal deleted"),
        (status = 404, description = "Animal not found", body = ErrorSchema)
    ),
    tags = ["animals"],
    operation_id = "deleteAnimal"
)]
#[delete("/animals/{id}")]
pub async fn delete_animal(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id: AnimalId = parse_id(path.into_inner())?;
    state.animals.delete(id).await?;
    Ok(alerts::deleted(Entity::Animal, id.value()))
}

#[cfg(test)]
#[path = "animals_tests.rs"]
mod tests;
