//! Minimal user directory handlers.
//!
//! Users exist so subscriptions and sightings have someone to point at and
//! so the dispatcher can resolve an email address.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserCandidate, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::alerts::{self, Entity};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_id;

/// Request payload for registering a user.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    /// Must be absent.
    pub id: Option<i64>,
    #[schema(max_length = 50)]
    pub login: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
}

impl From<UserRequest> for UserCandidate {
    fn from(value: UserRequest) -> Self {
        Self {
            login: value.login,
            email: value.email,
        }
    }
}

/// Registered user.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id().value(),
            login: value.login().to_string(),
            email: value.email().map(ToString::to_string),
        }
    }
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid request, duplicate login, or id supplied", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.id.is_some() {
        return Ok(alerts::id_exists(Entity::User));
    }
    let user = UserResponse::from(state.users.register(payload.into()).await?);
    Ok(alerts::created(Entity::User, user.id, &user))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let id: UserId = parse_id(path.into_inner())?;
    Ok(web::Json(state.users.get(id).await?.into()))
}
