//! Response builders carrying the entity alert headers.
//!
//! Every successful write answers with
//! `X-animalSpottingApp-alert: animalSpottingApp.<entity>.<action>` and
//! `X-animalSpottingApp-params: <id>`. A create that already names an id is
//! refused with `X-animalSpottingApp-error: error.idexists`.

use actix_web::HttpResponse;
use actix_web::http::header;
use serde::Serialize;
use serde_json::json;

use crate::domain::{Error, TRACE_ID_HEADER};

/// Header announcing the write that took place.
pub const ALERT_HEADER: &str = "X-animalSpottingApp-alert";
/// Header carrying the alert parameter (entity id, or entity name on error).
pub const PARAMS_HEADER: &str = "X-animalSpottingApp-params";
/// Header carrying the error key of a refused write.
pub const ERROR_HEADER: &str = "X-animalSpottingApp-error";

const APP_NAME: &str = "animalSpottingApp";
const API_PREFIX: &str = "/api/v1";

/// Entities exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Animal,
    Sighting,
    Subscription,
    User,
}

impl Entity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Animal => "animal",
            Self::Sighting => "sighting",
            Self::Subscription => "subscription",
            Self::User => "user",
        }
    }

    fn collection(self) -> &'static str {
        match self {
            Self::Animal => "animals",
            Self::Sighting => "sightings",
            Self::Subscription => "subscriptions",
            Self::User => "users",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Created,
    Updated,
    Deleted,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

fn alert(entity: Entity, action: Action) -> String {
    format!("{APP_NAME}.{}.{}", entity.name(), action.as_str())
}

/// `201 Created` with a `Location` header and the stored body.
pub fn created<T: Serialize>(entity: Entity, id: i64, body: &T) -> HttpResponse {
    HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("{API_PREFIX}/{}/{id}", entity.collection()),
        ))
        .insert_header((ALERT_HEADER, alert(entity, Action::Created)))
        .insert_header((PARAMS_HEADER, id.to_string()))
        .json(body)
}

/// `200 OK` with the replaced body.
pub fn updated<T: Serialize>(entity: Entity, id: i64, body: &T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ALERT_HEADER, alert(entity, Action::Updated)))
        .insert_header((PARAMS_HEADER, id.to_string()))
        .json(body)
}

/// `200 OK` with an empty body.
pub fn deleted(entity: Entity, id: i64) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ALERT_HEADER, alert(entity, Action::Deleted)))
        .insert_header((PARAMS_HEADER, id.to_string()))
        .finish()
}

/// `400 Bad Request` for a create that already carries an id.
pub fn id_exists(entity: Entity) -> HttpResponse {
    let error = Error::invalid_request(format!("a new {} cannot already have an id", entity.name()))
        .with_details(json!({ "field": "id", "code": "idexists" }));
    let mut builder = HttpResponse::BadRequest();
    builder
        .insert_header((ERROR_HEADER, "error.idexists"))
        .insert_header((PARAMS_HEADER, entity.name()));
    if let Some(trace_id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, trace_id.to_owned()));
    }
    builder.json(error)
}
