//! HTTP inbound adapter exposing the REST surface under `/api/v1`.

use actix_web::web;

pub mod alerts;
pub mod animals;
pub mod error;
pub mod health;
pub mod schemas;
pub mod sightings;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the `/api/v1` scope with JSON and path errors rendered as domain
/// errors.
pub fn api_v1(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/api/v1")
                .service(animals::create_animal)
                .service(animals::replace_animal)
                .service(animals::replace_animal_by_id)
                .service(animals::list_animals)
                .service(animals::get_animal)
                .service(animals::delete_animal)
                .service(sightings::create_sighting)
                .service(sightings::replace_sighting)
                .service(sightings::replace_sighting_by_id)
                .service(sightings::list_sightings)
                .service(sightings::get_sighting)
                .service(sightings::delete_sighting)
                .service(subscriptions::create_subscription)
                .service(subscriptions::replace_subscription)
                .service(subscriptions::replace_subscription_by_id)
                .service(subscriptions::list_subscriptions)
                .service(subscriptions::get_subscription)
                .service(subscriptions::delete_subscription)
                .service(users::register_user)
                .service(users::get_user),
        );
}
