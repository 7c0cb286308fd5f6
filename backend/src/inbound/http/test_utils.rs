//! Test helpers for the HTTP handlers.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockAnimalCatalogue, MockSightingService, MockSubscriptionRegistry, MockUserDirectory,
};
use crate::inbound::http::api_v1;
use crate::inbound::http::state::HttpState;

/// Driving-port mocks for a handler test. Ports left at their default panic
/// on any call.
#[derive(Default)]
pub struct MockPorts {
    pub animals: MockAnimalCatalogue,
    pub sightings: MockSightingService,
    pub subscriptions: MockSubscriptionRegistry,
    pub users: MockUserDirectory,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.animals),
            Arc::new(self.sightings),
            Arc::new(self.subscriptions),
            Arc::new(self.users),
        )
    }
}

/// Application serving the full `/api/v1` surface over the given mocks.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .configure(api_v1)
}

/// Header value as a string slice.
pub fn header_str<'a>(response: &'a ServiceResponse, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
