//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{AnimalCatalogue, SightingService, SubscriptionRegistry, UserDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub animals: Arc<dyn AnimalCatalogue>,
    pub sightings: Arc<dyn SightingService>,
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
    pub users: Arc<dyn UserDirectory>,
}

impl HttpState {
    pub fn new(
        animals: Arc<dyn AnimalCatalogue>,
        sightings: Arc<dyn SightingService>,
        subscriptions: Arc<dyn SubscriptionRegistry>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            animals,
            sightings,
            subscriptions,
            users,
        }
    }
}
