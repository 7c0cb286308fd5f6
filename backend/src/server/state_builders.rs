//! Builders wiring repositories, domain services, and the dispatch worker.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use spotting::domain::ports::{
    AnimalRepository, DeliveryLedger, DeliveryMetrics, NoOpDeliveryMetrics,
    RepositorySubscriptionIndex, SightingRepository, SubscriptionRepository, UserRepository,
};
use spotting::domain::{
    AnimalCatalogueService, DispatcherPorts, NotificationDispatcher, SightingIngestPorts,
    SightingIngestService, SubscriptionRegistryService, UserDirectoryService,
};
use spotting::inbound::http::state::HttpState;
#[cfg(feature = "metrics")]
use spotting::outbound::metrics::PrometheusDeliveryMetrics;
use spotting::outbound::notification::TracingNotificationChannel;
use spotting::outbound::persistence::{
    DbPool, DieselAnimalRepository, DieselDeliveryLedger, DieselSightingRepository,
    DieselSubscriptionRepository, DieselUserRepository, InMemoryDatabase,
};
use spotting::outbound::queue::{DispatchWorker, TokioDispatchQueue};
use tracing::{info, warn};

use super::ServerConfig;

/// Driven adapters for one storage backend.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) animals: Arc<dyn AnimalRepository>,
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) subscriptions: Arc<dyn SubscriptionRepository>,
    pub(crate) sightings: Arc<dyn SightingRepository>,
    pub(crate) ledger: Arc<dyn DeliveryLedger>,
}

impl Repositories {
    pub(crate) fn diesel(pool: &DbPool) -> Self {
        Self {
            animals: Arc::new(DieselAnimalRepository::new(pool.clone())),
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
            sightings: Arc::new(DieselSightingRepository::new(pool.clone())),
            ledger: Arc::new(DieselDeliveryLedger::new(pool.clone())),
        }
    }

    pub(crate) fn in_memory(database: &InMemoryDatabase) -> Self {
        Self {
            animals: Arc::new(database.animals()),
            users: Arc::new(database.users()),
            subscriptions: Arc::new(database.subscriptions()),
            sightings: Arc::new(database.sightings()),
            ledger: Arc::new(database.delivery_ledger()),
        }
    }
}

/// Pick database-backed adapters when a pool is available, otherwise a fresh
/// in-memory store.
fn select_repositories<Pool>(
    pool: &Option<Pool>,
    make_db: impl FnOnce(&Pool) -> Repositories,
) -> Repositories {
    match pool {
        Some(pool) => make_db(pool),
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            Repositories::in_memory(&InMemoryDatabase::new())
        }
    }
}

#[cfg(feature = "metrics")]
fn build_delivery_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn DeliveryMetrics>> {
    match &config.prometheus {
        Some(prometheus) => {
            let metrics = PrometheusDeliveryMetrics::new(&prometheus.registry).map_err(|e| {
                std::io::Error::other(format!("delivery metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpDeliveryMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_delivery_metrics(_config: &ServerConfig) -> std::io::Result<Arc<dyn DeliveryMetrics>> {
    Ok(Arc::new(NoOpDeliveryMetrics))
}

/// HTTP state plus the worker that drains the dispatch queue it feeds.
pub(crate) struct AppServices {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) worker: DispatchWorker,
}

/// Wire services over the given repositories.
pub(crate) fn build_services_with(
    config: &ServerConfig,
    repositories: Repositories,
) -> std::io::Result<AppServices> {
    let Repositories {
        animals,
        users,
        subscriptions,
        sightings,
        ledger,
    } = repositories;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let (queue, receiver) = TokioDispatchQueue::bounded(config.queue_capacity);
    let dispatcher = NotificationDispatcher::new(
        DispatcherPorts::new(
            Arc::new(RepositorySubscriptionIndex::new(subscriptions.clone())),
            Arc::new(TracingNotificationChannel::new()),
        )
        .with_ledger(ledger)
        .with_metrics(build_delivery_metrics(config)?),
        clock.clone(),
        config.dispatcher.clone(),
    );
    let worker = DispatchWorker::new(receiver, Arc::new(dispatcher));

    let ingest = SightingIngestService::new(
        SightingIngestPorts {
            sightings,
            animals: animals.clone(),
            users: users.clone(),
            queue: Arc::new(queue),
        },
        clock,
        config.location_policy,
    );

    info!(
        location_policy = %config.location_policy,
        max_concurrent_deliveries = config.dispatcher.max_concurrent_deliveries,
        max_attempts = config.dispatcher.max_attempts,
        queue_capacity = config.queue_capacity,
        "services wired"
    );

    Ok(AppServices {
        http_state: web::Data::new(HttpState::new(
            Arc::new(AnimalCatalogueService::new(animals.clone())),
            Arc::new(ingest),
            Arc::new(SubscriptionRegistryService::new(
                subscriptions,
                animals,
                users.clone(),
            )),
            Arc::new(UserDirectoryService::new(users)),
        )),
        worker,
    })
}

/// Wire services over the configured storage backend.
pub(crate) fn build_services(config: &ServerConfig) -> std::io::Result<AppServices> {
    let repositories = select_repositories(&config.db_pool, Repositories::diesel);
    build_services_with(config, repositories)
}
