//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the subscription index, the notification
//! channel, the dispatch queue, delivery ledger and metrics) describe what the
//! domain needs from adapters. Driving ports (catalogue, directory, registry,
//! sighting service) describe what inbound adapters may ask of the domain.
//! Each driven port exposes a typed error generated by `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod animal_catalogue;
mod animal_repository;
mod delivery_ledger;
mod delivery_metrics;
mod dispatch_queue;
mod notification_channel;
mod sighting_repository;
mod sighting_service;
mod subscription_index;
mod subscription_registry;
mod subscription_repository;
mod user_directory;
mod user_repository;

pub use animal_catalogue::AnimalCatalogue;
#[cfg(test)]
pub use animal_catalogue::MockAnimalCatalogue;
pub use animal_repository::{AnimalRepository, AnimalRepositoryError};
#[cfg(test)]
pub use animal_repository::MockAnimalRepository;
#[cfg(test)]
pub use delivery_ledger::MockDeliveryLedger;
pub use delivery_ledger::{
    DeliveryFailureKind, DeliveryLedger, DeliveryLedgerError, DeliveryRecord, DeliveryStatus,
    NoOpDeliveryLedger,
};
#[cfg(test)]
pub use delivery_metrics::MockDeliveryMetrics;
pub use delivery_metrics::{
    DeliveryFailure, DeliveryMetrics, DeliveryMetricsError, DeliverySuccess, NoOpDeliveryMetrics,
};
#[cfg(test)]
pub use dispatch_queue::MockDispatchQueue;
pub use dispatch_queue::{DispatchQueue, DispatchQueueError};
#[cfg(test)]
pub use notification_channel::MockNotificationChannel;
pub use notification_channel::{NotificationChannel, NotificationChannelError};
#[cfg(test)]
pub use sighting_repository::MockSightingRepository;
pub use sighting_repository::{SightingRepository, SightingRepositoryError};
#[cfg(test)]
pub use sighting_service::MockSightingService;
pub use sighting_service::SightingService;
#[cfg(test)]
pub use subscription_index::MockSubscriptionIndex;
pub use subscription_index::{
    RepositorySubscriptionIndex, SubscriptionIndex, SubscriptionIndexError,
};
#[cfg(test)]
pub use subscription_registry::MockSubscriptionRegistry;
pub use subscription_registry::SubscriptionRegistry;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{SubscriptionRepository, SubscriptionRepositoryError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
