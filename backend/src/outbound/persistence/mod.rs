//! Persistence adapters for the repository ports.
//!
//! Two families live here:
//!
//! - **Diesel/PostgreSQL** repositories over a `bb8` pool via
//!   `diesel-async`. Row structs (`models.rs`) and table definitions
//!   (`schema.rs`) stay private to this module; repositories only translate
//!   between rows and validated domain values.
//! - **In-memory** repositories sharing one [`InMemoryDatabase`], used when
//!   no database is configured and by behavioural tests.
//!
//! Database errors map onto the ports' `Connection`/`Query` variants so the
//! domain can tell an unavailable store from a failed statement.

mod diesel_animal_repository;
mod diesel_basic_error_mapping;
mod diesel_delivery_ledger;
mod diesel_sighting_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod memory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_animal_repository::DieselAnimalRepository;
pub use diesel_delivery_ledger::DieselDeliveryLedger;
pub use diesel_sighting_repository::DieselSightingRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use memory::{
    InMemoryAnimalRepository, InMemoryDatabase, InMemoryDeliveryLedger,
    InMemorySightingRepository, InMemorySubscriptionRepository, InMemoryUserRepository,
};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
