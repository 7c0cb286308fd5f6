//! Runtime settings and the server configuration built from them.
//!
//! [`SpottingSettings`] is loaded through OrthoConfig from CLI flags,
//! `SPOTTING_*` environment variables, and an optional config file. The pool
//! size carries an OrthoConfig default, so an empty environment still loads;
//! the remaining fields are optional and their accessors supply defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use spotting::domain::{DispatcherConfig, LocationPolicy, ParseLocationPolicyError};
use spotting::outbound::persistence::DbPool;
use spotting::outbound::queue::DEFAULT_DISPATCH_QUEUE_CAPACITY;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Failure turning settings into a usable configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error(transparent)]
    LocationPolicy(#[from] ParseLocationPolicyError),
}

/// Settings controlling the HTTP server, storage, and notification dispatch.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SPOTTING")]
pub struct SpottingSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. When absent the service keeps everything in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Which sighting locations are accepted: `place`, `coordinates`, or
    /// `either`.
    pub location_policy: Option<String>,
    /// Channel calls allowed in flight across all fan-outs.
    pub max_concurrent_deliveries: Option<usize>,
    /// Channel calls per subscriber, including the first.
    pub max_delivery_attempts: Option<u32>,
    /// First retry delay in milliseconds.
    pub initial_backoff_ms: Option<u64>,
    /// Retry delay cap in milliseconds.
    pub max_backoff_ms: Option<u64>,
    /// Recorded sightings that may wait for the dispatch worker.
    pub queue_capacity: Option<usize>,
}

impl SpottingSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }

    pub fn location_policy(&self) -> Result<LocationPolicy, SettingsError> {
        match self.location_policy.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(LocationPolicy::default()),
        }
    }

    /// Dispatcher limits, falling back to the dispatcher defaults per field.
    pub fn dispatcher(&self) -> DispatcherConfig {
        let defaults = DispatcherConfig::default();
        DispatcherConfig {
            max_concurrent_deliveries: self
                .max_concurrent_deliveries
                .unwrap_or(defaults.max_concurrent_deliveries),
            max_attempts: self.max_delivery_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .initial_backoff_ms
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: self
                .max_backoff_ms
                .map_or(defaults.max_backoff, Duration::from_millis),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or(DEFAULT_DISPATCH_QUEUE_CAPACITY)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) location_policy: LocationPolicy,
    pub(crate) dispatcher: DispatcherConfig,
    pub(crate) queue_capacity: usize,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration with default limits and no storage attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            location_policy: LocationPolicy::default(),
            dispatcher: DispatcherConfig::default(),
            queue_capacity: DEFAULT_DISPATCH_QUEUE_CAPACITY,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Derive a configuration from loaded settings. Storage is attached
    /// separately because opening the pool is async.
    pub fn from_settings(settings: &SpottingSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            location_policy: settings.location_policy()?,
            dispatcher: settings.dispatcher(),
            queue_capacity: settings.queue_capacity(),
            ..Self::new(settings.bind_addr()?)
        })
    }

    /// Attach a database pool; without one the in-memory adapters are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 9] = [
        "SPOTTING_BIND_ADDR",
        "SPOTTING_DATABASE_URL",
        "SPOTTING_POOL_MAX_SIZE",
        "SPOTTING_LOCATION_POLICY",
        "SPOTTING_MAX_CONCURRENT_DELIVERIES",
        "SPOTTING_MAX_DELIVERY_ATTEMPTS",
        "SPOTTING_INITIAL_BACKOFF_MS",
        "SPOTTING_MAX_BACKOFF_MS",
        "SPOTTING_QUEUE_CAPACITY",
    ];

    fn load_from_empty_args() -> SpottingSettings {
        SpottingSettings::load_from_iter([OsString::from("spotting")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.pool_max_size(), 10);
        assert_eq!(
            settings.location_policy().expect("default policy"),
            LocationPolicy::Either
        );
        assert_eq!(settings.dispatcher(), DispatcherConfig::default());
        assert_eq!(settings.queue_capacity(), DEFAULT_DISPATCH_QUEUE_CAPACITY);
    }

    #[rstest]
    fn empty_environment_yields_an_in_memory_server() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        let config = ServerConfig::from_settings(&settings).expect("default server config");

        assert!(settings.database_url.is_none());
        assert!(config.db_pool.is_none());
        assert_eq!(config.location_policy, LocationPolicy::Either);
        assert_eq!(config.queue_capacity, DEFAULT_DISPATCH_QUEUE_CAPACITY);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SPOTTING_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "SPOTTING_DATABASE_URL",
                Some("postgres://localhost/spotting".to_owned()),
            ),
            ("SPOTTING_POOL_MAX_SIZE", Some("3".to_owned())),
            ("SPOTTING_LOCATION_POLICY", Some("coordinates".to_owned())),
            ("SPOTTING_MAX_CONCURRENT_DELIVERIES", Some("16".to_owned())),
            ("SPOTTING_MAX_DELIVERY_ATTEMPTS", Some("5".to_owned())),
            ("SPOTTING_INITIAL_BACKOFF_MS", Some("50".to_owned())),
            ("SPOTTING_MAX_BACKOFF_MS", Some("1000".to_owned())),
            ("SPOTTING_QUEUE_CAPACITY", Some("8".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr.as_deref(), Some("127.0.0.1:9090"));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/spotting")
        );
        assert_eq!(settings.pool_max_size(), 3);
        assert_eq!(
            settings.location_policy().expect("policy"),
            LocationPolicy::Coordinates
        );
        assert_eq!(
            settings.dispatcher(),
            DispatcherConfig {
                max_concurrent_deliveries: 16,
                max_attempts: 5,
                initial_backoff: Duration::from_millis(50),
                max_backoff: Duration::from_secs(1),
            }
        );
        assert_eq!(settings.queue_capacity(), 8);
    }

    #[rstest]
    #[case("SPOTTING_BIND_ADDR", "nowhere")]
    #[case("SPOTTING_LOCATION_POLICY", "telepathy")]
    fn invalid_values_fail_server_configuration(#[case] name: &str, #[case] value: &str) {
        let _guard = lock_env(VARS.map(|var| {
            let override_value = (var == name).then(|| value.to_owned());
            (var, override_value)
        }));

        let settings = load_from_empty_args();

        assert!(ServerConfig::from_settings(&settings).is_err());
    }
}
