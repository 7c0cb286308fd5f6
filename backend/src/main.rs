//! Spotting service entry-point: loads settings, opens storage, and serves
//! the REST API while the dispatch worker fans sightings out to subscribers.

mod server;

use std::time::Duration;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, SpottingSettings, create_server};
use spotting::inbound::http::health::HealthState;
use spotting::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

/// Upper bound on waiting for in-flight fan-outs after the server stops.
const DISPATCH_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

async fn open_pool(settings: &SpottingSettings, database_url: &str) -> std::io::Result<DbPool> {
    run_pending_migrations(database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("database migration failed: {e}")))?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool creation failed: {e}")))?;
    info!(max_size = settings.pool_max_size(), "database pool ready");
    Ok(pool)
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("spotting")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = SpottingSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let mut config =
        ServerConfig::from_settings(&settings).map_err(|e| std::io::Error::other(e.to_string()))?;
    if let Some(database_url) = settings.database_url.as_deref() {
        config = config.with_db_pool(open_pool(&settings, database_url).await?);
    }
    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(make_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    let running = create_server(health_state.clone(), config)?;
    info!(bind_addr = ?settings.bind_addr(), "spotting service listening");

    let served = running.server.await;
    health_state.mark_draining();

    // The HTTP workers owned the queue senders; once they are gone the
    // worker finishes the fan-outs already in flight.
    match tokio::time::timeout(DISPATCH_DRAIN_TIMEOUT, running.dispatch_worker).await {
        Ok(Ok(())) => info!("dispatch worker drained"),
        Ok(Err(e)) => warn!(error = %e, "dispatch worker ended abnormally"),
        Err(_) => warn!(
            timeout_secs = DISPATCH_DRAIN_TIMEOUT.as_secs(),
            "gave up waiting for in-flight notifications"
        ),
    }

    served
}
