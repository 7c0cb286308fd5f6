//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{ServerConfig, SpottingSettings};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tokio::task::JoinHandle;

use spotting::Trace;
#[cfg(debug_assertions)]
use spotting::doc::ApiDoc;
use spotting::inbound::http::api_v1;
use spotting::inbound::http::health::{HealthState, live, ready};
use spotting::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_services;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(api_v1)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// A bound server and the dispatch worker fed by its sighting endpoints.
pub struct RunningServer {
    pub server: Server,
    /// Finishes once every HTTP worker has stopped and the in-flight
    /// fan-outs have drained.
    pub dispatch_worker: JoinHandle<()>,
}

/// Bind the HTTP server and start the dispatch worker.
///
/// Readiness is flagged once both are running.
///
/// # Errors
/// Propagates [`std::io::Error`] when metric registration or binding fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let services = build_services(&config)?;
    let http_state = services.http_state;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus.clone());

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(config.bind_addr)?
    .run();

    let dispatch_worker = services.worker.spawn();
    health_state.mark_ready();
    Ok(RunningServer {
        server,
        dispatch_worker,
    })
}
