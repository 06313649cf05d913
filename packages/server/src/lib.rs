#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the hotspot map dashboard.
//!
//! Serves the hotspot pipeline over a small JSON API. Each request runs
//! the pipeline for one parameter tuple on a blocking thread; the accident
//! table itself is loaded once and shared through the process-wide
//! dataset cache.

mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use hotspot_map_hotspot::Dashboard;
use hotspot_map_source::progress::null_progress;

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Configured dataset plus the hotspot pipeline.
    pub dashboard: Dashboard,
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindConfig {
    /// Interface address.
    pub addr: String,
    /// TCP port.
    pub port: u16,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl BindConfig {
    /// Reads `BIND_ADDR` and `PORT`, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/controls", web::get().to(handlers::controls))
            .route("/dataset", web::get().to(handlers::dataset))
            .route("/hotspots", web::get().to(handlers::hotspots))
            .route("/records", web::get().to(handlers::records)),
    );
}

/// Starts the hotspot map API server.
///
/// Loads the configured dataset up front so the first request does not pay
/// for it. A dataset that fails to load is logged and retried on each
/// request, which answers `503` until it succeeds. This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(dashboard: Dashboard, bind: BindConfig) -> std::io::Result<()> {
    log::info!(
        "Loading dataset {}...",
        dashboard.config().dataset_path.display()
    );
    let warm = dashboard.clone();
    match tokio::task::spawn_blocking(move || warm.dataset(&null_progress())).await {
        Ok(Ok(dataset)) => log::info!("Dataset ready: {} accidents", dataset.records.len()),
        Ok(Err(e)) => log::warn!("Dataset unavailable: {e}"),
        Err(e) => log::warn!("Dataset load task failed: {e}"),
    }

    let state = web::Data::new(AppState { dashboard });

    log::info!("Starting server on {}:{}", bind.addr, bind.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind.addr, bind.port))?
    .run()
    .await
}
