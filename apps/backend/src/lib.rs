pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use hsk_srs_core::{Clock, Scheduler, SystemClock};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub scheduler: Arc<Scheduler>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State with the default scheduler and the wall clock
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    /// State with an injected clock (tests, replays)
    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Arc::new(db),
            scheduler: Arc::new(Scheduler::default()),
            clock,
        }
    }
}

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Device routes
        .route("/api/device/status", get(routes::device::status))
        // Progress routes
        .route(
            "/api/progress",
            get(routes::progress::download)
                .put(routes::progress::upload)
                .delete(routes::progress::reset),
        )
        // Study routes
        .route("/api/study/review", post(routes::study::review))
        .route("/api/study/queue", post(routes::study::queue))
        .route("/api/study/status/:item_key", get(routes::study::status))
        .route("/api/study/history/:item_key", get(routes::study::history))
        // Stats routes
        .route("/api/stats", get(routes::stats::get))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/device/register", post(routes::device::register))
        .merge(protected_routes)
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::from_config(&config).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let app = router(AppState::new(db)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
