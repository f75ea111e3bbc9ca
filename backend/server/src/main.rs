//! Funnel backend — entry point.
//!
//! Serves the programmatic marketing pages and sitemap, and exposes the
//! lead-capture funnel API (sessions, submission, payment orchestration,
//! pending-payment recovery).  A background sweeper purges expired
//! payment records from SQLite.

mod analytics;
mod api;
mod config;
mod db;
mod errors;
mod gateway;
mod orchestrator;
mod pages;
mod sessions;
mod sitemap;
mod sweeper;

#[cfg(test)]
mod test_orchestrator;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analytics::AnalyticsEmitter;
use config::Config;
use gateway::HttpGateway;
use orchestrator::Orchestrator;
use sessions::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // HTTP client shared between the gateway and the analytics emitter.
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let sessions = SessionStore::new();

    // ─── Background sweeper ───────────────────────────────
    let sweeper_state = Arc::new(sweeper::SweeperState {
        pool: pool.clone(),
        sessions: sessions.clone(),
        interval: std::time::Duration::from_secs(config.sweep_interval_secs),
    });
    tokio::spawn(sweeper::run(sweeper_state));

    // ─── REST API & pages ─────────────────────────────────
    let gateway = HttpGateway::new(
        client.clone(),
        config.submission_url.clone(),
        config.payment_order_url.clone(),
        config.payment_verify_url.clone(),
    );
    let orchestrator = Orchestrator {
        sessions,
        pool,
        analytics: AnalyticsEmitter::new(client.clone(), config.analytics_url.clone()),
    };
    let state = Arc::new(api::AppState {
        config: config.clone(),
        orchestrator,
        gateway,
        client,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/sitemap.xml", get(api::sitemap_xml))
        .route("/consultation/:city", get(api::consultation_page))
        .route("/send-a-legal-notice/:topic", get(api::topic_page))
        .route(
            "/send-a-legal-notice/:topic/:city",
            get(api::topic_city_page),
        )
        .route("/api/funnel/session", post(api::create_session))
        .route("/api/funnel/:id", get(api::get_state))
        .route("/api/funnel/:id/open", post(api::open_form))
        .route("/api/funnel/:id/next", post(api::next_step))
        .route("/api/funnel/:id/prev", post(api::prev_step))
        .route("/api/funnel/:id/close", post(api::close_form))
        .route("/api/funnel/:id/reset", post(api::reset_form))
        .route("/api/funnel/:id/details", post(api::set_details))
        .route("/api/funnel/:id/interaction", post(api::field_interaction))
        .route("/api/funnel/:id/submit", post(api::submit))
        .route("/api/funnel/:id/pay", post(api::pay))
        .route("/api/funnel/:id/checkout", post(api::checkout_callback))
        .route("/api/funnel/:id/resume", post(api::resume))
        .route("/api/funnel/:id/banner-dismiss", post(api::banner_dismiss))
        .route("/api/lawyers/apply", post(api::lawyer_apply))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("Funnel server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
