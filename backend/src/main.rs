//! CropWatch - Crop Stress Monitoring Backend Server
//!
//! Tracks vegetation health per farm from NDVI readings, classifies
//! crop stress, forecasts the coming days, and alerts farmers before
//! stress becomes visible damage.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use config::Config;

use external::{
    ConsoleSmsChannel, ImageryProvider, LlmStressAnalyzer, NotificationChannel,
    RuleBasedAnalyzer, SatelliteImageryClient, SmsGatewayClient, StressAnalyzer,
    SyntheticImagery, VideoSearchClient,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub imagery: Arc<dyn ImageryProvider>,
    pub analyzer: Arc<dyn StressAnalyzer>,
    pub notifier: Arc<dyn NotificationChannel>,
    pub video: Option<VideoSearchClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cropwatch_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting CropWatch Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // Create application state
    let state = build_state(db_pool, config);

    // Build application
    let app = create_app(state.clone());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire up external providers based on which API keys are configured.
/// Missing keys select the deterministic fallbacks so a development
/// deployment works without any credentials.
fn build_state(db: sqlx::PgPool, config: Config) -> AppState {
    let imagery: Arc<dyn ImageryProvider> = match &config.imagery.api_key {
        Some(key) => {
            tracing::info!("Using satellite imagery API");
            Arc::new(SatelliteImageryClient::new(
                config.imagery.api_endpoint.clone(),
                key.clone(),
            ))
        }
        None => {
            tracing::info!("No imagery API key configured, using synthetic observations");
            Arc::new(SyntheticImagery)
        }
    };

    let analyzer: Arc<dyn StressAnalyzer> = match &config.analyzer.api_key {
        Some(key) => {
            tracing::info!("Using LLM stress analyzer ({})", config.analyzer.model);
            Arc::new(LlmStressAnalyzer::new(
                config.analyzer.api_endpoint.clone(),
                key.clone(),
                config.analyzer.model.clone(),
            ))
        }
        None => {
            tracing::info!("No analyzer API key configured, using rule-based classifier");
            Arc::new(RuleBasedAnalyzer)
        }
    };

    let notifier: Arc<dyn NotificationChannel> = match &config.sms.api_key {
        Some(key) => {
            tracing::info!("Using SMS gateway for alert delivery");
            Arc::new(SmsGatewayClient::new(
                config.sms.api_endpoint.clone(),
                key.clone(),
            ))
        }
        None => {
            tracing::info!("No SMS API key configured, alerts log to console");
            Arc::new(ConsoleSmsChannel)
        }
    };

    let video = config.video.api_key.as_ref().map(|key| {
        tracing::info!("Using video search API");
        VideoSearchClient::new(
            config.video.api_endpoint.clone(),
            key.clone(),
            config.video.max_results,
        )
    });

    AppState {
        db,
        config: Arc::new(config),
        imagery,
        analyzer,
        notifier,
        video,
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "CropWatch Crop Stress Monitoring API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
