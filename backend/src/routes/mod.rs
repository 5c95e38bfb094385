//! Route definitions for the CropWatch monitoring platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - user profile
        .nest("/users", user_routes())
        // Protected routes - farm management, NDVI data, analysis
        .nest("/farms", farm_routes())
        // Protected routes - bulk analysis
        .nest("/analysis", analysis_routes())
        // Protected routes - alert management
        .nest("/alerts", alert_routes())
        // Protected routes - training videos
        .nest("/videos", video_routes())
        // Protected routes - notifications
        .nest("/notifications", notification_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// User profile routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_profile).put(handlers::update_profile))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Farm management routes (protected)
fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms).post(handlers::create_farm))
        .route(
            "/:farm_id",
            get(handlers::get_farm)
                .put(handlers::update_farm)
                .delete(handlers::delete_farm),
        )
        // NDVI readings
        .route(
            "/:farm_id/ndvi",
            get(handlers::get_ndvi_history).post(handlers::add_ndvi_sample),
        )
        .route("/:farm_id/ndvi/sync", post(handlers::sync_ndvi))
        // Stress classification and forecasting
        .route("/:farm_id/stress", get(handlers::get_stress))
        .route("/:farm_id/forecast", get(handlers::get_forecast))
        .route("/:farm_id/analyze", post(handlers::analyze_farm))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Bulk analysis routes (protected)
fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/bulk", post(handlers::run_bulk_analysis))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Alert management routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/statistics", get(handlers::get_alert_statistics))
        .route("/:alert_id/acknowledge", post(handlers::acknowledge_alert))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Training video routes (protected)
fn video_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::search_videos))
        .route("/progress", get(handlers::get_video_progress))
        .route("/statistics", get(handlers::get_video_statistics))
        .route("/:video_id/progress", put(handlers::update_video_progress))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/mark-all-read", post(handlers::mark_all_as_read))
        .route("/:notification_id/read", post(handlers::mark_as_read))
        .route_layer(middleware::from_fn(auth_middleware))
}
