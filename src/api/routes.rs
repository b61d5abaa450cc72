use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Conversational recommendation loop
        .route("/api/initialize", post(handlers::initialize))
        .route("/api/recommend", post(handlers::recommend))
        // Playback
        .route("/api/clients", get(handlers::clients))
        .route("/api/play", post(handlers::play))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
