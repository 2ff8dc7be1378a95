// src/web/mod.rs
// HTTP/WebSocket binding for the arena

pub mod api;
pub mod error;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health))
        // Session lifecycle
        .route("/start", post(api::start))
        .route("/move", post(api::make_move))
        .route("/reset", post(api::reset))
        .route("/terminate", post(api::terminate))
        .route("/sessions", get(api::list_sessions))
        .route("/sessions/{id}/logs", get(api::session_logs))
        // Model selection
        .route("/models", get(api::list_models))
        .route("/models/current", put(api::select_model))
        // WebSocket log rooms
        .route("/ws", get(ws::handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
