// Library exports for testing

pub mod config;
pub mod handlers;
pub mod netinfo;
pub mod session;

use axum::{
    routing::{get, post, put},
    Router,
};
use session::SessionRegistry;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router around a shared session registry
pub fn create_app(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/", get(handlers::health::welcome))
        .route("/health", get(handlers::health::health_check))
        .route("/login", post(handlers::session::login))
        .route("/logout", post(handlers::session::logout))
        .route("/update", put(handlers::session::update))
        .route("/status", get(handlers::session::status))
        .route(
            "/listCurrentSessions",
            get(handlers::session::list_current_sessions),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}
