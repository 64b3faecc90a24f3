use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn welcome() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "message": "Welcome to the session control API"
        })),
    )
}

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "session-control-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
