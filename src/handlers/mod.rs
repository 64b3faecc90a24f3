pub mod health;
pub mod session;

use crate::session::types::RegistryError;
use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Map a registry error onto its HTTP shape
pub(crate) fn error_response(err: RegistryError) -> (StatusCode, Json<Value>) {
    let (status, message) = match err {
        RegistryError::MissingField(field) => (
            StatusCode::BAD_REQUEST,
            format!("Missing required field: {}", field),
        ),
        RegistryError::NotFound => (
            StatusCode::NOT_FOUND,
            "No active session found".to_string(),
        ),
        RegistryError::Internal(detail) => {
            tracing::error!("Session storage failure: {}", detail);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(json!({ "message": message })))
}
