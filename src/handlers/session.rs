// HTTP handlers for the session lifecycle endpoints

use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use super::error_response;
use crate::session::manager::SessionRegistry;
use crate::session::types::{LoginRequest, RegistryError, SessionIdRequest, StatusParams};

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn require_field(
    value: Option<String>,
    name: &'static str,
) -> Result<String, (StatusCode, Json<Value>)> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(error_response(RegistryError::MissingField(name))),
    }
}

pub async fn login(
    State(registry): State<Arc<SessionRegistry>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult {
    let email = require_field(payload.email, "email")?;
    let nickname = require_field(payload.nickname, "nickname")?;
    let mac_address = require_field(payload.mac_address, "macAddress")?;

    let record = registry
        .login(email, nickname, mac_address, Some(peer.ip()))
        .await
        .map_err(error_response)?;

    let tz = registry.config().display_timezone;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "sessionId": record.session_id,
            "sessionData": record.to_view(tz, None),
        })),
    ))
}

pub async fn logout(
    State(registry): State<Arc<SessionRegistry>>,
    Json(payload): Json<SessionIdRequest>,
) -> ApiResult {
    // An absent id is indistinguishable from an unknown one here
    let session_id = payload
        .session_id
        .ok_or_else(|| error_response(RegistryError::NotFound))?;

    registry.logout(&session_id).await.map_err(error_response)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Logout successful" })),
    ))
}

pub async fn update(
    State(registry): State<Arc<SessionRegistry>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(payload): Json<SessionIdRequest>,
) -> ApiResult {
    let session_id = payload
        .session_id
        .ok_or_else(|| error_response(RegistryError::NotFound))?;

    let record = registry
        .refresh(&session_id, Some(peer.ip()))
        .await
        .map_err(error_response)?;

    let tz = registry.config().display_timezone;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Session updated",
            "session": record.to_view(tz, None),
        })),
    ))
}

pub async fn status(
    State(registry): State<Arc<SessionRegistry>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<StatusParams>,
) -> ApiResult {
    let session_id = params
        .session_id
        .ok_or_else(|| error_response(RegistryError::MissingField("sessionId")))?;

    let (record, inactivity) = registry
        .status(&session_id, Some(peer.ip()))
        .await
        .map_err(error_response)?;

    let tz = registry.config().display_timezone;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Active session",
            "session": record.to_view(tz, Some(inactivity)),
        })),
    ))
}

pub async fn list_current_sessions(State(registry): State<Arc<SessionRegistry>>) -> ApiResult {
    let live = registry.list().await.map_err(error_response)?;
    let tz = registry.config().display_timezone;

    let message = if live.is_empty() {
        "No active sessions"
    } else {
        "Active sessions found"
    };

    let sessions: Vec<Value> = live
        .into_iter()
        .map(|(record, inactivity)| json!(record.to_view(tz, Some(inactivity))))
        .collect();

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": message,
            "count": sessions.len(),
            "sessions": sessions,
        })),
    ))
}
