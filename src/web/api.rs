// src/web/api.rs
// REST and SSE handlers for the session lifecycle

use std::{convert::Infallible, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{
        Json,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::models::ModelListing;
use crate::session::{MoveOutcome, SessionId, SessionInfo};

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(alias = "game_id")]
    pub session_id: String,
    pub index: i32,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(alias = "game_id")]
    pub session_id: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct TerminateResponse {
    pub session_id: SessionId,
    pub closed: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.arena.registry().len().await,
    }))
}

/// Start a session. The body is optional; `{ "model": ... }` picks a model.
pub async fn start(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<SessionResponse>> {
    let req: StartRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };

    let session_id = state.arena.start_session(req.model.as_deref()).await?;
    Ok(Json(SessionResponse { session_id }))
}

pub async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<MoveOutcome>> {
    let outcome = state.arena.make_move(&req.session_id, req.index).await?;
    Ok(Json(outcome))
}

pub async fn reset(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session_id = state
        .arena
        .reset(&req.session_id, req.model.as_deref())
        .await?;
    Ok(Json(SessionResponse { session_id }))
}

pub async fn terminate(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> ApiResult<Json<TerminateResponse>> {
    let session_id = state.arena.terminate(&req.session_id).await?;
    Ok(Json(TerminateResponse {
        session_id,
        closed: true,
    }))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionInfo>> {
    Json(state.arena.list_sessions().await)
}

pub async fn list_models(State(state): State<AppState>) -> ApiResult<Json<ModelListing>> {
    Ok(Json(state.arena.list_models().await?))
}

pub async fn select_model(
    State(state): State<AppState>,
    Json(req): Json<SelectModelRequest>,
) -> ApiResult<Json<ModelListing>> {
    state.arena.select_model(&req.model).await?;
    Ok(Json(state.arena.list_models().await?))
}

/// SSE stream of one session's AI log lines
pub async fn session_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let (session_id, mut rx) = state.arena.subscribe(&id).await?;

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(json) = serde_json::to_string(&event) {
                        yield Ok(Event::default().event("bot_log").data(json));
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    // Missed some lines, continue
                    debug!(session_id = %session_id, skipped = n, "Log stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    ))
}
