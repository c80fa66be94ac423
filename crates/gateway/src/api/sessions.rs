//! Session endpoints.
//!
//! - `POST /api/session/new`: create from an optional objective + thread
//! - `GET  /api/session/get`: full session state
//! - `POST /api/session/objective`: replace the objective
//! - `POST /api/session/append`: add one turn

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::Json;
use serde_json::{json, Value};
use sl_domain::error::Error;
use sl_sessions::Speaker;

use super::body::LenientBody;
use super::error::ApiError;
use crate::state::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Create / read
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn new_session(State(state): State<AppState>, body: LenientBody) -> Json<Value> {
    let objective = body.text("objective");
    let thread = body.text("thread").unwrap_or_default();

    let session = state.sessions.create(objective.as_deref(), &thread);

    Json(json!({
        "id": session.id,
        "objective": session.objective,
        "transcript": session.transcript(),
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let id = params
        .get("id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::missing("id"))?;

    let session = state.sessions.get(id)?;
    Ok(Json(json!({
        "id": session.id,
        "objective": session.objective,
        "transcript": session.transcript(),
        "memory": session.memory,
        "lastResult": session.last_result,
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mutations (serialised with runs through the session lock)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn set_objective(State(state): State<AppState>, body: LenientBody) -> ApiResult {
    let id = body.text("id").filter(|s| !s.is_empty()).ok_or_else(|| Error::missing("id"))?;
    let objective = body
        .required("objective")
        .ok_or_else(|| Error::missing("objective"))?;

    state.sessions.get(&id)?;
    let _permit = state
        .session_locks
        .acquire_within(&id, lock_wait(&state))
        .await?;
    state.sessions.set_objective(&id, &objective)?;

    Ok(Json(json!({ "ok": true })))
}

pub async fn append(State(state): State<AppState>, body: LenientBody) -> ApiResult {
    let id = body.text("id").filter(|s| !s.is_empty()).ok_or_else(|| Error::missing("id"))?;
    let text = body.required("text").ok_or_else(|| Error::missing("text"))?;
    let speaker = body
        .text("speaker")
        .map(|label| Speaker::from_label(&label))
        .unwrap_or(Speaker::Them);

    state.sessions.get(&id)?;
    let _permit = state
        .session_locks
        .acquire_within(&id, lock_wait(&state))
        .await?;
    let session = state.sessions.append_turn(&id, speaker, &text)?;

    tracing::debug!(session_id = %id, %speaker, "turn appended");
    Ok(Json(json!({ "ok": true, "transcript": session.transcript() })))
}

fn lock_wait(state: &AppState) -> Duration {
    Duration::from_millis(state.config.sessions.lock_wait_ms)
}
