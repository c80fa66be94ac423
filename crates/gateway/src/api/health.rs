use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "time": chrono::Utc::now().timestamp_millis(),
        "sessionCount": state.sessions.len(),
    }))
}
