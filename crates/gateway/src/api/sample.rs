use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::Json;
use serde_json::{json, Value};
use sl_domain::error::Error;

use super::error::ApiError;
use crate::state::AppState;

/// File under `samples_dir` served for a sample id.
pub fn sample_file(id: &str) -> &'static str {
    match id {
        "couple" => "couple_chat.txt",
        _ => "business_chat.txt",
    }
}

/// `GET /api/sample?id=…`
pub async fn sample(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let id = params
        .get("id")
        .cloned()
        .unwrap_or_else(|| "business".into());
    let path = state.config.server.samples_dir.join(sample_file(&id));

    let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "sample transcript unreadable");
        Error::Io(e)
    })?;

    Ok(Json(json!({ "id": id, "text": text })))
}
