pub mod body;
pub mod error;
pub mod health;
pub mod run;
pub mod sample;
pub mod sessions;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the JSON + SSE API router.
///
/// Static files are layered on top of this by [`crate::bootstrap::build_app`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/sample", get(sample::sample))
        // Sessions
        .route("/api/session/new", post(sessions::new_session))
        .route("/api/session/get", get(sessions::get_session))
        .route("/api/session/objective", post(sessions::set_objective))
        .route("/api/session/append", post(sessions::append))
        // Runs (SSE)
        .route("/api/session/run", post(run::run_session))
}
