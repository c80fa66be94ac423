//! AppState construction and router assembly shared by `main.rs` and the
//! integration tests.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use sl_domain::config::{Config, ConfigSeverity, CorsConfig};
use sl_providers::{AnthropicSource, RunnerSource};
use sl_sessions::SessionStore;

use crate::api;
use crate::runtime::session_lock::SessionLockMap;
use crate::state::AppState;

/// Validate config and return a fully-wired [`AppState`] backed by the
/// Anthropic runtime.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Agent runtime (built lazily on first run) ────────────────────
    let runners: Arc<dyn RunnerSource> = Arc::new(AnthropicSource::new(config.llm.clone()));
    tracing::info!(model = %config.llm.model, base_url = %config.llm.base_url, "agent runtime configured");

    Ok(app_state(config, runners))
}

/// Assemble state around an arbitrary runner source.
pub fn app_state(config: Arc<Config>, runners: Arc<dyn RunnerSource>) -> AppState {
    let sessions = Arc::new(SessionStore::new(
        config.sessions.default_objective.clone(),
    ));
    AppState {
        config,
        sessions,
        session_locks: Arc::new(SessionLockMap::new()),
        runners,
    }
}

/// API routes plus the static browser client, with request tracing.
pub fn build_router(state: AppState) -> Router {
    let public = &state.config.server.public_dir;
    let index = ServeFile::new(public.join("index.html"));
    let assets = ServeDir::new(public.join("assets"));

    api::router()
        .route_service("/", index)
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build a [`CorsLayer`] from the configured allowed origins.
///
/// Origins may end in `:*` to match any port on that host (e.g.
/// `http://localhost:*`). A lone `"*"` allows every origin.
pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    use axum::http::header;

    if cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard \"*\", all origins allowed");
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
    }

    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut wildcard_prefixes: Vec<String> = Vec::new();

    for origin in &cors.allowed_origins {
        if origin.ends_with(":*") {
            wildcard_prefixes.push(origin.trim_end_matches('*').to_owned());
        } else if let Ok(hv) = origin.parse::<HeaderValue>() {
            exact.push(hv);
        } else {
            tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
        }
    }

    let allow_origin = if wildcard_prefixes.is_empty() {
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin, _| {
            if exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
                return true;
            }
            let origin_str = origin.to_str().unwrap_or("");
            wildcard_prefixes.iter().any(|prefix| {
                origin_str
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
            })
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn allowed_origin(origins: &[&str], origin: &str) -> Option<String> {
        let cors = CorsConfig {
            allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
        };
        let app = Router::new()
            .route("/", axum::routing::get(|| async { "ok" }))
            .layer(build_cors_layer(&cors));
        let resp = app
            .oneshot(
                Request::get("/")
                    .header("origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_owned())
    }

    #[tokio::test]
    async fn wildcard_port_matches_any_numeric_port() {
        let origins = ["http://localhost:*"];
        assert_eq!(
            allowed_origin(&origins, "http://localhost:5173").await.as_deref(),
            Some("http://localhost:5173")
        );
        assert!(allowed_origin(&origins, "http://localhost:").await.is_none());
        assert!(allowed_origin(&origins, "http://localhost:80x").await.is_none());
        assert!(allowed_origin(&origins, "http://evil.example").await.is_none());
    }

    #[tokio::test]
    async fn exact_origins_are_listed() {
        let origins = ["https://someleon.example"];
        assert!(allowed_origin(&origins, "https://someleon.example").await.is_some());
        assert!(allowed_origin(&origins, "https://other.example").await.is_none());
    }

    #[tokio::test]
    async fn lone_star_allows_everything() {
        assert_eq!(
            allowed_origin(&["*"], "https://anywhere.example").await.as_deref(),
            Some("*")
        );
    }
}
