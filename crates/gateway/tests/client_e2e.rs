//! The client crate against a real listening server.

use std::sync::Arc;

use sl_client::{ApiClient, Indicator};
use sl_domain::config::Config;
use sl_domain::RunFrame;
use sl_gateway::bootstrap;
use sl_providers::{RunnerSource, Script, ScriptedRunner, StaticSource};

async fn serve(scripts: Vec<Script>) -> String {
    let runners: Arc<dyn RunnerSource> =
        Arc::new(StaticSource(Arc::new(ScriptedRunner::new(scripts))));
    let state = bootstrap::app_state(Arc::new(Config::default()), runners);
    let app = bootstrap::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn session_lifecycle_and_successful_run() {
    let base = serve(vec![Script::Units(vec![
        sl_domain::AgentUnit::text("```json\n{\"context_summary\":\"deadline talk\","),
        sl_domain::AgentUnit::text(
            "\"draft_messages\":[{\"label\":\"Option A (warm)\",\"text\":\"Sure!\"}],\
             \"recommended_option_label\":\"Option A (warm)\"}\n```",
        ),
    ])])
    .await;
    let client = ApiClient::new(&base).unwrap();

    let health = client.health().await.unwrap();
    assert!(health.ok);
    assert_eq!(health.session_count, 0);

    let info = client
        .new_session(Some("Keep the client happy"), "Them: Can we move the deadline?")
        .await
        .unwrap();
    assert_eq!(info.transcript, "Them: Can we move the deadline?");

    let transcript = client.append(&info.id, "You", "Let me check.").await.unwrap();
    assert_eq!(transcript, "Them: Can we move the deadline?\nYou: Let me check.");

    let mut seen = Vec::new();
    let view = client
        .run_to_view(&info.id, false, |f| seen.push(f.kind()))
        .await
        .unwrap();

    assert_eq!(view.indicator, Indicator::Success);
    assert_eq!(seen.first(), Some(&"meta"));
    assert_eq!(seen.last(), Some(&"status"));
    let result = view.result.unwrap();
    assert_eq!(result.context_summary().as_deref(), Some("deadline talk"));
    assert_eq!(result.recommended_option_label().as_deref(), Some("Option A (warm)"));

    let detail = client.get_session(&info.id).await.unwrap();
    assert!(detail.last_result.is_some());
}

#[tokio::test]
async fn unresolved_run_is_a_warning() {
    let base = serve(vec![Script::text("not json at all"), Script::text("still not")]).await;
    let client = ApiClient::new(&base).unwrap();
    let info = client.new_session(None, "").await.unwrap();

    let mut frames: Vec<RunFrame> = Vec::new();
    let view = client
        .run_to_view(&info.id, true, |f| frames.push(f.clone()))
        .await
        .unwrap();

    assert_eq!(view.indicator, Indicator::Warning);
    let (message, raw) = view.final_error.unwrap();
    assert_eq!(message, "Could not parse final JSON");
    assert_eq!(raw, "not json at all");
    assert!(matches!(frames.last(), Some(RunFrame::Status(_))));
}

#[tokio::test]
async fn client_surfaces_http_errors() {
    let base = serve(vec![]).await;
    let client = ApiClient::new(&base).unwrap();

    let err = client.get_session("missing").await.unwrap_err();
    assert!(err.to_string().contains("Unknown sessionId: missing"), "{err}");

    let err = client.set_objective("missing", "x").await.unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}
