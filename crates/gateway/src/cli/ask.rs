//! `someleon ask`: one-shot analysis against a running server.
//!
//! Creates a session from a transcript file, runs it, streams progress to
//! stderr and prints the result to stdout.

use std::io::Write;

use anyhow::Context;
use sl_client::render::{options_text, profile_text, strategy_text};
use sl_client::{ApiClient, Indicator, RunView};
use sl_domain::RunFrame;

pub struct AskArgs {
    pub server: String,
    pub transcript: String,
    pub objective: Option<String>,
    pub crawl: bool,
    pub json: bool,
}

/// Run one analysis. Returns `false` when the run produced no result.
pub async fn ask(args: AskArgs) -> anyhow::Result<bool> {
    let thread = std::fs::read_to_string(&args.transcript)
        .with_context(|| format!("reading {}", args.transcript))?;

    let client = ApiClient::new(&args.server).context("building HTTP client")?;
    client
        .health()
        .await
        .with_context(|| format!("server at {} is not reachable", args.server))?;

    let session = client
        .new_session(args.objective.as_deref(), &thread)
        .await
        .context("creating session")?;
    tracing::debug!(session_id = %session.id, "session created");

    let view = client
        .run_to_view(&session.id, args.crawl, progress)
        .await
        .context("starting run")?;
    eprintln!();

    if args.json {
        print_json(&view)?;
    } else {
        print_view(&view);
    }
    Ok(view.indicator == Indicator::Success)
}

/// Dim one-line progress on stderr so stdout stays clean for piping.
fn progress(frame: &RunFrame) {
    match frame {
        RunFrame::Status(phase) => eprint!("\x1b[2m[{phase}]\x1b[0m "),
        RunFrame::Event(unit) if !unit.text_content().is_empty() => eprint!("\x1b[2m.\x1b[0m"),
        _ => {}
    }
    std::io::stderr().flush().ok();
}

fn print_json(view: &RunView) -> anyhow::Result<()> {
    let out = match (&view.result, &view.final_error, &view.error) {
        (Some(result), _, _) => result.clone().into_value(),
        (None, Some((message, raw)), _) => serde_json::json!({ "message": message, "raw": raw }),
        (None, None, Some(message)) => serde_json::json!({ "error": message }),
        (None, None, None) => serde_json::json!({ "error": "run ended without a result" }),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_view(view: &RunView) {
    if let Some(result) = &view.result {
        println!("== Counterpart profile ==\n{}\n", profile_text(result));
        println!("== Strategy ==\n{}\n", strategy_text(result));
        println!("== Options ==\n{}", options_text(result));
        return;
    }
    if let Some((message, raw)) = &view.final_error {
        eprintln!("warning: {message}");
        println!("{raw}");
        return;
    }
    eprintln!(
        "error: {}",
        view.error.as_deref().unwrap_or("run ended without a result")
    );
}
