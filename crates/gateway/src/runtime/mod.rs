//! The run relay: drives one analysis of a session and turns it into an
//! ordered sequence of [`RunFrame`]s.
//!
//! Frames always arrive in this order:
//!
//! ```text
//! meta → status(building_agent) → status(running_task) → event*
//!      → status(parsing_final) → [status(repairing_json)]
//!      → final | final_error → status(done)
//! ```
//!
//! A failure anywhere after `meta` ends the run with a single `error`
//! frame instead.

pub mod prompt;
pub mod resolve;
pub mod session_lock;

use std::future::Future;
use std::time::Instant;

use futures_util::StreamExt;
use sl_domain::error::Error;
use sl_domain::trace::{RunOutcome, TraceEvent};
use sl_domain::{Phase, RunFrame, StructuredResult};
use tokio::sync::mpsc;
use tokio::sync::OwnedSemaphorePermit;
use tracing::Instrument;

use crate::state::AppState;

use self::prompt::{build_task_prompt, TaskInput};
use self::resolve::{parse_final, repair, truncate_chars};

/// Message carried by `final_error` frames.
pub const UNRESOLVED_MESSAGE: &str = "Could not parse final JSON";

#[derive(Debug, thiserror::Error)]
enum RelayError {
    /// Nobody is listening any more.
    #[error("consumer disconnected")]
    Disconnected,
    #[error(transparent)]
    Failed(#[from] Error),
}

/// Start a run for `session_id` and return the receiving end of its frames.
///
/// The caller must already hold the session's lock; the permit moves into
/// the run task and is released when the run ends, including when the
/// receiver is dropped early.
pub fn start_run(
    state: AppState,
    session_id: String,
    crawl: bool,
    permit: OwnedSemaphorePermit,
) -> mpsc::Receiver<RunFrame> {
    let (tx, rx) = mpsc::channel(state.config.run.channel_capacity.max(1));
    let span = tracing::info_span!("run", session_id = %session_id, crawl);

    tokio::spawn(
        async move {
            let _permit = permit;
            let relay = Relay {
                state,
                session_id,
                crawl,
                tx,
                started: Instant::now(),
            };

            match relay.drive().await {
                Ok(outcome) => tracing::debug!(?outcome, "run complete"),
                Err(RelayError::Disconnected) => {
                    tracing::info!("consumer disconnected, run abandoned")
                }
                Err(RelayError::Failed(e)) => {
                    tracing::warn!(error = %e, "run failed");
                    let _ = relay
                        .tx
                        .send(RunFrame::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        }
        .instrument(span),
    );

    rx
}

struct Relay {
    state: AppState,
    session_id: String,
    crawl: bool,
    tx: mpsc::Sender<RunFrame>,
    started: Instant,
}

impl Relay {
    async fn send(&self, frame: RunFrame) -> Result<(), RelayError> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| RelayError::Disconnected)
    }

    /// Run `fut` unless the consumer goes away first.
    async fn unless_closed<T>(&self, fut: impl Future<Output = T>) -> Result<T, RelayError> {
        tokio::select! {
            out = fut => Ok(out),
            _ = self.tx.closed() => Err(RelayError::Disconnected),
        }
    }

    async fn drive(&self) -> Result<RunOutcome, RelayError> {
        let model = self.state.config.llm.model.clone();

        self.send(RunFrame::Meta {
            session_id: self.session_id.clone(),
            model: model.clone(),
            crawl: self.crawl,
        })
        .await?;
        self.send(RunFrame::Status(Phase::BuildingAgent)).await?;

        let runner = self.unless_closed(self.state.runners.acquire()).await??;

        self.send(RunFrame::Status(Phase::RunningTask)).await?;

        let session = self.state.sessions.get(&self.session_id)?;
        let transcript = session.transcript();
        let prompt = build_task_prompt(TaskInput {
            objective: &session.objective,
            transcript: &transcript,
            crawl: self.crawl,
            memory: &session.memory,
        });

        TraceEvent::RunStarted {
            session_id: self.session_id.clone(),
            model: model.clone(),
            crawl: self.crawl,
            turns: session.turns.len(),
        }
        .emit();

        let mut stream = self
            .unless_closed(runner.run_task(&prompt, &model))
            .await??;
        let mut text = String::new();
        let mut units = 0usize;

        while let Some(unit) = self.unless_closed(stream.next()).await? {
            let unit = unit?;
            text.push_str(unit.text_content());
            units += 1;
            self.send(RunFrame::Event(unit)).await?;
        }
        drop(stream);

        self.send(RunFrame::Status(Phase::ParsingFinal)).await?;

        let (result, outcome) = match parse_final(&text) {
            Some(result) => (Some(result), RunOutcome::Resolved),
            None => {
                self.send(RunFrame::Status(Phase::RepairingJson)).await?;
                TraceEvent::RepairAttempted {
                    session_id: self.session_id.clone(),
                    raw_chars: text.chars().count(),
                }
                .emit();

                let repaired = self
                    .unless_closed(repair(self.state.runners.as_ref(), &model, &text))
                    .await??;
                match repaired {
                    Some(result) => (Some(result), RunOutcome::Repaired),
                    None => (None, RunOutcome::Unresolved),
                }
            }
        };

        self.finish(result, &text).await?;

        TraceEvent::RunFinished {
            session_id: self.session_id.clone(),
            outcome,
            text_chars: text.chars().count(),
            units,
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(outcome)
    }

    async fn finish(&self, result: Option<StructuredResult>, text: &str) -> Result<(), RelayError> {
        match result {
            Some(result) => {
                self.state.sessions.record_result(&self.session_id, &result)?;
                self.send(RunFrame::Final(result)).await?;
            }
            None => {
                self.send(RunFrame::FinalError {
                    message: UNRESOLVED_MESSAGE.into(),
                    raw: truncate_chars(text, self.state.config.run.raw_snippet_chars),
                })
                .await?;
            }
        }
        self.send(RunFrame::Status(Phase::Done)).await
    }
}
