//! `POST /api/session/run`: analyse a session and stream the run as SSE.
//!
//! Every frame goes out as `event: <kind>` + `data: <json>`. The response
//! owns the frame receiver; if the client goes away the receiver drops and
//! the run stops at its next send.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::Stream;
use sl_domain::error::Error;
use sl_domain::RunFrame;
use tokio::sync::mpsc;

use super::body::LenientBody;
use super::error::ApiError;
use crate::runtime::start_run;
use crate::state::AppState;

pub async fn run_session(
    State(state): State<AppState>,
    body: LenientBody,
) -> Result<Response, ApiError> {
    let id = body
        .text("id")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::missing("id"))?;
    let crawl = body.flag("crawl");

    let session = state.sessions.get(&id)?;
    let permit = state.session_locks.try_acquire(&id)?;

    tracing::info!(session_id = %id, turns = session.turns.len(), crawl, "run requested");

    let rx = start_run(state.clone(), id, crawl, permit);
    Ok(Sse::new(frame_stream(rx))
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// Convert the relay's frames into SSE events.
fn frame_stream(
    mut rx: mpsc::Receiver<RunFrame>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(frame) = rx.recv().await {
            yield Ok(to_event(&frame));
        }
    }
}

pub fn to_event(frame: &RunFrame) -> Event {
    Event::default()
        .event(frame.kind())
        .data(frame.payload().to_string())
}
