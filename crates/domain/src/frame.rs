//! Frames emitted over the run event stream.
//!
//! On the wire each frame is one server-sent event:
//! `event: <kind>\ndata: <json>\n\n`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::result::StructuredResult;
use crate::stream::AgentUnit;

/// Progress markers carried by `status` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    BuildingAgent,
    RunningTask,
    ParsingFinal,
    RepairingJson,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BuildingAgent => "building_agent",
            Phase::RunningTask => "running_task",
            Phase::ParsingFinal => "parsing_final",
            Phase::RepairingJson => "repairing_json",
            Phase::Done => "done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunFrame {
    /// Always first: which session, which model, crawl on or off.
    Meta {
        session_id: String,
        model: String,
        crawl: bool,
    },
    Status(Phase),
    /// A raw agent unit, forwarded unmodified.
    Event(AgentUnit),
    /// The resolved result.
    Final(StructuredResult),
    /// The run completed but no JSON could be resolved.
    FinalError { message: String, raw: String },
    /// The run failed.
    Error { message: String },
}

impl RunFrame {
    /// The SSE `event:` name.
    pub fn kind(&self) -> &'static str {
        match self {
            RunFrame::Meta { .. } => "meta",
            RunFrame::Status(_) => "status",
            RunFrame::Event(_) => "event",
            RunFrame::Final(_) => "final",
            RunFrame::FinalError { .. } => "final_error",
            RunFrame::Error { .. } => "error",
        }
    }

    /// The SSE `data:` payload.
    pub fn payload(&self) -> Value {
        match self {
            RunFrame::Meta {
                session_id,
                model,
                crawl,
            } => json!({ "sessionId": session_id, "model": model, "crawl": crawl }),
            RunFrame::Status(phase) => json!({ "phase": phase }),
            RunFrame::Event(unit) => unit.to_value(),
            RunFrame::Final(result) => result.clone().into_value(),
            RunFrame::FinalError { message, raw } => json!({ "message": message, "raw": raw }),
            RunFrame::Error { message } => json!({ "message": message }),
        }
    }

    /// Rebuild a frame from its event name and decoded payload.
    pub fn from_parts(kind: &str, payload: Value) -> Result<Self> {
        let frame = match kind {
            "meta" => RunFrame::Meta {
                session_id: str_of(&payload, "sessionId"),
                model: str_of(&payload, "model"),
                crawl: payload.get("crawl").and_then(Value::as_bool).unwrap_or(false),
            },
            "status" => {
                let phase = payload
                    .get("phase")
                    .cloned()
                    .ok_or_else(|| Error::Other("status frame without phase".into()))?;
                RunFrame::Status(serde_json::from_value(phase)?)
            }
            "event" => RunFrame::Event(AgentUnit::from_value(payload)),
            "final" => RunFrame::Final(
                StructuredResult::from_value(payload)
                    .ok_or_else(|| Error::Other("final frame is not an object".into()))?,
            ),
            "final_error" => RunFrame::FinalError {
                message: str_of(&payload, "message"),
                raw: str_of(&payload, "raw"),
            },
            "error" => RunFrame::Error {
                message: str_of(&payload, "message"),
            },
            other => return Err(Error::Other(format!("unknown frame kind: {other}"))),
        };
        Ok(frame)
    }

    /// `final`, `final_error` and `error` end the useful part of a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunFrame::Final(_) | RunFrame::FinalError { .. } | RunFrame::Error { .. }
        )
    }
}

fn str_of(v: &Value, key: &str) -> String {
    v.get(key).and_then(Value::as_str).unwrap_or_default().to_owned()
}
