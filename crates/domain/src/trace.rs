use serde::Serialize;

/// Structured trace events emitted across all Someleon crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        session_id: String,
        turns: usize,
    },
    TurnAppended {
        session_id: String,
        speaker: String,
        chars: usize,
    },
    ObjectiveChanged {
        session_id: String,
    },
    ResultRecorded {
        session_id: String,
        memory_chars: usize,
    },
    RunStarted {
        session_id: String,
        model: String,
        crawl: bool,
        turns: usize,
    },
    RepairAttempted {
        session_id: String,
        raw_chars: usize,
    },
    RunFinished {
        session_id: String,
        outcome: RunOutcome,
        text_chars: usize,
        units: usize,
        duration_ms: u64,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Resolved,
    Repaired,
    Unresolved,
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sl_event");
    }
}
