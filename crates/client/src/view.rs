//! Folding run frames into UI state.

use sl_domain::frame::{Phase, RunFrame};
use sl_domain::result::StructuredResult;
use sl_domain::stream::AgentUnit;

/// How much of a streamed text unit a timeline entry shows.
const STREAM_PREVIEW_CHARS: usize = 180;

/// The run status light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    Working,
    /// The first answer was not JSON and a repair is in flight.
    Repairing,
    /// A result was rendered.
    Success,
    /// The run completed but no result could be resolved.
    Warning,
    /// The run failed.
    Fatal,
}

impl Indicator {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Indicator::Success | Indicator::Warning | Indicator::Fatal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Info,
    Good,
    Warn,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub kind: EntryKind,
    pub title: String,
    pub body: String,
}

/// Everything a client knows about one run.
#[derive(Debug, Clone)]
pub struct RunView {
    pub indicator: Indicator,
    pub session_id: Option<String>,
    pub model: Option<String>,
    pub phase: Option<Phase>,
    pub streamed_text: String,
    pub result: Option<StructuredResult>,
    /// `(message, raw)` from a `final_error` frame.
    pub final_error: Option<(String, String)>,
    pub error: Option<String>,
    pub timeline: Vec<TimelineEntry>,
}

impl Default for RunView {
    fn default() -> Self {
        Self::new()
    }
}

impl RunView {
    pub fn new() -> Self {
        Self {
            indicator: Indicator::Idle,
            session_id: None,
            model: None,
            phase: None,
            streamed_text: String::new(),
            result: None,
            final_error: None,
            error: None,
            timeline: Vec::new(),
        }
    }

    fn note(&mut self, kind: EntryKind, title: &str, body: impl Into<String>) {
        self.timeline.push(TimelineEntry {
            kind,
            title: title.to_owned(),
            body: body.into(),
        });
    }

    /// Apply one frame.
    ///
    /// Once the run has failed, later frames are recorded in the timeline but
    /// no longer move the indicator.
    pub fn apply(&mut self, frame: &RunFrame) {
        let failed = self.indicator == Indicator::Fatal;
        match frame {
            RunFrame::Meta {
                session_id,
                model,
                crawl,
            } => {
                self.session_id = Some(session_id.clone());
                self.model = Some(model.clone());
                if !failed {
                    self.indicator = Indicator::Working;
                }
                self.note(
                    EntryKind::Info,
                    "Run",
                    format!("sessionId={session_id} model={model} crawl={crawl}"),
                );
            }
            RunFrame::Status(phase) => {
                self.phase = Some(*phase);
                if !failed && !self.indicator.is_terminal() {
                    self.indicator = match phase {
                        Phase::RepairingJson => Indicator::Repairing,
                        Phase::Done => self.indicator,
                        _ => Indicator::Working,
                    };
                }
                let kind = match phase {
                    Phase::ParsingFinal | Phase::RepairingJson => EntryKind::Warn,
                    _ => EntryKind::Info,
                };
                self.note(kind, "Status", phase.as_str());
            }
            RunFrame::Event(unit) => {
                let text = unit.text_content();
                if !text.is_empty() {
                    self.streamed_text.push_str(text);
                    let preview: String = text.chars().take(STREAM_PREVIEW_CHARS).collect();
                    self.note(EntryKind::Info, "Streaming", preview);
                } else if let AgentUnit::ToolCall { name, .. } = unit {
                    self.note(EntryKind::Info, "Tool", name.clone());
                }
            }
            RunFrame::Final(result) => {
                self.result = Some(result.clone());
                if !failed {
                    self.indicator = Indicator::Success;
                }
                self.note(EntryKind::Good, "Final", "Rendered profile/strategy/options.");
                if let Some(label) = result.recommended_option_label() {
                    self.note(EntryKind::Good, "Recommended", label);
                }
            }
            RunFrame::FinalError { message, raw } => {
                self.final_error = Some((message.clone(), raw.clone()));
                if !failed {
                    self.indicator = Indicator::Warning;
                }
                self.note(EntryKind::Bad, "Final JSON failed", message.clone());
            }
            RunFrame::Error { message } => {
                self.error = Some(message.clone());
                self.indicator = Indicator::Fatal;
                self.note(EntryKind::Bad, "Server error", message.clone());
            }
        }
    }

    /// The stream closed. A run that never reached a terminal frame failed.
    pub fn finish(&mut self) {
        if !self.indicator.is_terminal() {
            self.indicator = Indicator::Fatal;
            let message = "stream ended before the run finished".to_string();
            self.note(EntryKind::Bad, "Stream closed", message.clone());
            self.error = Some(message);
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta() -> RunFrame {
        RunFrame::Meta {
            session_id: "s1".into(),
            model: "m".into(),
            crawl: false,
        }
    }

    fn run(frames: &[RunFrame]) -> RunView {
        let mut view = RunView::new();
        for f in frames {
            view.apply(f);
        }
        view.finish();
        view
    }

    #[test]
    fn successful_run_ends_green() {
        let result = StructuredResult::from_value(json!({
            "context_summary": "x",
            "recommended_option_label": "Option B"
        }))
        .unwrap();
        let view = run(&[
            meta(),
            RunFrame::Status(Phase::BuildingAgent),
            RunFrame::Status(Phase::RunningTask),
            RunFrame::Event(AgentUnit::text("{\"context_summary\":")),
            RunFrame::Event(AgentUnit::text("\"x\"}")),
            RunFrame::Status(Phase::ParsingFinal),
            RunFrame::Final(result.clone()),
            RunFrame::Status(Phase::Done),
        ]);
        assert_eq!(view.indicator, Indicator::Success);
        assert_eq!(view.phase, Some(Phase::Done));
        assert_eq!(view.streamed_text, "{\"context_summary\":\"x\"}");
        assert_eq!(view.result, Some(result));
        assert!(view
            .timeline
            .iter()
            .any(|e| e.title == "Recommended" && e.body == "Option B"));
    }

    #[test]
    fn repair_then_final_error_is_amber() {
        let mut view = RunView::new();
        view.apply(&meta());
        view.apply(&RunFrame::Status(Phase::RepairingJson));
        assert_eq!(view.indicator, Indicator::Repairing);
        view.apply(&RunFrame::FinalError {
            message: "Could not parse final JSON".into(),
            raw: "not json".into(),
        });
        view.apply(&RunFrame::Status(Phase::Done));
        view.finish();
        assert_eq!(view.indicator, Indicator::Warning);
        assert_eq!(view.final_error.unwrap().1, "not json");
    }

    #[test]
    fn error_frame_is_fatal_and_sticks() {
        let view = run(&[
            meta(),
            RunFrame::Status(Phase::BuildingAgent),
            RunFrame::Error {
                message: "no key".into(),
            },
            RunFrame::Status(Phase::Done),
        ]);
        assert_eq!(view.indicator, Indicator::Fatal);
        assert_eq!(view.error.as_deref(), Some("no key"));
    }

    #[test]
    fn stream_closing_early_is_fatal() {
        let view = run(&[meta(), RunFrame::Status(Phase::RunningTask)]);
        assert_eq!(view.indicator, Indicator::Fatal);
    }

    #[test]
    fn long_text_preview_is_cut() {
        let long = "a".repeat(500);
        let mut view = RunView::new();
        view.apply(&RunFrame::Event(AgentUnit::text(long.clone())));
        assert_eq!(view.streamed_text.len(), 500);
        assert_eq!(view.timeline[0].body.len(), STREAM_PREVIEW_CHARS);
    }
}
