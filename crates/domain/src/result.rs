//! The structured result document produced by a successful run.
//!
//! Model output is never validated against a schema: the resolver only
//! guarantees a JSON object. The object is kept whole (unknown fields
//! included) so the `final` frame carries exactly what the model returned,
//! and the accessors below give best-effort typed views of the known fields.
//! A field with the wrong shape reads as absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resolved model answer. Serializes as the bare JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredResult(Map<String, Value>);

impl StructuredResult {
    /// Accept a parsed JSON value. Only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The memory line to carry into the next run.
    ///
    /// Strings are used as-is; any other non-null value is stringified.
    pub fn memory_update(&self) -> Option<String> {
        match self.0.get("session_memory_update")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn context_summary(&self) -> Option<String> {
        self.typed("context_summary")
    }

    pub fn objective_understanding(&self) -> Vec<String> {
        self.typed("objective_understanding").unwrap_or_default()
    }

    pub fn counterpart_profile(&self) -> Option<CounterpartProfile> {
        self.typed("counterpart_profile")
    }

    pub fn north_star_strategy(&self) -> Option<NorthStarStrategy> {
        self.typed("north_star_strategy")
    }

    pub fn next_step_strategy(&self) -> Option<NextStepStrategy> {
        self.typed("next_step_strategy")
    }

    pub fn draft_messages(&self) -> Vec<DraftMessage> {
        self.typed("draft_messages").unwrap_or_default()
    }

    pub fn recommended_option_label(&self) -> Option<String> {
        self.typed("recommended_option_label")
    }

    pub fn do_not_say(&self) -> Vec<String> {
        self.typed("do_not_say").unwrap_or_default()
    }

    pub fn follow_up_questions(&self) -> Vec<String> {
        self.typed("follow_up_questions").unwrap_or_default()
    }

    pub fn agency_timeline(&self) -> Vec<TimelineStep> {
        self.typed("agency_timeline").unwrap_or_default()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Typed views
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterpartProfile {
    pub communication_habits: Vec<String>,
    pub likely_needs: Vec<String>,
    pub triggers_or_sensitive_points: Vec<SensitivePoint>,
    pub what_helps: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub confidence: Option<Confidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivePoint {
    pub trigger: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NorthStarStrategy {
    pub principles: Vec<String>,
    pub what_to_prioritize: Vec<String>,
    pub what_to_avoid: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextStepStrategy {
    pub goal_this_turn: Option<String>,
    pub moves: Vec<String>,
    pub watch_outs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftMessage {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineStep {
    pub phase: String,
    pub detail: String,
}

/// Read an optional value, treating a wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
