use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::pin::Pin;

/// A boxed async stream, used for agent runtime output.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// One unit of output produced by the agent runtime while a task runs.
///
/// The set of shapes is closed: anything the runtime emits that is not
/// recognised lands in [`AgentUnit::Unknown`], is forwarded verbatim, and
/// contributes no text to the accumulated answer.
///
/// Wire shapes (the `type` tag is always present except for `Unknown`):
///
/// ```json
/// {"type":"text","content":"..."}
/// {"type":"tool_use","id":"...","name":"...","input":{}}
/// {"type":"tool_result","tool_use_id":"...","content":...,"is_error":false}
/// {"type":"status","state":"...","detail":"..."}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AgentUnit {
    /// A chunk of model text.
    Text { content: String },

    /// The model invoked a tool.
    ToolCall {
        id: String,
        name: String,
        input: Value,
    },

    /// A tool produced output.
    ToolResult {
        tool_use_id: String,
        content: Value,
        is_error: bool,
    },

    /// Runtime bookkeeping (message start, stop reason, ...).
    Status {
        state: String,
        detail: Option<String>,
    },

    /// Any other shape, kept as-is.
    Unknown(Value),
}

impl AgentUnit {
    pub fn text(content: impl Into<String>) -> Self {
        AgentUnit::Text {
            content: content.into(),
        }
    }

    pub fn status(state: impl Into<String>, detail: Option<String>) -> Self {
        AgentUnit::Status {
            state: state.into(),
            detail,
        }
    }

    /// Text this unit contributes to the accumulated answer.
    pub fn text_content(&self) -> &str {
        match self {
            AgentUnit::Text { content } => content,
            _ => "",
        }
    }

    /// Classify a raw JSON unit.
    ///
    /// The `type` tag wins when present. Untagged objects fall back to a
    /// string `text` field, then a string `content` field.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(obj) = &value else {
            return AgentUnit::Unknown(value);
        };

        match obj.get("type").and_then(Value::as_str) {
            Some("text") => match str_field(obj, "content").or_else(|| str_field(obj, "text")) {
                Some(content) => AgentUnit::Text { content },
                None => AgentUnit::Unknown(value),
            },
            Some("tool_use") | Some("tool_call") => AgentUnit::ToolCall {
                id: str_field(obj, "id").unwrap_or_default(),
                name: str_field(obj, "name").unwrap_or_default(),
                input: obj.get("input").cloned().unwrap_or(Value::Null),
            },
            Some("tool_result") => AgentUnit::ToolResult {
                tool_use_id: str_field(obj, "tool_use_id").unwrap_or_default(),
                content: obj.get("content").cloned().unwrap_or(Value::Null),
                is_error: obj.get("is_error").and_then(Value::as_bool).unwrap_or(false),
            },
            Some("status") => AgentUnit::Status {
                state: str_field(obj, "state").unwrap_or_default(),
                detail: str_field(obj, "detail"),
            },
            Some(_) => AgentUnit::Unknown(value),
            None => match str_field(obj, "text").or_else(|| str_field(obj, "content")) {
                Some(content) => AgentUnit::Text { content },
                None => AgentUnit::Unknown(value),
            },
        }
    }

    /// The JSON shape forwarded to clients.
    pub fn to_value(&self) -> Value {
        match self {
            AgentUnit::Text { content } => json!({ "type": "text", "content": content }),
            AgentUnit::ToolCall { id, name, input } => json!({
                "type": "tool_use",
                "id": id,
                "name": name,
                "input": input,
            }),
            AgentUnit::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => json!({
                "type": "tool_result",
                "tool_use_id": tool_use_id,
                "content": content,
                "is_error": is_error,
            }),
            AgentUnit::Status { state, detail } => {
                let mut v = json!({ "type": "status", "state": state });
                if let Some(detail) = detail {
                    v["detail"] = Value::String(detail.clone());
                }
                v
            }
            AgentUnit::Unknown(raw) => raw.clone(),
        }
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

impl Serialize for AgentUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AgentUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(AgentUnit::from_value)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_text_yields_content() {
        let unit = AgentUnit::from_value(json!({"type": "text", "content": "hello"}));
        assert_eq!(unit.text_content(), "hello");
    }

    #[test]
    fn untagged_text_field_is_text() {
        let unit = AgentUnit::from_value(json!({"text": "a"}));
        assert_eq!(unit, AgentUnit::text("a"));
    }

    #[test]
    fn untagged_content_field_is_text() {
        let unit = AgentUnit::from_value(json!({"content": "b"}));
        assert_eq!(unit.text_content(), "b");
    }

    #[test]
    fn tool_result_contributes_no_text() {
        let unit = AgentUnit::from_value(json!({
            "type": "tool_result",
            "tool_use_id": "t1",
            "content": "scraped page body"
        }));
        assert!(matches!(unit, AgentUnit::ToolResult { .. }));
        assert_eq!(unit.text_content(), "");
    }

    #[test]
    fn unknown_shapes_round_trip_verbatim() {
        let raw = json!({"type": "usage", "tokens": 12});
        let unit = AgentUnit::from_value(raw.clone());
        assert_eq!(unit.text_content(), "");
        assert_eq!(serde_json::to_value(&unit).unwrap(), raw);

        let scalar = AgentUnit::from_value(json!(42));
        assert_eq!(scalar, AgentUnit::Unknown(json!(42)));
    }

    #[test]
    fn status_serializes_detail_only_when_present() {
        let bare = AgentUnit::status("message_start", None).to_value();
        assert!(bare.get("detail").is_none());

        let with = AgentUnit::status("stop", Some("end_turn".into())).to_value();
        assert_eq!(with["detail"], "end_turn");
    }
}
