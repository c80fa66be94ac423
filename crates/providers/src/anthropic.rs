//! Anthropic Messages API runner.
//!
//! Each task is one streamed `POST /v1/messages` carrying the prompt as a
//! single user message. Stream payloads are mapped onto agent units as they
//! arrive.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Value};
use sl_domain::config::LlmConfig;
use sl_domain::error::{Error, Result};
use sl_domain::stream::AgentUnit;

use crate::traits::{TaskRunner, UnitStream};
use crate::util::{from_reqwest, resolve_api_key};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const RUNNER_ID: &str = "anthropic";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Runner
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct AnthropicRunner {
    base_url: String,
    api_key: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicRunner {
    /// Build a runner. Fails when no API key can be resolved.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.auth)?;

        // Connect only: a streamed generation may legitimately run for minutes.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_tokens: cfg.max_tokens,
            client,
        })
    }

    fn request_body(&self, prompt: &str, model: &str) -> Value {
        json!({
            "model": model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "messages": [{ "role": "user", "content": prompt }],
        })
    }
}

#[async_trait::async_trait]
impl TaskRunner for AnthropicRunner {
    async fn run_task(&self, prompt: &str, model: &str) -> Result<UnitStream> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(url = %url, model = %model, prompt_chars = prompt.len(), "anthropic task request");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt, model))
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let err_text = resp.text().await.map_err(from_reqwest)?;
            return Err(Error::Provider {
                provider: RUNNER_ID.into(),
                message: format!("HTTP {} - {}", status.as_u16(), err_text),
            });
        }

        let mut state = StreamState::default();
        Ok(crate::sse::sse_response_stream(resp, move |data| {
            parse_anthropic_sse(data, &mut state)
        }))
    }

    fn runner_id(&self) -> &str {
        RUNNER_ID
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stream parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tool-use blocks being assembled, by content block index.
#[derive(Default)]
struct StreamState {
    tool_uses: HashMap<u64, PendingToolUse>,
}

struct PendingToolUse {
    id: String,
    name: String,
    input_json: String,
}

fn str_at<'a>(v: &'a Value, key: &str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Parse one Anthropic SSE payload into zero or more agent units.
fn parse_anthropic_sse(data: &str, state: &mut StreamState) -> Vec<Result<AgentUnit>> {
    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Json(e))],
    };
    let index = v.get("index").and_then(Value::as_u64).unwrap_or(0);

    match str_at(&v, "type") {
        "message_start" => {
            let model = v
                .get("message")
                .map(|m| str_at(m, "model"))
                .filter(|m| !m.is_empty())
                .map(str::to_owned);
            vec![Ok(AgentUnit::status("message_start", model))]
        }

        "content_block_start" => {
            if let Some(block) = v.get("content_block") {
                if str_at(block, "type") == "tool_use" {
                    state.tool_uses.insert(
                        index,
                        PendingToolUse {
                            id: str_at(block, "id").to_owned(),
                            name: str_at(block, "name").to_owned(),
                            input_json: String::new(),
                        },
                    );
                }
            }
            Vec::new()
        }

        "content_block_delta" => {
            let Some(delta) = v.get("delta") else {
                return Vec::new();
            };
            match str_at(delta, "type") {
                "text_delta" => {
                    let text = str_at(delta, "text");
                    if text.is_empty() {
                        Vec::new()
                    } else {
                        vec![Ok(AgentUnit::text(text))]
                    }
                }
                "input_json_delta" => {
                    if let Some(tu) = state.tool_uses.get_mut(&index) {
                        tu.input_json.push_str(str_at(delta, "partial_json"));
                    }
                    Vec::new()
                }
                _ => Vec::new(),
            }
        }

        "content_block_stop" => match state.tool_uses.remove(&index) {
            Some(tu) => {
                let input = serde_json::from_str(&tu.input_json)
                    .unwrap_or_else(|_| Value::Object(Default::default()));
                vec![Ok(AgentUnit::ToolCall {
                    id: tu.id,
                    name: tu.name,
                    input,
                })]
            }
            None => Vec::new(),
        },

        "message_delta" => match v.get("delta").map(|d| str_at(d, "stop_reason")) {
            Some(reason) if !reason.is_empty() => {
                vec![Ok(AgentUnit::status("stop", Some(reason.to_owned())))]
            }
            _ => Vec::new(),
        },

        "error" => {
            let message = v
                .get("error")
                .map(|e| str_at(e, "message"))
                .filter(|m| !m.is_empty())
                .unwrap_or("unknown error");
            vec![Err(Error::Provider {
                provider: RUNNER_ID.into(),
                message: message.to_owned(),
            })]
        }

        // ping, message_stop
        _ => Vec::new(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
