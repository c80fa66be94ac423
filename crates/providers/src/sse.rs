//! SSE plumbing for streaming runtime responses.
//!
//! The upstream body is buffered, split on `\n\n`, and each `data:` payload
//! is handed to a runner-specific parser that turns it into agent units.

use crate::traits::UnitStream;
use crate::util::from_reqwest;
use sl_domain::error::Result;
use sl_domain::stream::AgentUnit;

/// Extract complete `data:` payloads from an SSE buffer.
///
/// Only `data:` lines are kept; `event:`, `id:` and `retry:` lines are
/// ignored. Consumed bytes are removed from the buffer and a trailing
/// partial block stays for the next call.
pub(crate) fn drain_data_lines(buffer: &mut String) -> Vec<String> {
    let mut data_lines = Vec::new();

    while let Some(pos) = buffer.find("\n\n") {
        let block: String = buffer.drain(..pos).collect();
        buffer.drain(..2);

        for line in block.lines() {
            if let Some(data) = line.trim().strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    data_lines.push(data.to_string());
                }
            }
        }
    }

    data_lines
}

/// Turn an SSE `reqwest::Response` into a unit stream.
///
/// `parse_data` is `FnMut` so parsers can keep state across payloads
/// (tool-use blocks arrive in pieces). The remaining buffer is flushed when
/// the body closes. A transport error ends the stream after being yielded.
pub(crate) fn sse_response_stream<F>(response: reqwest::Response, mut parse_data: F) -> UnitStream
where
    F: FnMut(&str) -> Vec<Result<AgentUnit>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut response = response;
        let mut buffer = String::new();

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    buffer = buffer.replace("\r\n", "\n");
                    for data in drain_data_lines(&mut buffer) {
                        for unit in parse_data(&data) {
                            yield unit;
                        }
                    }
                }
                Ok(None) => {
                    if !buffer.trim().is_empty() {
                        buffer.push_str("\n\n");
                        for data in drain_data_lines(&mut buffer) {
                            for unit in parse_data(&data) {
                                yield unit;
                            }
                        }
                    }
                    break;
                }
                Err(e) => {
                    yield Err(from_reqwest(e));
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
