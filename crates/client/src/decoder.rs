//! Incremental SSE decoding.
//!
//! Bytes arrive in arbitrary chunks. Blocks are only decoded once their
//! terminating blank line has been seen, so multi-byte characters split
//! across chunks are reassembled before UTF-8 decoding.

use serde_json::Value;
use sl_domain::error::Result;
use sl_domain::frame::RunFrame;

/// One complete SSE block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseBlock {
    /// The `event:` name, `message` when absent.
    pub event: String,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

impl SseBlock {
    /// Interpret the block as a run frame.
    ///
    /// A payload that is not JSON is kept as a JSON string.
    pub fn into_frame(self) -> Result<RunFrame> {
        let payload = serde_json::from_str(&self.data).unwrap_or(Value::String(self.data));
        RunFrame::from_parts(&self.event, payload)
    }
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every block it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseBlock> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some((end, skip)) = find_block_end(&self.buf) {
            let block: Vec<u8> = self.buf.drain(..end + skip).take(end).collect();
            if let Some(b) = parse_block(&String::from_utf8_lossy(&block)) {
                out.push(b);
            }
        }
        out
    }

    /// Flush a trailing block that was never terminated.
    pub fn finish(&mut self) -> Option<SseBlock> {
        let rest = std::mem::take(&mut self.buf);
        parse_block(&String::from_utf8_lossy(&rest))
    }
}

/// Position of the first blank-line separator and its length.
fn find_block_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Parse one block. Comment-only and empty blocks yield nothing.
fn parse_block(block: &str) -> Option<SseBlock> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = Some(value.trim().to_owned()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseBlock {
        event: event.unwrap_or_else(|| "message".into()),
        data: data.join("\n"),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
