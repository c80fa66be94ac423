//! Typed wrapper over the Someleon JSON endpoints.

use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sl_domain::error::{Error, Result};
use sl_domain::frame::RunFrame;
use sl_domain::result::StructuredResult;
use sl_domain::stream::BoxStream;

use crate::decoder::FrameDecoder;
use crate::view::RunView;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
const METADATA_TIMEOUT: Duration = Duration::from_secs(8);
/// Until response headers arrive. The stream itself is unbounded.
const RUN_START_TIMEOUT: Duration = Duration::from_secs(15);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub ok: bool,
    pub time: i64,
    pub session_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub objective: String,
    pub transcript: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub id: String,
    pub objective: String,
    pub transcript: String,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub last_result: Option<StructuredResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub id: String,
    pub text: String,
}

#[derive(Deserialize)]
struct AppendResponse {
    transcript: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

fn http_err(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build().map_err(http_err)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<Health> {
        let req = self.http.get(self.url("/api/health")).timeout(HEALTH_TIMEOUT);
        send_json(req).await
    }

    pub async fn new_session(&self, objective: Option<&str>, thread: &str) -> Result<SessionInfo> {
        let req = self
            .http
            .post(self.url("/api/session/new"))
            .timeout(METADATA_TIMEOUT)
            .json(&json!({ "objective": objective, "thread": thread }));
        send_json(req).await
    }

    pub async fn get_session(&self, id: &str) -> Result<SessionDetail> {
        let req = self
            .http
            .get(self.url("/api/session/get"))
            .query(&[("id", id)])
            .timeout(METADATA_TIMEOUT);
        send_json(req).await
    }

    pub async fn set_objective(&self, id: &str, objective: &str) -> Result<()> {
        let req = self
            .http
            .post(self.url("/api/session/objective"))
            .timeout(METADATA_TIMEOUT)
            .json(&json!({ "id": id, "objective": objective }));
        send_json::<Value>(req).await.map(|_| ())
    }

    /// Append a turn; returns the session's rendered transcript.
    pub async fn append(&self, id: &str, speaker: &str, text: &str) -> Result<String> {
        let req = self
            .http
            .post(self.url("/api/session/append"))
            .timeout(METADATA_TIMEOUT)
            .json(&json!({ "id": id, "speaker": speaker, "text": text }));
        send_json::<AppendResponse>(req).await.map(|r| r.transcript)
    }

    pub async fn sample(&self, id: &str) -> Result<Sample> {
        let req = self
            .http
            .get(self.url("/api/sample"))
            .query(&[("id", id)])
            .timeout(METADATA_TIMEOUT);
        send_json(req).await
    }

    /// Start a run and stream its frames.
    ///
    /// Blocks that do not decode to a known frame are skipped.
    pub async fn run(&self, id: &str, crawl: bool) -> Result<BoxStream<'static, Result<RunFrame>>> {
        let req = self
            .http
            .post(self.url("/api/session/run"))
            .json(&json!({ "id": id, "crawl": crawl }));
        let resp = tokio::time::timeout(RUN_START_TIMEOUT, req.send())
            .await
            .map_err(|_| Error::Timeout("run did not start in time".into()))?
            .map_err(http_err)?;
        let resp = check_status(resp).await?;

        let mut body = Box::pin(resp.bytes_stream());
        let stream = async_stream::stream! {
            let mut decoder = FrameDecoder::new();
            let mut failed = false;
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(chunk) => {
                        for block in decoder.push(&chunk) {
                            match block.into_frame() {
                                Ok(frame) => yield Ok(frame),
                                Err(e) => tracing::debug!(error = %e, "skipping undecodable block"),
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(http_err(e));
                        failed = true;
                        break;
                    }
                }
            }
            if !failed {
                if let Some(Ok(frame)) = decoder.finish().map(|b| b.into_frame()) {
                    yield Ok(frame);
                }
            }
        };
        Ok(Box::pin(stream))
    }

    /// Run to completion, folding every frame into a [`RunView`].
    ///
    /// `on_frame` sees each frame as it arrives. A transport error mid-stream
    /// ends the run as failed rather than returning an error.
    pub async fn run_to_view(
        &self,
        id: &str,
        crawl: bool,
        mut on_frame: impl FnMut(&RunFrame),
    ) -> Result<RunView> {
        let mut frames = self.run(id, crawl).await?;
        let mut view = RunView::new();
        while let Some(item) = frames.next().await {
            match item {
                Ok(frame) => {
                    on_frame(&frame);
                    view.apply(&frame);
                }
                Err(e) => {
                    view.apply(&RunFrame::Error {
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }
        view.finish();
        Ok(view)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.chars().take(200).collect());
    Err(Error::Http(format!("{}: {}", status.as_u16(), message)))
}

async fn send_json<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T> {
    let resp = check_status(req.send().await.map_err(http_err)?).await?;
    resp.json().await.map_err(http_err)
}
