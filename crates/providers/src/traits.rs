use std::sync::Arc;

use sl_domain::error::Result;
use sl_domain::stream::{AgentUnit, BoxStream};

/// The units a running task produces. A stream error ends the task.
pub type UnitStream = BoxStream<'static, Result<AgentUnit>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent runtime traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Something that can run a prompt against a model and stream its output.
///
/// Dropping the returned stream abandons the task.
#[async_trait::async_trait]
pub trait TaskRunner: Send + Sync {
    /// Start a task. Errors here mean the task never started.
    async fn run_task(&self, prompt: &str, model: &str) -> Result<UnitStream>;

    /// A short identifier used in logs.
    fn runner_id(&self) -> &str;
}

/// Hands out the runner used by a run.
///
/// Acquisition may build the runner on first use, so it can fail (for
/// instance when no API key is configured).
#[async_trait::async_trait]
pub trait RunnerSource: Send + Sync {
    async fn acquire(&self) -> Result<Arc<dyn TaskRunner>>;
}
