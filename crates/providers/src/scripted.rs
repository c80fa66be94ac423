//! Canned runners for tests and offline demos.
//!
//! A [`ScriptedRunner`] plays back one [`Script`] per task, in order, and
//! records every prompt it was given.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use sl_domain::error::{Error, Result};
use sl_domain::stream::AgentUnit;

use crate::traits::{RunnerSource, TaskRunner, UnitStream};

/// What one task does.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these units, then end.
    Units(Vec<AgentUnit>),
    /// Refuse to start.
    Fail(String),
    /// Stream these units, then fail.
    FailAfter(Vec<AgentUnit>, String),
    /// Start but never produce anything.
    Stall,
}

impl Script {
    /// A task whose whole output is one text unit.
    pub fn text(content: impl Into<String>) -> Self {
        Script::Units(vec![AgentUnit::text(content)])
    }
}

#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<VecDeque<Script>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait::async_trait]
impl TaskRunner for ScriptedRunner {
    async fn run_task(&self, prompt: &str, _model: &str) -> Result<UnitStream> {
        self.prompts.lock().push(prompt.to_owned());
        let script = self
            .scripts
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Runtime("scripted runner has no task left".into()))?;

        let out: UnitStream = match script {
            Script::Units(units) => Box::pin(stream::iter(units.into_iter().map(Ok))),
            Script::Fail(message) => return Err(Error::Runtime(message)),
            Script::FailAfter(units, message) => Box::pin(
                stream::iter(units.into_iter().map(Ok))
                    .chain(stream::once(async move { Err(Error::Runtime(message)) })),
            ),
            Script::Stall => Box::pin(stream::pending::<Result<AgentUnit>>()),
        };
        Ok(out)
    }

    fn runner_id(&self) -> &str {
        "scripted"
    }
}

/// Always hands out the same runner.
pub struct StaticSource(pub Arc<dyn TaskRunner>);

#[async_trait::async_trait]
impl RunnerSource for StaticSource {
    async fn acquire(&self) -> Result<Arc<dyn TaskRunner>> {
        Ok(Arc::clone(&self.0))
    }
}

/// Never hands out a runner.
pub struct UnavailableSource(pub String);

#[async_trait::async_trait]
impl RunnerSource for UnavailableSource {
    async fn acquire(&self) -> Result<Arc<dyn TaskRunner>> {
        Err(Error::Runtime(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plays_scripts_in_order_and_records_prompts() {
        let runner = ScriptedRunner::new([Script::text("one"), Script::Fail("nope".into())]);

        let units: Vec<_> = runner.run_task("p1", "m").await.unwrap().collect().await;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].as_ref().unwrap().text_content(), "one");

        assert!(runner.run_task("p2", "m").await.is_err());
        assert!(runner.run_task("p3", "m").await.is_err());
        assert_eq!(runner.prompts(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn fail_after_yields_units_then_error() {
        let runner = ScriptedRunner::new([Script::FailAfter(
            vec![AgentUnit::text("partial")],
            "dropped".into(),
        )]);
        let items: Vec<_> = runner.run_task("p", "m").await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }
}
