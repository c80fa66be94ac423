use std::sync::Arc;

use sl_domain::config::LlmConfig;
use sl_domain::error::Result;
use tokio::sync::OnceCell;

use crate::anthropic::AnthropicRunner;
use crate::traits::{RunnerSource, TaskRunner};

/// Builds the Anthropic runner on first acquisition and reuses it.
///
/// A failed build is not cached: the next acquisition tries again, so a key
/// exported after startup is picked up.
pub struct AnthropicSource {
    config: LlmConfig,
    runner: OnceCell<Arc<dyn TaskRunner>>,
}

impl AnthropicSource {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            runner: OnceCell::new(),
        }
    }
}

#[async_trait::async_trait]
impl RunnerSource for AnthropicSource {
    async fn acquire(&self) -> Result<Arc<dyn TaskRunner>> {
        let runner = self
            .runner
            .get_or_try_init(|| async {
                let runner = AnthropicRunner::from_config(&self.config)?;
                tracing::info!(base_url = %self.config.base_url, "agent runtime ready");
                Ok::<_, sl_domain::Error>(Arc::new(runner) as Arc<dyn TaskRunner>)
            })
            .await?;
        Ok(Arc::clone(runner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_domain::config::AuthConfig;

    #[tokio::test]
    async fn acquisition_fails_without_a_key() {
        let cfg = LlmConfig {
            auth: AuthConfig::default(),
            ..LlmConfig::default()
        };
        let source = AnthropicSource::new(cfg);
        assert!(source.acquire().await.is_err());
    }

    #[tokio::test]
    async fn runner_is_built_once() {
        let cfg = LlmConfig {
            auth: AuthConfig {
                key: Some("sk-test".into()),
                ..AuthConfig::default()
            },
            ..LlmConfig::default()
        };
        let source = AnthropicSource::new(cfg);
        let a = source.acquire().await.unwrap();
        let b = source.acquire().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.runner_id(), "anthropic");
    }
}
