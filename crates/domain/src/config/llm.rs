use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent runtime (Anthropic Messages API)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier sent with every task and reported in `meta` frames.
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Connect timeout for the upstream request. The streamed body is unbounded.
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
    #[serde(default = "d_8192")]
    pub max_tokens: u32,
    #[serde(default = "d_auth")]
    pub auth: AuthConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: d_model(),
            base_url: d_base_url(),
            timeout_ms: 120_000,
            max_tokens: 8_192,
            auth: d_auth(),
        }
    }
}

/// Where the API key comes from.
///
/// Precedence when resolving: `key`, then keychain `service` + `account`,
/// then `env`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Env var containing the key.
    #[serde(default)]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env or keychain).
    #[serde(default)]
    pub key: Option<String>,
    /// Keychain service name (e.g., "someleon").
    #[serde(default)]
    pub service: Option<String>,
    /// Keychain account name (e.g., "anthropic-api-key").
    #[serde(default)]
    pub account: Option<String>,
}

// ── serde default helpers ───────────────────────────────────────────

fn d_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn d_base_url() -> String {
    "https://api.anthropic.com".into()
}
fn d_120000() -> u64 {
    120_000
}
fn d_8192() -> u32 {
    8_192
}
fn d_auth() -> AuthConfig {
    AuthConfig {
        env: Some("ANTHROPIC_API_KEY".into()),
        ..AuthConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reads_key_from_env() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.auth.env.as_deref(), Some("ANTHROPIC_API_KEY"));
        assert!(cfg.auth.key.is_none());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let cfg: LlmConfig = toml::from_str(r#"model = "claude-3-5-haiku-latest""#).unwrap();
        assert_eq!(cfg.model, "claude-3-5-haiku-latest");
        assert_eq!(cfg.base_url, "https://api.anthropic.com");
        assert_eq!(cfg.timeout_ms, 120_000);
        assert_eq!(cfg.auth.env.as_deref(), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn explicit_auth_table_replaces_default() {
        let cfg: LlmConfig = toml::from_str(
            r#"
            [auth]
            service = "someleon"
            account = "anthropic-api-key"
            "#,
        )
        .unwrap();
        assert!(cfg.auth.env.is_none());
        assert_eq!(cfg.auth.service.as_deref(), Some("someleon"));
    }
}
