mod llm;
mod observability;
mod run;
mod server;
mod sessions;

pub use llm::*;
pub use observability::*;
pub use run::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |severity, field: &str, message: &str| {
            errors.push(ConfigError {
                severity,
                field: field.into(),
                message: message.into(),
            })
        };

        if self.server.port == 0 {
            push(ConfigSeverity::Error, "server.port", "port must be greater than 0");
        }
        if self.server.host.is_empty() {
            push(ConfigSeverity::Error, "server.host", "host must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            push(ConfigSeverity::Error, "llm.model", "model must not be empty");
        }
        if self.llm.base_url.trim().is_empty() {
            push(ConfigSeverity::Error, "llm.base_url", "base_url must not be empty");
        }
        if self.llm.auth.key.is_none()
            && self.llm.auth.env.is_none()
            && (self.llm.auth.service.is_none() || self.llm.auth.account.is_none())
        {
            push(
                ConfigSeverity::Warning,
                "llm.auth",
                "no key source configured; runs will fail with an agent runtime error",
            );
        }
        if self.sessions.default_objective.trim().is_empty() {
            push(
                ConfigSeverity::Error,
                "sessions.default_objective",
                "default objective must not be empty",
            );
        }
        if self.run.channel_capacity == 0 {
            push(
                ConfigSeverity::Error,
                "run.channel_capacity",
                "channel capacity must be greater than 0",
            );
        }
        if self.run.raw_snippet_chars == 0 {
            push(
                ConfigSeverity::Warning,
                "run.raw_snippet_chars",
                "final_error frames will carry no raw text",
            );
        }
        if self.server.cors.allowed_origins.len() == 1 && self.server.cors.allowed_origins[0] == "*" {
            push(
                ConfigSeverity::Warning,
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            );
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        let issues = Config::default().validate();
        assert!(
            issues.iter().all(|i| i.severity != ConfigSeverity::Error),
            "unexpected errors: {issues:?}"
        );
    }

    #[test]
    fn zero_port_and_empty_model_are_errors() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        cfg.llm.model = "  ".into();
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"server.port".to_string()));
        assert!(fields.contains(&"llm.model".to_string()));
    }

    #[test]
    fn missing_key_source_is_a_warning() {
        let mut cfg = Config::default();
        cfg.llm.auth = AuthConfig::default();
        let issue = cfg
            .validate()
            .into_iter()
            .find(|e| e.field == "llm.auth")
            .expect("llm.auth warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn display_tags_severity() {
        let e = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "x".into(),
            message: "y".into(),
        };
        assert_eq!(e.to_string(), "[WARN] x: y");
    }
}
