use sl_domain::config::Config;

#[test]
fn default_host_is_localhost_on_8787() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8787);
}

#[test]
fn explicit_host_and_port_parse() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3210
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3210);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    let origins = &config.server.cors.allowed_origins;
    assert!(origins.contains(&"http://localhost:*".to_string()));
    assert!(origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn cors_config_parses_custom_origins() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["https://myapp.com", "http://localhost:3000"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.cors.allowed_origins.len(), 2);
}

#[test]
fn default_objective_and_model() {
    let config = Config::default();
    assert_eq!(
        config.sessions.default_objective,
        "Help me write the next message."
    );
    assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
    assert_eq!(config.run.raw_snippet_chars, 1500);
}

#[test]
fn full_file_parses() {
    let toml_str = r#"
[server]
port = 9999
public_dir = "web"

[llm]
model = "claude-3-5-haiku-latest"
timeout_ms = 5000

[sessions]
default_objective = "Keep it short."
lock_wait_ms = 250

[run]
raw_snippet_chars = 200
channel_capacity = 8

[observability]
service_name = "someleon-dev"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.public_dir.to_str(), Some("web"));
    assert_eq!(config.llm.timeout_ms, 5000);
    assert_eq!(config.sessions.default_objective, "Keep it short.");
    assert_eq!(config.sessions.lock_wait_ms, 250);
    assert_eq!(config.run.channel_capacity, 8);
    assert_eq!(config.observability.service_name, "someleon-dev");
    assert!(config.validate().iter().all(|e| e.field != "server.port"));
}

#[test]
fn empty_file_is_all_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.sessions.lock_wait_ms, 2000);
    assert_eq!(config.run.channel_capacity, 64);
    assert!(config.observability.otlp_endpoint.is_none());
}

#[test]
fn shipped_example_matches_defaults() {
    let config: Config = toml::from_str(include_str!("../../../config.example.toml")).unwrap();
    let defaults = Config::default();
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.server.cors.allowed_origins, defaults.server.cors.allowed_origins);
    assert!(config.server.rate_limit.is_none());
    assert_eq!(config.llm.model, defaults.llm.model);
    assert_eq!(config.llm.auth.env, defaults.llm.auth.env);
    assert_eq!(config.sessions.lock_wait_ms, defaults.sessions.lock_wait_ms);
    assert_eq!(config.run.raw_snippet_chars, defaults.run.raw_snippet_chars);
    assert!(config.validate().is_empty());
}
