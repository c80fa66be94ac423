pub mod ask;
pub mod config;

use clap::{Parser, Subcommand};

/// Someleon: a conversation copilot for multi-turn chats.
#[derive(Debug, Parser)]
#[command(name = "someleon", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the web server (default when no subcommand is given).
    Serve,
    /// Analyse a transcript file against a running server and print the result.
    Ask {
        /// Base URL of the server.
        #[arg(long, default_value = "http://127.0.0.1:8787")]
        server: String,
        /// Transcript file with `You:` / `Them:` lines.
        #[arg(long)]
        transcript: String,
        /// What you want out of the conversation.
        #[arg(long)]
        objective: Option<String>,
        /// Let the model know web research is allowed.
        #[arg(long)]
        crawl: bool,
        /// Print the raw result JSON instead of the rendered sections.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `SL_CONFIG` (or `config.toml`
/// by default). A missing file means all defaults.
///
/// Returns the parsed [`Config`] and the path that was used.
///
/// [`Config`]: sl_domain::config::Config
pub fn load_config() -> anyhow::Result<(sl_domain::config::Config, String)> {
    let config_path = std::env::var("SL_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<sl_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(sl_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
