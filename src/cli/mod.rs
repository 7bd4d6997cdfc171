//! CLI Module
//!
//! Command-line interface for slack-mcp using Clap v4.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, TransportMode};
use crate::logging::{self, LogConfig};
use crate::tools::ToolKind;

/// slack-mcp - MCP server for the Slack Web API
#[derive(Parser, Debug)]
#[command(name = "slack-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (writes rolling log files)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Transport override (stdio or streamable-http)
    #[arg(short, long, global = true, value_enum)]
    pub transport: Option<TransportMode>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the MCP server (default)
    Serve,

    /// List the tools the server exposes
    Tools,

    /// Show configuration
    Config {
        /// Show full configuration including secrets
        #[arg(short, long)]
        show_secrets: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(mode) = cli.transport {
        config.transport.mode = mode;
    }

    let _guard = init_logging(&config, cli.debug)?;
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(&config).await,
        Commands::Tools => {
            print!("{}", render_tool_catalog());
            Ok(())
        }
        Commands::Config { show_secrets } => {
            print!("{}", render_config(&config, show_secrets));
            Ok(())
        }
    }
}

fn load_config(config_path: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    }
}

fn init_logging(
    config: &Config,
    debug: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let mut log_config = LogConfig::new()
        .with_level(config.logging.level.as_str())
        .with_debug_mode(debug);
    if let Some(ref dir) = config.logging.file {
        log_config = log_config.with_log_dir(dir.clone());
    }
    let log_dir: PathBuf = log_config.log_dir().to_path_buf();

    let guard = logging::init_logging(log_config).context("Failed to initialize logging")?;

    // Clean up old log files (keep last 7 days)
    if debug {
        match logging::cleanup_old_logs(&log_dir, 7) {
            Ok(removed) if removed > 0 => {
                tracing::info!("Cleaned up {} old log file(s)", removed)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to clean up old logs: {}", e),
        }
    }

    Ok(guard)
}

async fn cmd_serve(config: &Config) -> Result<()> {
    config.validate()?;
    tracing::info!(
        "Starting slack-mcp {} ({} transport, audit channel {})",
        crate::VERSION,
        config.transport.mode,
        config.slack.logs_channel_id
    );
    crate::mcp::serve(config).await
}

fn render_tool_catalog() -> String {
    let width = ToolKind::ALL
        .iter()
        .map(|kind| kind.name().len())
        .max()
        .unwrap_or_default();

    ToolKind::ALL
        .iter()
        .map(|kind| format!("{:width$}  {}\n", kind.name(), kind.description(), width = width))
        .collect()
}

fn render_config(config: &Config, show_secrets: bool) -> String {
    let secret = |value: &Option<String>| match (value, show_secrets) {
        (Some(v), true) => v.clone(),
        (Some(_), false) => "[SET]".to_string(),
        (None, _) => "[NOT SET]".to_string(),
    };

    let mut out = String::from("slack-mcp configuration\n\n");
    out.push_str(&format!("Slack API:        {}\n", config.slack.api_base));
    out.push_str(&format!(
        "Logs channel:     {}\n",
        if config.slack.logs_channel_id.is_empty() {
            "[NOT SET]"
        } else {
            config.slack.logs_channel_id.as_str()
        }
    ));
    out.push_str(&format!("Web token:        {}\n", secret(&config.slack.web_token)));
    out.push_str(&format!("Cookie token:     {}\n", secret(&config.slack.cookie_token)));
    out.push_str(&format!("User-Agent:       {}\n", config.slack.user_agent));
    out.push_str(&format!("Transport:        {}\n", config.transport.mode));
    if config.transport.mode == TransportMode::StreamableHttp {
        out.push_str(&format!(
            "Listen:           {}:{}\n",
            config.transport.bind_host(),
            config.transport.port
        ));
    }
    out.push_str(&format!("Log level:        {}\n", config.logging.level));
    out
}
