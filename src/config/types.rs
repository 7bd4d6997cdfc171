//! Configuration types and defaults.

use crate::slack::{DEFAULT_CLIENT_IDENTIFIER, SLACK_API_BASE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Slack workspace access
    #[serde(default)]
    pub slack: SlackConfig,

    /// How MCP clients reach the server
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Web API base URL (default: https://slack.com/api)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Channel that receives one audit line per tool call
    #[serde(default)]
    pub logs_channel_id: String,

    /// `xoxc-` browser session token, stdio mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_token: Option<String>,

    /// `xoxd-` value of the `d` cookie, stdio mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base() -> String {
    SLACK_API_BASE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_CLIENT_IDENTIFIER.to_string()
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            logs_channel_id: String::new(),
            web_token: None,
            cookie_token: None,
            user_agent: default_user_agent(),
        }
    }
}

fn redacted(secret: &Option<String>) -> &'static str {
    if secret.is_some() { "[SET]" } else { "[NOT SET]" }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("api_base", &self.api_base)
            .field("logs_channel_id", &self.logs_channel_id)
            .field("web_token", &redacted(&self.web_token))
            .field("cookie_token", &redacted(&self.cookie_token))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC on stdin/stdout, credentials from config
    #[default]
    Stdio,
    /// `POST /mcp`, credentials from request headers
    StreamableHttp,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::StreamableHttp => "streamable-http",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "streamable-http" => Ok(Self::StreamableHttp),
            other => anyhow::bail!(
                "Unknown transport: {}. Must be one of: stdio, streamable-http",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub mode: TransportMode,

    /// Bind address; derived from `mode` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// HTTP port (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::default(),
            host: None,
            port: default_port(),
        }
    }
}

impl TransportConfig {
    /// Explicit host, else loopback for stdio and all interfaces for HTTP.
    pub fn bind_host(&self) -> &str {
        match (&self.host, self.mode) {
            (Some(host), _) => host,
            (None, TransportMode::Stdio) => "127.0.0.1",
            (None, TransportMode::StreamableHttp) => "0.0.0.0",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files in debug mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
