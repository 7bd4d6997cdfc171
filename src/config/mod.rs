//! Configuration Module
//!
//! Handles application configuration loading, validation, and the choice of
//! credential strategy for the selected transport.

mod types;

pub use types::{Config, LoggingConfig, SlackConfig, TransportConfig, TransportMode};

use crate::slack::{CredentialProvider, Credentials, HeaderCredentials, StaticCredentials};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/slack-mcp/config.toml
    /// 3. Local config: ./slack-mcp.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        if let Some(system_config_path) = Self::system_config_path()
            && system_config_path.exists()
        {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(config, &system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(config, &local_config_path)?;
        }

        config = Self::apply_env_overrides(config, |key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::merge_from_file(Self::default(), path)?;
        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// Get the system config path: ~/.config/slack-mcp/config.toml
    fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("slack-mcp").join("config.toml"))
    }

    /// Get the local config path: ./slack-mcp.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./slack-mcp.toml")
    }

    /// Load a TOML file and lay it over `base`. Keys the file leaves out keep
    /// their value from `base`.
    fn merge_from_file(base: Self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let overlay: toml::Table = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        let toml::Value::Table(mut merged) =
            toml::Value::try_from(&base).context("Failed to serialize config")?
        else {
            anyhow::bail!("Configuration did not serialize to a table");
        };
        merge_tables(&mut merged, overlay);

        toml::Value::Table(merged)
            .try_into()
            .with_context(|| format!("Invalid configuration in: {:?}", path))
    }

    /// Apply environment variable overrides. `lookup` is `std::env::var`
    /// outside of tests.
    fn apply_env_overrides<F>(mut config: Self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(channel) = lookup("LOGS_CHANNEL_ID") {
            config.slack.logs_channel_id = channel;
        }
        if let Some(token) = lookup("SLACK_XOXC_TOKEN") {
            config.slack.web_token = Some(token);
        }
        if let Some(token) = lookup("SLACK_XOXD_TOKEN") {
            config.slack.cookie_token = Some(token);
        }
        if let Some(api_base) = lookup("SLACK_API_BASE") {
            config.slack.api_base = api_base;
        }

        if let Some(mode) = lookup("MCP_TRANSPORT") {
            config.transport.mode = mode.parse()?;
        }
        if let Some(host) = lookup("MCP_HOST") {
            config.transport.host = Some(host);
        }
        if let Some(port) = lookup("MCP_PORT") {
            config.transport.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid MCP_PORT: {}", port))?;
        }

        if let Some(level) = lookup("SLACK_MCP_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(dir) = lookup("SLACK_MCP_LOG_DIR") {
            config.logging.file = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                VALID_LOG_LEVELS
            );
        }

        if self.slack.logs_channel_id.trim().is_empty() {
            anyhow::bail!("LOGS_CHANNEL_ID is not set");
        }

        if self.slack.api_base.trim().is_empty() {
            anyhow::bail!("Slack api_base is empty");
        }

        if self.transport.mode == TransportMode::Stdio {
            if !has_value(&self.slack.web_token) {
                anyhow::bail!("SLACK_XOXC_TOKEN is required in stdio mode");
            }
            if !has_value(&self.slack.cookie_token) {
                anyhow::bail!("SLACK_XOXD_TOKEN is required in stdio mode");
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Credential strategy for the configured transport.
    pub fn credential_provider(&self) -> Result<Arc<dyn CredentialProvider>> {
        match self.transport.mode {
            TransportMode::Stdio => {
                let (Some(web_token), Some(cookie_token)) =
                    (&self.slack.web_token, &self.slack.cookie_token)
                else {
                    anyhow::bail!("SLACK_XOXC_TOKEN and SLACK_XOXD_TOKEN are required in stdio mode");
                };
                Ok(Arc::new(StaticCredentials::new(Credentials::new(
                    web_token.trim(),
                    cookie_token.trim(),
                    self.slack.user_agent.as_str(),
                ))))
            }
            TransportMode::StreamableHttp => Ok(Arc::new(HeaderCredentials)),
        }
    }
}

fn has_value(secret: &Option<String>) -> bool {
    secret.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
