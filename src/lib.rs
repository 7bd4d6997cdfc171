//! slack-mcp - Slack Web API tools for MCP clients
//!
//! Exposes channel history, posting, reactions, DMs, search and thread
//! retrieval as Model Context Protocol tools, authenticating with a Slack
//! browser session (`xoxc-` token plus `d` cookie).
//!
//! ## Quick Start
//!
//! ```bash
//! # Single user, credentials from the environment
//! LOGS_CHANNEL_ID=C0LOGS SLACK_XOXC_TOKEN=xoxc-... SLACK_XOXD_TOKEN=xoxd-... slack-mcp
//!
//! # Multi-user HTTP server, credentials per request headers
//! LOGS_CHANNEL_ID=C0LOGS slack-mcp --transport streamable-http
//!
//! # List the tools
//! slack-mcp tools
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod slack;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorCode, SlackMcpError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
