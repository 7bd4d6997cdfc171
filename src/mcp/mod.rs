//! MCP Server
//!
//! JSON-RPC 2.0 framing, method dispatch onto the Slack tools, and the two
//! transports (stdio and streamable HTTP).

mod http;
mod protocol;
mod server;
mod stdio;

pub use http::{MCP_ENDPOINT, serve_http};
pub use protocol::{
    JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, RpcError, SERVER_NAME, tool_result,
};
pub use server::McpServer;
pub use stdio::serve_stdio;

use crate::config::{Config, TransportMode};
use anyhow::Result;

/// Build the server from `config` and run the configured transport until
/// it closes.
pub async fn serve(config: &Config) -> Result<()> {
    let server = McpServer::from_config(config)?;
    match config.transport.mode {
        TransportMode::Stdio => serve_stdio(server).await,
        TransportMode::StreamableHttp => {
            serve_http(server, config.transport.bind_host(), config.transport.port).await
        }
    }
}
