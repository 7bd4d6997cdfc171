//! MCP request dispatch
//!
//! Transport-independent: both the stdio loop and the HTTP handler feed
//! decoded messages into [`McpServer`] together with the request metadata
//! the credential strategy reads from.

use super::protocol::{
    JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, RpcError, SERVER_NAME, tool_result,
};
use crate::config::Config;
use crate::error::{ErrorCode, SlackMcpError};
use crate::slack::{CredentialProvider, RequestMetadata, SlackClient};
use crate::tools::{CallContext, SlackTools, ToolError, ToolKind};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// MCP server bound to one tool set and one credential strategy.
#[derive(Clone)]
pub struct McpServer {
    tools: Arc<SlackTools>,
    credentials: Arc<dyn CredentialProvider>,
}

impl McpServer {
    pub fn new(tools: SlackTools, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            tools: Arc::new(tools),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let tools = SlackTools::new(
            SlackClient::new(config.slack.api_base.as_str()),
            config.slack.logs_channel_id.as_str(),
        );
        let credentials = config.credential_provider()?;
        tracing::info!("Slack credentials resolved from {}", credentials.source());
        Ok(Self::new(tools, credentials))
    }

    /// Handle one raw line of input. `None` when no reply is due.
    pub async fn handle_line(&self, line: &str, metadata: &RequestMetadata) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_value(message, metadata).await,
            Err(e) => {
                let err = SlackMcpError::from(e);
                tracing::warn!("{}", err);
                respond(JsonRpcResponse::error(Value::Null, RpcError::from(&err)))
            }
        }
    }

    /// Handle one decoded JSON message.
    pub async fn handle_value(&self, message: Value, metadata: &RequestMetadata) -> Option<Value> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle(request, metadata).await,
            Err(e) => {
                let err = SlackMcpError::InvalidRequest(e.to_string());
                tracing::warn!("{}", err);
                respond(JsonRpcResponse::error(id, RpcError::from(&err)))
            }
        }
    }

    pub async fn handle(&self, request: JsonRpcRequest, metadata: &RequestMetadata) -> Option<Value> {
        let Some(id) = request.id.clone() else {
            tracing::debug!("Notification: {}", request.method);
            return None;
        };

        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list()),
            "tools/call" => self.tools_call(request.params, metadata).await,
            other => Err(SlackMcpError::MethodNotFound(other.to_string())),
        };

        match result {
            Ok(value) => respond(JsonRpcResponse::success(id, value)),
            Err(err) => {
                tracing::debug!("{} failed: {}", request.method, err);
                respond(JsonRpcResponse::error(id, RpcError::from(&err)))
            }
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": SERVER_NAME, "version": crate::VERSION }
        })
    }

    fn tools_list(&self) -> Value {
        let tools: Vec<Value> = ToolKind::ALL
            .iter()
            .map(|kind| {
                json!({
                    "name": kind.name(),
                    "description": kind.description(),
                    "inputSchema": kind.input_schema()
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn tools_call(
        &self,
        params: Option<Value>,
        metadata: &RequestMetadata,
    ) -> Result<Value, SlackMcpError> {
        let params: ToolCallParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| SlackMcpError::InvalidParams(e.to_string()))?;
        let kind: ToolKind = params.name.parse()?;

        let credentials = match self.credentials.resolve(metadata) {
            Ok(credentials) => credentials,
            Err(e) => {
                let err = ToolError::from(e);
                tracing::warn!("{}: {}", kind, err);
                return Ok(tool_result(err.to_string(), true));
            }
        };

        tracing::info!("Calling tool {}", kind);
        let ctx = CallContext::top_level(credentials);
        match self.tools.call(&ctx, kind, params.arguments).await {
            Ok(output) => {
                let text = serde_json::to_string(&output)
                    .map_err(|e| SlackMcpError::Internal(e.to_string()))?;
                Ok(tool_result(text, false))
            }
            Err(err) => {
                tracing::warn!("{}: {}", kind, err);
                Ok(tool_result(err.to_string(), true))
            }
        }
    }
}

fn respond(response: JsonRpcResponse) -> Option<Value> {
    match serde_json::to_value(&response) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("Failed to encode response: {}", e);
            Some(json!({
                "jsonrpc": "2.0",
                "id": response.id,
                "error": {
                    "code": ErrorCode::InternalError.as_i32(),
                    "message": format!("Internal error: {}", e)
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::{Credentials, HeaderCredentials, StaticCredentials};

    fn server_with(credentials: Arc<dyn CredentialProvider>) -> McpServer {
        McpServer::new(
            SlackTools::new(SlackClient::new("http://127.0.0.1:1"), "CLOGS"),
            credentials,
        )
    }

    fn stdio_server() -> McpServer {
        server_with(Arc::new(StaticCredentials::new(Credentials::new(
            "xoxc-test",
            "xoxd-test",
            "test-agent",
        ))))
    }

    async fn call(server: &McpServer, message: Value) -> Value {
        server
            .handle_value(message, &RequestMetadata::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let response = call(
            &stdio_server(),
            json!({
                "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": { "protocolVersion": "2024-11-05", "capabilities": {} }
            }),
        )
        .await;
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "slack");
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_defaults_protocol_version() {
        let response = call(
            &stdio_server(),
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
        )
        .await;
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let server = stdio_server();
        let reply = server
            .handle_value(
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
                &RequestMetadata::default(),
            )
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let response = call(&stdio_server(), json!({"jsonrpc": "2.0", "id": "p", "method": "ping"})).await;
        assert_eq!(response["id"], "p");
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_null_id_still_gets_a_reply() {
        let reply = stdio_server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#,
                &RequestMetadata::default(),
            )
            .await
            .unwrap();
        assert!(reply.get("id").is_some_and(Value::is_null));
        assert_eq!(reply["result"], json!({}));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(
            &stdio_server(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["message"], "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_tools_list_has_every_tool() {
        let response = call(&stdio_server(), json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"})).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), ToolKind::ALL.len());
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
        assert!(tools.iter().any(|t| t["name"] == "get_thread_by_link"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let response = call(
            &stdio_server(),
            json!({
                "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                "params": { "name": "delete_channel", "arguments": {} }
            }),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
        assert_eq!(response["error"]["message"], "Unknown tool: delete_channel");
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let response = call(
            &stdio_server(),
            json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call"}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_bad_arguments_are_tool_errors() {
        let response = call(
            &stdio_server(),
            json!({
                "jsonrpc": "2.0", "id": 6, "method": "tools/call",
                "params": { "name": "add_reaction", "arguments": { "channel_id": "C1" } }
            }),
        )
        .await;
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_missing_headers_are_tool_errors() {
        let response = call(
            &server_with(Arc::new(HeaderCredentials)),
            json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": { "name": "whoami" }
            }),
        )
        .await;
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Credential lookup failed: Missing required header: X-Slack-Web-Token"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_yields_default_result() {
        let response = call(
            &stdio_server(),
            json!({
                "jsonrpc": "2.0", "id": 8, "method": "tools/call",
                "params": { "name": "get_channel_history", "arguments": { "channel_id": "C1" } }
            }),
        )
        .await;
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(response["result"]["content"][0]["text"], "[]");
    }

    #[tokio::test]
    async fn test_parse_error_line() {
        let response = stdio_server()
            .handle_line("{not json", &RequestMetadata::default())
            .await
            .unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_request_without_method_is_invalid() {
        let response = call(&stdio_server(), json!({"jsonrpc": "2.0", "id": 9})).await;
        assert_eq!(response["id"], 9);
        assert_eq!(response["error"]["code"], -32600);
    }
}
