//! Streamable HTTP transport
//!
//! `POST /mcp` takes one JSON-RPC message and answers with JSON. The request
//! headers travel with the message so each call can carry its own Slack
//! credentials.

use super::McpServer;
use crate::slack::RequestMetadata;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const MCP_ENDPOINT: &str = "/mcp";

pub async fn serve_http(server: McpServer, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind MCP server on {}:{}", host, port))?;
    let local_addr: SocketAddr = listener
        .local_addr()
        .context("Failed to resolve bound address")?;

    tracing::info!("MCP server listening on http://{}{}", local_addr, MCP_ENDPOINT);

    axum::serve(listener, build_router(server))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("MCP HTTP server exited unexpectedly")?;

    tracing::info!("MCP HTTP server stopped");
    Ok(())
}

pub(crate) fn build_router(server: McpServer) -> Router {
    Router::new()
        .route(MCP_ENDPOINT, post(handle_mcp))
        .with_state(Arc::new(server))
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let metadata = RequestMetadata::new(headers);
    let body = String::from_utf8_lossy(&body);

    match server.handle_line(&body, &metadata).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
