//! Stdio transport: one JSON-RPC message per line on stdin, replies on stdout.
//!
//! Logging must stay on stderr while this runs.

use super::McpServer;
use crate::slack::RequestMetadata;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub async fn serve_stdio(server: McpServer) -> Result<()> {
    tracing::info!("MCP server listening on stdio");
    serve_lines(&server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Read lines until EOF. Stdio callers are always the local user, so the
/// request metadata is empty. Invalid UTF-8 is replaced, not fatal: the line
/// then fails JSON parsing and gets a parse error reply.
pub(crate) async fn serve_lines<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let metadata = RequestMetadata::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read from stdin")?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }

        let Some(response) = server.handle_line(&line, &metadata).await else {
            continue;
        };

        let mut encoded = serde_json::to_string(&response).context("Failed to encode response")?;
        encoded.push('\n');
        writer
            .write_all(encoded.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush stdout")?;
    }

    Ok(())
}
