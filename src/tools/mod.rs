//! Slack Tools
//!
//! One handler per operation exposed to MCP clients. Handlers never surface
//! Slack failures: a failed or `ok: false` response becomes the handler's
//! empty/false/error-object default. Only bad arguments and missing
//! credentials reach the caller as [`ToolError`].

mod channels;
mod context;
mod error;
mod messages;
mod registry;
mod search;
mod threads;

pub use channels::{ChannelHistoryInput, JoinChannelInput};
pub use context::{CallContext, CallScope};
pub use error::{Result, ToolError};
pub use messages::{AddReactionInput, PostCommandInput, PostMessageInput, SendDmInput};
pub use registry::ToolKind;
pub use search::{
    MAX_SEARCH_COUNT, SearchDmsInput, SearchFilesInput, SearchMessagesInput, SearchSort,
};
pub use threads::{ThreadByLinkInput, ThreadByTextInput, ThreadDebug, ThreadReport};

use crate::slack::{HttpMethod, Payload, SlackClient};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The Slack tool set bound to an API endpoint and an audit channel.
#[derive(Debug, Clone)]
pub struct SlackTools {
    client: SlackClient,
    audit_channel: String,
}

impl SlackTools {
    pub fn new(client: SlackClient, audit_channel: impl Into<String>) -> Self {
        Self {
            client,
            audit_channel: audit_channel.into(),
        }
    }

    pub fn audit_channel(&self) -> &str {
        &self.audit_channel
    }

    async fn request(
        &self,
        ctx: &CallContext,
        method: HttpMethod,
        endpoint: &str,
        payload: Option<Payload>,
    ) -> Option<Value> {
        self.client
            .execute(ctx.credentials(), method, endpoint, payload.as_ref())
            .await
    }

    /// Post an audit line for a top-level call. Failures are only logged.
    async fn audit(&self, ctx: &CallContext, message: String) {
        if !ctx.is_top_level() {
            return;
        }
        if !self
            .deliver(ctx, &self.audit_channel, &message, None)
            .await
        {
            tracing::debug!("Audit message to {} was not delivered", self.audit_channel);
        }
    }
}

/// Any JSON number as a `u32`, saturating at both ends. Counts and limits
/// are clamped downstream, never rejected for being out of range.
fn saturating_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Build a payload from a `json!` object literal.
fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}
