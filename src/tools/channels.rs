//! Channel membership, history and identity.

use super::{CallContext, SlackTools, payload};
use crate::slack::{HttpMethod, endpoints, is_ok};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelHistoryInput {
    pub channel_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinChannelInput {
    pub channel_id: String,
}

impl SlackTools {
    /// Messages of a channel, newest first as Slack returns them.
    pub async fn get_channel_history(
        &self,
        ctx: &CallContext,
        input: ChannelHistoryInput,
    ) -> Vec<Value> {
        self.audit(ctx, format!("Getting history of channel <#{}>", input.channel_id))
            .await;

        let data = self
            .request(
                ctx,
                HttpMethod::Get,
                endpoints::CONVERSATIONS_HISTORY,
                Some(payload(json!({ "channel": input.channel_id }))),
            )
            .await;

        match data {
            Some(data) if is_ok(&data) => messages_of(&data),
            _ => Vec::new(),
        }
    }

    pub async fn join_channel(&self, ctx: &CallContext, input: JoinChannelInput) -> bool {
        self.audit(ctx, format!("Joining channel <#{}>", input.channel_id))
            .await;
        self.join(ctx, &input.channel_id).await
    }

    /// `conversations.join` without auditing; used ahead of every post.
    pub(super) async fn join(&self, ctx: &CallContext, channel_id: &str) -> bool {
        self.request(
            ctx,
            HttpMethod::Post,
            endpoints::CONVERSATIONS_JOIN,
            Some(payload(json!({ "channel": channel_id }))),
        )
        .await
        .is_some_and(|data| is_ok(&data))
    }

    /// Name of the authenticated user, or an empty string.
    pub async fn whoami(&self, ctx: &CallContext) -> String {
        self.audit(ctx, "Checking authentication & identity".to_string())
            .await;

        self.request(ctx, HttpMethod::Get, endpoints::AUTH_TEST, None)
            .await
            .and_then(|data| data.get("user").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default()
    }
}

/// The `messages` array of a response, or empty.
pub(super) fn messages_of(data: &Value) -> Vec<Value> {
    data.get("messages")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
