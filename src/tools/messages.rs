//! Posting: messages, slash commands, reactions and direct messages.

use super::{CallContext, SlackTools, payload};
use crate::slack::{HttpMethod, endpoints, is_ok, normalize_timestamp};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageInput {
    pub channel_id: String,
    pub message: String,
    /// Reply into this thread; canonical or permalink form. Empty posts to the channel.
    #[serde(default)]
    pub thread_ts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostCommandInput {
    pub channel_id: String,
    pub command: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddReactionInput {
    pub channel_id: String,
    pub message_ts: String,
    pub reaction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendDmInput {
    pub user_id: String,
    pub message: String,
}

impl SlackTools {
    /// Join the channel, then post. A `thread_ts` that cannot be normalized
    /// fails the call instead of silently posting to the channel root.
    pub async fn post_message(&self, ctx: &CallContext, input: PostMessageInput) -> bool {
        self.audit(
            ctx,
            format!(
                "Posting message to channel <#{}>: {}",
                input.channel_id, input.message
            ),
        )
        .await;

        let thread_ts = if input.thread_ts.is_empty() {
            None
        } else {
            let normalized = normalize_timestamp(&input.thread_ts);
            if normalized.is_empty() {
                tracing::warn!("post_message: unparseable thread_ts {:?}", input.thread_ts);
                return false;
            }
            Some(normalized)
        };

        self.deliver(ctx, &input.channel_id, &input.message, thread_ts.as_deref())
            .await
    }

    /// Join + `chat.postMessage` with no audit. Shared by `post_message` and
    /// the audit log itself.
    pub(super) async fn deliver(
        &self,
        ctx: &CallContext,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> bool {
        // Join failures are expected for DMs and already-joined channels
        self.join(ctx, channel_id).await;

        let mut body = payload(json!({ "channel": channel_id, "text": text }));
        if let Some(ts) = thread_ts {
            body.insert("thread_ts".to_string(), Value::String(ts.to_string()));
        }

        self.request(ctx, HttpMethod::Post, endpoints::CHAT_POST_MESSAGE, Some(body))
            .await
            .is_some_and(|data| is_ok(&data))
    }

    /// Run a slash command in a channel, e.g. `/remind` with its argument text.
    pub async fn post_command(&self, ctx: &CallContext, input: PostCommandInput) -> bool {
        self.audit(
            ctx,
            format!(
                "Posting command to channel <#{}>: {} {}",
                input.channel_id, input.command, input.text
            ),
        )
        .await;

        self.join(ctx, &input.channel_id).await;

        self.request(
            ctx,
            HttpMethod::Post,
            endpoints::CHAT_COMMAND,
            Some(payload(json!({
                "channel": input.channel_id,
                "command": input.command,
                "text": input.text,
            }))),
        )
        .await
        .is_some_and(|data| is_ok(&data))
    }

    pub async fn add_reaction(&self, ctx: &CallContext, input: AddReactionInput) -> bool {
        self.audit(
            ctx,
            format!(
                "Adding reaction to message {} in channel <#{}>: :{}:",
                input.message_ts, input.channel_id, input.reaction
            ),
        )
        .await;

        let timestamp = normalize_timestamp(&input.message_ts);
        if timestamp.is_empty() {
            tracing::warn!("add_reaction: unparseable message_ts {:?}", input.message_ts);
            return false;
        }

        self.request(
            ctx,
            HttpMethod::Post,
            endpoints::REACTIONS_ADD,
            Some(payload(json!({
                "channel": input.channel_id,
                "name": input.reaction,
                "timestamp": timestamp,
            }))),
        )
        .await
        .is_some_and(|data| is_ok(&data))
    }

    /// Open (or look up) the DM conversation with `user_id` and post into it.
    pub async fn send_dm(&self, ctx: &CallContext, input: SendDmInput) -> bool {
        self.audit(
            ctx,
            format!(
                "Sending direct message to user <@{}>: {}",
                input.user_id, input.message
            ),
        )
        .await;

        let opened = self
            .request(
                ctx,
                HttpMethod::Post,
                endpoints::CONVERSATIONS_OPEN,
                Some(payload(json!({ "users": input.user_id, "return_dm": true }))),
            )
            .await;

        let channel_id = match opened {
            Some(data) if is_ok(&data) => data
                .get("channel")
                .and_then(|c| c.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };

        let Some(channel_id) = channel_id else {
            return false;
        };

        self.post_message(
            &ctx.nested(),
            PostMessageInput {
                channel_id,
                message: input.message,
                thread_ts: String::new(),
            },
        )
        .await
    }
}
