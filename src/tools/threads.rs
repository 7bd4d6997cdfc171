//! Thread resolution: from a shareable link, or from the text of its first
//! message. Both end in a `conversations.replies` fetch whose first message
//! is the thread starter.

use super::channels::messages_of;
use super::search::matches_of;
use super::{CallContext, SlackTools, payload};
use crate::slack::{HttpMethod, Payload, endpoints, is_ok, normalize_timestamp, parse_thread_link};
use crate::utils::preview;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

fn default_limit() -> u32 {
    200
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadByLinkInput {
    pub thread_link: String,
    #[serde(default = "default_limit", deserialize_with = "super::saturating_u32")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadByTextInput {
    /// Channel name as used by `in:` (e.g. `general`)
    pub channel_name: String,
    /// Part of or all of the thread's first message
    pub message_text: String,
    #[serde(default = "default_limit", deserialize_with = "super::saturating_u32")]
    pub limit: u32,
}

/// What a link-based fetch saw, returned alongside a fetch failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadDebug {
    pub channel_id: String,
    pub thread_ts: String,
    pub message_ts_raw: String,
    pub had_thread_ts_in_url: bool,
    pub api_payload: Payload,
    pub api_response: Option<Value>,
}

/// A resolved thread, or the reason resolution stopped.
///
/// Failures always carry `thread_starter: null` (unless a search match is
/// already known) and an empty `replies` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ThreadDebug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    pub thread_starter: Option<Value>,
    pub replies: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_messages: Option<usize>,
}

impl ThreadReport {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            debug: None,
            channel_id: None,
            thread_ts: None,
            thread_starter: None,
            replies: Vec::new(),
            total_messages: None,
        }
    }

    fn with_debug(mut self, debug: ThreadDebug) -> Self {
        self.debug = Some(debug);
        self
    }

    fn with_starter(mut self, starter: Value) -> Self {
        self.thread_starter = Some(starter);
        self
    }

    /// Split `conversations.replies` output into starter and replies.
    fn from_messages(mut messages: Vec<Value>, fallback_starter: Option<Value>) -> Self {
        let total_messages = messages.len();
        let (thread_starter, replies) = if messages.is_empty() {
            (fallback_starter, Vec::new())
        } else {
            let starter = messages.remove(0);
            (Some(starter), messages)
        };

        Self {
            error: None,
            debug: None,
            channel_id: None,
            thread_ts: None,
            thread_starter,
            replies,
            total_messages: Some(total_messages),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl SlackTools {
    pub async fn get_thread_by_link(
        &self,
        ctx: &CallContext,
        input: ThreadByLinkInput,
    ) -> ThreadReport {
        // Malformed links are rejected before anything goes over the wire
        let link = match parse_thread_link(&input.thread_link) {
            Ok(link) => link,
            Err(e) => {
                tracing::debug!("get_thread_by_link: {}: {}", e, input.thread_link);
                return ThreadReport::failure(e.to_string());
            }
        };

        self.audit(ctx, format!("Fetching thread from link: {}", input.thread_link))
            .await;

        let replies_payload = replies_payload(&link.channel_id, &link.thread_ts, input.limit);
        let data = self
            .request(
                ctx,
                HttpMethod::Get,
                endpoints::CONVERSATIONS_REPLIES,
                Some(replies_payload.clone()),
            )
            .await;

        let messages = match data {
            Some(data) if is_ok(&data) => messages_of(&data),
            other => {
                let reason = other
                    .as_ref()
                    .map(|d| {
                        d.get("error")
                            .and_then(Value::as_str)
                            .unwrap_or("Unknown error")
                            .to_string()
                    })
                    .unwrap_or_else(|| "Request failed".to_string());

                return ThreadReport::failure(format!("Failed to fetch thread: {}", reason))
                    .with_debug(ThreadDebug {
                        channel_id: link.channel_id,
                        thread_ts: link.thread_ts,
                        message_ts_raw: link.message_ts_raw,
                        had_thread_ts_in_url: link.is_reply,
                        api_payload: replies_payload,
                        api_response: other,
                    });
            }
        };

        let mut report = ThreadReport::from_messages(messages, None);
        report.channel_id = Some(link.channel_id);
        report.thread_ts = Some(link.thread_ts);
        report
    }

    pub async fn get_thread_by_text(
        &self,
        ctx: &CallContext,
        input: ThreadByTextInput,
    ) -> ThreadReport {
        self.audit(
            ctx,
            format!(
                "Searching for thread in #{} containing: {}...",
                input.channel_name,
                preview(&input.message_text, 50)
            ),
        )
        .await;

        let search = self
            .request(
                ctx,
                HttpMethod::Get,
                endpoints::SEARCH_MESSAGES,
                Some(payload(json!({
                    "query": format!("in:{} {}", input.channel_name, input.message_text),
                    "sort": "timestamp",
                }))),
            )
            .await;

        let matches = match search {
            Some(data) if is_ok(&data) => matches_of(&data, "messages"),
            _ => return ThreadReport::failure("Search failed"),
        };

        let Some(first) = matches.into_iter().next() else {
            return ThreadReport::failure("No messages found matching the text");
        };

        let thread_ts = non_empty_str(&first, "thread_ts")
            .or_else(|| non_empty_str(&first, "ts"))
            .map(normalize_timestamp)
            .filter(|ts| !ts.is_empty());
        let Some(thread_ts) = thread_ts else {
            return ThreadReport::failure("Could not determine thread timestamp");
        };

        let channel_id = first
            .get("channel")
            .and_then(|c| c.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let Some(channel_id) = channel_id else {
            return ThreadReport::failure("Could not determine channel ID");
        };

        let data = self
            .request(
                ctx,
                HttpMethod::Get,
                endpoints::CONVERSATIONS_REPLIES,
                Some(replies_payload(&channel_id, &thread_ts, input.limit)),
            )
            .await;

        match data {
            Some(data) if is_ok(&data) => ThreadReport::from_messages(messages_of(&data), Some(first)),
            _ => ThreadReport::failure("Failed to fetch thread replies").with_starter(first),
        }
    }
}

fn replies_payload(channel_id: &str, thread_ts: &str, limit: u32) -> Payload {
    payload(json!({
        "channel": channel_id,
        "ts": thread_ts,
        "limit": limit,
    }))
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
