//! Tool Registry
//!
//! Static name → handler table. Each [`ToolKind`] knows its wire name,
//! description and JSON input schema; [`SlackTools::call`] decodes the
//! arguments into the handler's input struct and encodes its return value.

use super::error::{Result, ToolError};
use super::{
    AddReactionInput, CallContext, ChannelHistoryInput, JoinChannelInput, PostCommandInput,
    PostMessageInput, SearchDmsInput, SearchFilesInput, SearchMessagesInput, SendDmInput,
    SlackTools, ThreadByLinkInput, ThreadByTextInput,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GetChannelHistory,
    PostMessage,
    PostCommand,
    AddReaction,
    Whoami,
    JoinChannel,
    SendDm,
    SearchMessages,
    SearchFiles,
    SearchDms,
    GetThreadByLink,
    GetThreadByText,
}

impl ToolKind {
    pub const ALL: [ToolKind; 12] = [
        ToolKind::GetChannelHistory,
        ToolKind::PostMessage,
        ToolKind::PostCommand,
        ToolKind::AddReaction,
        ToolKind::Whoami,
        ToolKind::JoinChannel,
        ToolKind::SendDm,
        ToolKind::SearchMessages,
        ToolKind::SearchFiles,
        ToolKind::SearchDms,
        ToolKind::GetThreadByLink,
        ToolKind::GetThreadByText,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetChannelHistory => "get_channel_history",
            Self::PostMessage => "post_message",
            Self::PostCommand => "post_command",
            Self::AddReaction => "add_reaction",
            Self::Whoami => "whoami",
            Self::JoinChannel => "join_channel",
            Self::SendDm => "send_dm",
            Self::SearchMessages => "search_messages",
            Self::SearchFiles => "search_files",
            Self::SearchDms => "search_dms",
            Self::GetThreadByLink => "get_thread_by_link",
            Self::GetThreadByText => "get_thread_by_text",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GetChannelHistory => "Get the history of a channel.",
            Self::PostMessage => {
                "Post a message to a channel. Joins the channel first. Pass thread_ts \
                 (canonical '1700000000.000100' or permalink '1700000000000100' form) to reply in a thread."
            }
            Self::PostCommand => "Post a slash command (e.g. '/remind') with its text to a channel.",
            Self::AddReaction => "Add an emoji reaction (name without colons) to a message.",
            Self::Whoami => "Checks authentication & identity. Returns the user name.",
            Self::JoinChannel => "Join a channel.",
            Self::SendDm => "Send a direct message to a user.",
            Self::SearchMessages => {
                "Search for messages in the workspace. Supports Slack syntax: 'in:channel-name', \
                 'in:<@UserID>' for DMs with a user, 'is:dm', 'after:2026-01-05'."
            }
            Self::SearchFiles => {
                "Search for files and documents in the workspace, optionally filtered by the \
                 username who shared them and a date."
            }
            Self::SearchDms => "Search direct messages with a specific user.",
            Self::GetThreadByLink => {
                "Get a full thread from a Slack thread link. Returns 'thread_starter' (the original \
                 message) and 'replies'."
            }
            Self::GetThreadByText => {
                "Find a thread by searching a channel for text from its first message and return \
                 'thread_starter' and 'replies'."
            }
        }
    }

    pub fn input_schema(&self) -> Value {
        let count = json!({
            "type": "integer",
            "description": "Number of results to return (max 100, default: 20)",
            "default": 20,
            "minimum": 0
        });
        let limit = json!({
            "type": "integer",
            "description": "Maximum number of messages to return (default: 200)",
            "default": 200,
            "minimum": 0
        });
        let after = json!({
            "type": "string",
            "description": "Optional date filter (e.g. '2026-01-05')",
            "default": ""
        });
        let channel_id = json!({
            "type": "string",
            "description": "Slack channel ID (e.g. 'C12345678')"
        });

        match self {
            Self::GetChannelHistory | Self::JoinChannel => json!({
                "type": "object",
                "properties": { "channel_id": channel_id },
                "required": ["channel_id"]
            }),
            Self::PostMessage => json!({
                "type": "object",
                "properties": {
                    "channel_id": channel_id,
                    "message": { "type": "string", "description": "Message text" },
                    "thread_ts": {
                        "type": "string",
                        "description": "Timestamp of the thread's root message (optional)",
                        "default": ""
                    }
                },
                "required": ["channel_id", "message"]
            }),
            Self::PostCommand => json!({
                "type": "object",
                "properties": {
                    "channel_id": channel_id,
                    "command": { "type": "string", "description": "Slash command, e.g. '/remind'" },
                    "text": { "type": "string", "description": "Command arguments" }
                },
                "required": ["channel_id", "command", "text"]
            }),
            Self::AddReaction => json!({
                "type": "object",
                "properties": {
                    "channel_id": channel_id,
                    "message_ts": { "type": "string", "description": "Timestamp of the message" },
                    "reaction": { "type": "string", "description": "Emoji name, e.g. 'thumbsup'" }
                },
                "required": ["channel_id", "message_ts", "reaction"]
            }),
            Self::Whoami => json!({
                "type": "object",
                "properties": {}
            }),
            Self::SendDm => json!({
                "type": "object",
                "properties": {
                    "user_id": { "type": "string", "description": "Slack user ID (e.g. 'U12345678')" },
                    "message": { "type": "string", "description": "Message text" }
                },
                "required": ["user_id", "message"]
            }),
            Self::SearchMessages => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query (Slack search syntax)" },
                    "sort": {
                        "type": "string",
                        "enum": ["timestamp", "score"],
                        "default": "timestamp"
                    },
                    "count": count
                },
                "required": ["query"]
            }),
            Self::SearchFiles => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query (document title, keywords)" },
                    "user": {
                        "type": "string",
                        "description": "Optional username who shared the file",
                        "default": ""
                    },
                    "after": after,
                    "count": count
                },
                "required": ["query"]
            }),
            Self::SearchDms => json!({
                "type": "object",
                "properties": {
                    "user_id": { "type": "string", "description": "Slack user ID (e.g. 'UG7BN3XAS')" },
                    "query": {
                        "type": "string",
                        "description": "Optional search terms",
                        "default": ""
                    },
                    "after": after,
                    "count": count
                },
                "required": ["user_id"]
            }),
            Self::GetThreadByLink => json!({
                "type": "object",
                "properties": {
                    "thread_link": {
                        "type": "string",
                        "description": "Slack thread URL, e.g. https://workspace.slack.com/archives/C123/p1700000000000100"
                    },
                    "limit": limit
                },
                "required": ["thread_link"]
            }),
            Self::GetThreadByText => json!({
                "type": "object",
                "properties": {
                    "channel_name": {
                        "type": "string",
                        "description": "Channel name to search in (e.g. 'general')"
                    },
                    "message_text": {
                        "type": "string",
                        "description": "Part of or full text from the first message in the thread"
                    },
                    "limit": limit
                },
                "required": ["channel_name", "message_text"]
            }),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

fn parse_input<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

fn encode<T: Serialize>(output: T) -> Result<Value> {
    Ok(serde_json::to_value(output)?)
}

impl SlackTools {
    /// Decode `arguments`, run the handler for `kind`, encode its result.
    pub async fn call(&self, ctx: &CallContext, kind: ToolKind, arguments: Value) -> Result<Value> {
        tracing::debug!("Tool call: {}", kind);

        match kind {
            ToolKind::GetChannelHistory => {
                let input: ChannelHistoryInput = parse_input(arguments)?;
                encode(self.get_channel_history(ctx, input).await)
            }
            ToolKind::PostMessage => {
                let input: PostMessageInput = parse_input(arguments)?;
                encode(self.post_message(ctx, input).await)
            }
            ToolKind::PostCommand => {
                let input: PostCommandInput = parse_input(arguments)?;
                encode(self.post_command(ctx, input).await)
            }
            ToolKind::AddReaction => {
                let input: AddReactionInput = parse_input(arguments)?;
                encode(self.add_reaction(ctx, input).await)
            }
            ToolKind::Whoami => encode(self.whoami(ctx).await),
            ToolKind::JoinChannel => {
                let input: JoinChannelInput = parse_input(arguments)?;
                encode(self.join_channel(ctx, input).await)
            }
            ToolKind::SendDm => {
                let input: SendDmInput = parse_input(arguments)?;
                encode(self.send_dm(ctx, input).await)
            }
            ToolKind::SearchMessages => {
                let input: SearchMessagesInput = parse_input(arguments)?;
                encode(self.search_messages(ctx, input).await)
            }
            ToolKind::SearchFiles => {
                let input: SearchFilesInput = parse_input(arguments)?;
                encode(self.search_files(ctx, input).await)
            }
            ToolKind::SearchDms => {
                let input: SearchDmsInput = parse_input(arguments)?;
                encode(self.search_dms(ctx, input).await)
            }
            ToolKind::GetThreadByLink => {
                let input: ThreadByLinkInput = parse_input(arguments)?;
                encode(self.get_thread_by_link(ctx, input).await)
            }
            ToolKind::GetThreadByText => {
                let input: ThreadByTextInput = parse_input(arguments)?;
                encode(self.get_thread_by_text(ctx, input).await)
            }
        }
    }
}
