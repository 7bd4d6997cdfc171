//! Slack Timestamp & Link Parsing
//!
//! Slack identifies messages by a `"<seconds>.<micros>"` timestamp string.
//! Shareable permalinks carry the same value with the dot removed
//! (`/p1700000000123456`), and links to a reply additionally carry the
//! root's timestamp in a `thread_ts` query parameter.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static CANONICAL_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("valid canonical ts regex"));
static PERMALINK_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{16}$").expect("valid permalink ts regex"));
static LINK_CHANNEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/archives/([A-Z0-9]+)/").expect("valid channel regex"));
static LINK_MESSAGE_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/p([0-9]+)").expect("valid message ts regex"));
static LINK_THREAD_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"thread_ts=([0-9]+\.[0-9]+)").expect("valid thread ts regex"));

/// Convert a loosely formatted timestamp into Slack's canonical form.
///
/// Returns the input unchanged when it is already canonical, splits a
/// 16-digit permalink value into seconds and microseconds, and returns an
/// empty string for anything else. Only ASCII digits are accepted.
pub fn normalize_timestamp(ts: &str) -> String {
    if CANONICAL_TS.is_match(ts) {
        return ts.to_string();
    }
    if PERMALINK_TS.is_match(ts) {
        return format!("{}.{}", &ts[..10], &ts[10..]);
    }
    String::new()
}

/// Why a thread link could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Could not extract channel ID from link")]
    MissingChannel,

    #[error("Could not extract message timestamp from link")]
    MissingMessageTs,

    #[error("Could not determine thread timestamp")]
    UnresolvedThreadTs,
}

/// A thread reference extracted from a shareable Slack link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLink {
    pub channel_id: String,
    /// The `p`-value exactly as it appeared in the link
    pub message_ts_raw: String,
    /// Canonical timestamp of the thread's root message
    pub thread_ts: String,
    /// True when the link pointed at a reply (`?thread_ts=` was present)
    pub is_reply: bool,
}

/// Parse `https://<workspace>.slack.com/archives/<CHANNEL>/p<TS>[?thread_ts=<ROOT>]`.
pub fn parse_thread_link(link: &str) -> Result<ThreadLink, LinkError> {
    let channel_id = LINK_CHANNEL
        .captures(link)
        .map(|c| c[1].to_string())
        .ok_or(LinkError::MissingChannel)?;

    let message_ts_raw = LINK_MESSAGE_TS
        .captures(link)
        .map(|c| c[1].to_string())
        .ok_or(LinkError::MissingMessageTs)?;

    let explicit_root = LINK_THREAD_TS.captures(link).map(|c| c[1].to_string());
    let is_reply = explicit_root.is_some();

    let thread_ts = match explicit_root {
        Some(root) => root,
        None => normalize_timestamp(&message_ts_raw),
    };
    if thread_ts.is_empty() {
        return Err(LinkError::UnresolvedThreadTs);
    }

    Ok(ThreadLink {
        channel_id,
        message_ts_raw,
        thread_ts,
        is_reply,
    })
}
