//! Workspace search: messages, files, and DMs with one user.
//!
//! Queries use Slack's search modifiers (`in:`, `from:`, `after:`), so the
//! helpers here only compose strings; matching happens upstream.

use super::{CallContext, SlackTools, payload};
use crate::slack::{HttpMethod, endpoints, is_ok};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Slack rejects search pages larger than this
pub const MAX_SEARCH_COUNT: u32 = 100;

fn default_count() -> u32 {
    20
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSort {
    #[default]
    Timestamp,
    Score,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Score => "score",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMessagesInput {
    /// Slack search syntax: `in:channel-name`, `in:<@U123>`, `is:dm`, `after:2026-01-05`
    pub query: String,
    #[serde(default)]
    pub sort: SearchSort,
    #[serde(default = "default_count", deserialize_with = "super::saturating_u32")]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchFilesInput {
    pub query: String,
    /// Only files shared by this username
    #[serde(default)]
    pub user: String,
    /// Date filter, e.g. `2026-01-05`
    #[serde(default)]
    pub after: String,
    #[serde(default = "default_count", deserialize_with = "super::saturating_u32")]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDmsInput {
    pub user_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub after: String,
    #[serde(default = "default_count", deserialize_with = "super::saturating_u32")]
    pub count: u32,
}

impl SlackTools {
    pub async fn search_messages(
        &self,
        ctx: &CallContext,
        input: SearchMessagesInput,
    ) -> Vec<Value> {
        let count = input.count.min(MAX_SEARCH_COUNT);
        self.audit(
            ctx,
            format!("Searching for messages: {} (limit: {})", input.query, count),
        )
        .await;

        let data = self
            .request(
                ctx,
                HttpMethod::Get,
                endpoints::SEARCH_MESSAGES,
                Some(payload(json!({
                    "query": input.query,
                    "sort": input.sort.as_str(),
                    "count": count,
                }))),
            )
            .await;

        match data {
            Some(data) if is_ok(&data) => matches_of(&data, "messages"),
            _ => Vec::new(),
        }
    }

    pub async fn search_files(&self, ctx: &CallContext, input: SearchFilesInput) -> Vec<Value> {
        let query = files_query(&input.query, &input.user, &input.after);
        let count = input.count.min(MAX_SEARCH_COUNT);
        self.audit(ctx, format!("Searching files: {} (limit: {})", query, count))
            .await;

        let data = self
            .request(
                ctx,
                HttpMethod::Get,
                endpoints::SEARCH_FILES,
                Some(payload(json!({
                    "query": query,
                    "sort": SearchSort::Timestamp.as_str(),
                    "count": count,
                }))),
            )
            .await;

        match data {
            Some(data) if is_ok(&data) => matches_of(&data, "files"),
            _ => Vec::new(),
        }
    }

    /// Messages exchanged with `user_id`, newest first.
    pub async fn search_dms(&self, ctx: &CallContext, input: SearchDmsInput) -> Vec<Value> {
        self.audit(ctx, format!("Searching DMs with user <@{}>", input.user_id))
            .await;

        self.search_messages(
            &ctx.nested(),
            SearchMessagesInput {
                query: dm_query(&input.user_id, &input.query, &input.after),
                sort: SearchSort::Timestamp,
                count: input.count,
            },
        )
        .await
    }
}

/// `<query>[ from:<user>][ after:<date>]`
pub(crate) fn files_query(query: &str, user: &str, after: &str) -> String {
    let mut composed = query.to_string();
    if !user.is_empty() {
        composed.push_str(&format!(" from:{}", user));
    }
    if !after.is_empty() {
        composed.push_str(&format!(" after:{}", after));
    }
    composed
}

/// `in:<@user_id>[ <query>][ after:<date>]`
pub(crate) fn dm_query(user_id: &str, query: &str, after: &str) -> String {
    let mut composed = format!("in:<@{}>", user_id);
    if !query.is_empty() {
        composed.push_str(&format!(" {}", query));
    }
    if !after.is_empty() {
        composed.push_str(&format!(" after:{}", after));
    }
    composed
}

/// `<section>.matches` of a search response.
pub(super) fn matches_of(data: &Value, section: &str) -> Vec<Value> {
    data.get(section)
        .and_then(|s| s.get("matches"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use mockito::Matcher;
    use rstest::rstest;

    #[rstest]
    #[case("spec", "alice", "2026-01-05", "spec from:alice after:2026-01-05")]
    #[case("spec", "", "", "spec")]
    #[case("roadmap", "bob", "", "roadmap from:bob")]
    #[case("roadmap", "", "2026-01-05", "roadmap after:2026-01-05")]
    fn test_files_query(
        #[case] query: &str,
        #[case] user: &str,
        #[case] after: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(files_query(query, user, after), expected);
    }

    #[rstest]
    #[case("UG7BN3XAS", "", "", "in:<@UG7BN3XAS>")]
    #[case("UG7BN3XAS", "deploy", "", "in:<@UG7BN3XAS> deploy")]
    #[case("UG7BN3XAS", "deploy", "2026-01-05", "in:<@UG7BN3XAS> deploy after:2026-01-05")]
    #[case("UG7BN3XAS", "", "2026-01-05", "in:<@UG7BN3XAS> after:2026-01-05")]
    fn test_dm_query(
        #[case] user_id: &str,
        #[case] query: &str,
        #[case] after: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(dm_query(user_id, query, after), expected);
    }

    #[test]
    fn test_input_defaults() {
        let input: SearchMessagesInput =
            serde_json::from_value(json!({ "query": "hello" })).unwrap();
        assert_eq!(input.sort, SearchSort::Timestamp);
        assert_eq!(input.count, 20);

        let input: SearchMessagesInput =
            serde_json::from_value(json!({ "query": "hello", "sort": "score" })).unwrap();
        assert_eq!(input.sort, SearchSort::Score);
    }

    #[test]
    fn test_unknown_sort_rejected() {
        let parsed: Result<SearchMessagesInput, _> =
            serde_json::from_value(json!({ "query": "hello", "sort": "relevance" }));
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_search_messages_clamps_count() {
        let mut server = mockito::Server::new_async().await;
        let audit = server
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::PartialJson(json!({
                "channel": AUDIT_CHANNEL,
                "text": "Searching for messages: deploy (limit: 100)"
            })))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;
        let search = server
            .mock("GET", "/search.messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "deploy".into()),
                Matcher::UrlEncoded("sort".into(), "score".into()),
                Matcher::UrlEncoded("count".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"ok": true, "messages": {"matches": [{"ts": "1.0"}, {"ts": "2.0"}]}}"#)
            .create_async()
            .await;

        let matches = tools(&server)
            .search_messages(
                &ctx(),
                SearchMessagesInput {
                    query: "deploy".into(),
                    sort: SearchSort::Score,
                    count: 500,
                },
            )
            .await;

        audit.assert_async().await;
        search.assert_async().await;
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_search_files_composes_query() {
        let mut server = mockito::Server::new_async().await;
        let _audit = audit_mock(&mut server, 1).await;
        let search = server
            .mock("GET", "/search.files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "spec from:alice after:2026-01-05".into()),
                Matcher::UrlEncoded("sort".into(), "timestamp".into()),
                Matcher::UrlEncoded("count".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"ok": true, "files": {"matches": [{"title": "Spec v2"}]}}"#)
            .create_async()
            .await;

        let files = tools(&server)
            .search_files(
                &ctx(),
                SearchFilesInput {
                    query: "spec".into(),
                    user: "alice".into(),
                    after: "2026-01-05".into(),
                    count: 20,
                },
            )
            .await;

        search.assert_async().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["title"], "Spec v2");
    }

    #[tokio::test]
    async fn test_search_dms_delegates_without_second_audit() {
        let mut server = mockito::Server::new_async().await;
        let audit = audit_mock(&mut server, 1).await;
        let search = server
            .mock("GET", "/search.messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "in:<@U1> lunch".into()),
                Matcher::UrlEncoded("sort".into(), "timestamp".into()),
                Matcher::UrlEncoded("count".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"ok": true, "messages": {"matches": [{"text": "lunch?"}]}}"#)
            .create_async()
            .await;

        let matches = tools(&server)
            .search_dms(
                &ctx(),
                SearchDmsInput {
                    user_id: "U1".into(),
                    query: "lunch".into(),
                    after: String::new(),
                    count: 5,
                },
            )
            .await;

        audit.assert_async().await;
        search.assert_async().await;
        assert_eq!(matches[0]["text"], "lunch?");
    }

    #[tokio::test]
    async fn test_search_failures_are_empty() {
        let tools = SlackTools::new(crate::slack::SlackClient::new("http://127.0.0.1:1"), "CLOGS");
        let ctx = ctx();
        assert!(
            tools
                .search_messages(
                    &ctx,
                    SearchMessagesInput {
                        query: "x".into(),
                        sort: SearchSort::Timestamp,
                        count: 20,
                    },
                )
                .await
                .is_empty()
        );
        assert!(
            tools
                .search_files(
                    &ctx,
                    SearchFilesInput {
                        query: "x".into(),
                        user: String::new(),
                        after: String::new(),
                        count: 20,
                    },
                )
                .await
                .is_empty()
        );
        assert!(
            tools
                .search_dms(
                    &ctx,
                    SearchDmsInput {
                        user_id: "U1".into(),
                        query: String::new(),
                        after: String::new(),
                        count: 20,
                    },
                )
                .await
                .is_empty()
        );
    }
}
