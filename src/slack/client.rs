//! Slack Web API Request Executor
//!
//! One HTTP round-trip per call with the resolved credentials. Every failure
//! (transport, timeout, non-2xx, undecodable body) collapses to `None` after
//! a diagnostic is logged; callers only ever see "got JSON" or "didn't".

use super::credentials::Credentials;
use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Default Slack Web API base URL
pub const SLACK_API_BASE: &str = "https://slack.com/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack Web API method names used by the tools.
pub mod endpoints {
    pub const AUTH_TEST: &str = "auth.test";
    pub const CHAT_COMMAND: &str = "chat.command";
    pub const CHAT_POST_MESSAGE: &str = "chat.postMessage";
    pub const CONVERSATIONS_HISTORY: &str = "conversations.history";
    pub const CONVERSATIONS_JOIN: &str = "conversations.join";
    pub const CONVERSATIONS_OPEN: &str = "conversations.open";
    pub const CONVERSATIONS_REPLIES: &str = "conversations.replies";
    pub const REACTIONS_ADD: &str = "reactions.add";
    pub const SEARCH_FILES: &str = "search.files";
    pub const SEARCH_MESSAGES: &str = "search.messages";
}

/// Flat key/value request payload.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Error)]
enum RequestError {
    #[error("failed to create HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read response body: {0}")]
    Body(reqwest::Error),

    #[error("response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Executes Slack Web API calls against a configurable base URL.
#[derive(Debug, Clone)]
pub struct SlackClient {
    api_base: String,
}

impl Default for SlackClient {
    fn default() -> Self {
        Self::new(SLACK_API_BASE)
    }
}

impl SlackClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint)
    }

    /// Call `endpoint` once. GET sends the payload as query parameters,
    /// POST as a JSON body. Returns `None` on any failure.
    pub async fn execute(
        &self,
        credentials: &Credentials,
        method: HttpMethod,
        endpoint: &str,
        payload: Option<&Payload>,
    ) -> Option<Value> {
        match self.try_execute(credentials, method, endpoint, payload).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Slack {} {} failed: {}", method_name(method), endpoint, e);
                None
            }
        }
    }

    async fn try_execute(
        &self,
        credentials: &Credentials,
        method: HttpMethod,
        endpoint: &str,
        payload: Option<&Payload>,
    ) -> Result<Value, RequestError> {
        // No pooling: a client lives for exactly one call
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RequestError::Client)?;

        let url = self.endpoint_url(endpoint);
        let http_method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        // Headers go on first so `json()` does not add a second Content-Type
        let mut request = client
            .request(http_method, &url)
            .bearer_auth(credentials.bearer_token())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, credentials.client_identifier())
            .header(COOKIE, format!("d={}", credentials.cookie_value()));

        if let Some(payload) = payload {
            request = match method {
                HttpMethod::Get => request.query(&query_pairs(payload)),
                HttpMethod::Post => request.json(payload),
            };
        }

        tracing::debug!("Slack {} {}", method_name(method), endpoint);

        let response = request.send().await.map_err(RequestError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Status { status, body });
        }

        let body = response.text().await.map_err(RequestError::Body)?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn method_name(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
    }
}

/// Flatten a payload into query parameters. Nulls are dropped.
fn query_pairs(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), rendered))
        })
        .collect()
}

/// True when a Slack response carries `"ok": true`.
pub fn is_ok(response: &Value) -> bool {
    response.get("ok").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn creds() -> Credentials {
        Credentials::new("xoxc-test", "xoxd-test", "test-agent/1.0")
    }

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_post_sends_json_body_and_auth_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat.postMessage")
            .match_header("authorization", "Bearer xoxc-test")
            .match_header("cookie", "d=xoxd-test")
            .match_header("user-agent", "test-agent/1.0")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"channel": "C1", "text": "hi"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true, "ts": "1700000000.000100"}"#)
            .create_async()
            .await;

        let client = SlackClient::new(server.url());
        let body = payload(json!({"channel": "C1", "text": "hi"}));
        let result = client
            .execute(&creds(), HttpMethod::Post, endpoints::CHAT_POST_MESSAGE, Some(&body))
            .await;

        mock.assert_async().await;
        let value = result.unwrap();
        assert!(is_ok(&value));
        assert_eq!(value["ts"], "1700000000.000100");
    }

    #[tokio::test]
    async fn test_get_sends_payload_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "in:#general hello".into()),
                Matcher::UrlEncoded("count".into(), "20".into()),
                Matcher::UrlEncoded("return_dm".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = SlackClient::new(server.url());
        let query = payload(json!({
            "query": "in:#general hello",
            "count": 20,
            "return_dm": true,
            "cursor": null
        }));
        let result = client
            .execute(&creds(), HttpMethod::Get, endpoints::SEARCH_MESSAGES, Some(&query))
            .await;

        mock.assert_async().await;
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_non_success_status_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth.test")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = SlackClient::new(server.url());
        let result = client
            .execute(&creds(), HttpMethod::Post, endpoints::AUTH_TEST, None)
            .await;

        mock.assert_async().await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_non_json_body_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth.test")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = SlackClient::new(server.url());
        let result = client
            .execute(&creds(), HttpMethod::Get, endpoints::AUTH_TEST, None)
            .await;

        mock.assert_async().await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_none() {
        let client = SlackClient::new("http://127.0.0.1:1");
        let result = client
            .execute(&creds(), HttpMethod::Get, endpoints::AUTH_TEST, None)
            .await;
        assert!(result.is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = SlackClient::new("https://slack.com/api/");
        assert_eq!(client.api_base(), "https://slack.com/api");
        assert_eq!(
            client.endpoint_url(endpoints::CONVERSATIONS_JOIN),
            "https://slack.com/api/conversations.join"
        );
    }

    #[test]
    fn test_is_ok() {
        assert!(is_ok(&json!({"ok": true})));
        assert!(!is_ok(&json!({"ok": false, "error": "channel_not_found"})));
        assert!(!is_ok(&json!({"user": "alice"})));
        assert!(!is_ok(&json!({"ok": "true"})));
    }
}
