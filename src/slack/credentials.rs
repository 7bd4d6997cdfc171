//! Slack Credential Resolution
//!
//! Slack's web client authenticates with a `xoxc-` bearer token paired with
//! the `d` session cookie (`xoxd-`). Where those come from depends on the
//! transport: a stdio server runs for a single user and reads them from
//! configuration, while the HTTP transport serves many callers and takes
//! them from each request's headers.

use reqwest::header::HeaderMap;
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Header carrying the `xoxc-` web token in HTTP mode
pub const WEB_TOKEN_HEADER: &str = "X-Slack-Web-Token";
/// Header carrying the `xoxd-` cookie token in HTTP mode
pub const COOKIE_TOKEN_HEADER: &str = "X-Slack-Cookie-Token";
/// Optional header overriding the outbound User-Agent in HTTP mode
pub const CLIENT_IDENTIFIER_HEADER: &str = "User-Agent";
/// User-Agent sent when the caller does not supply one
pub const DEFAULT_CLIENT_IDENTIFIER: &str = "MCP-Server/1.0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Header {0} is not valid visible ASCII")]
    InvalidHeader(&'static str),
}

/// Token pair and client identifier used for one tool call.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    bearer_token: String,
    cookie_value: String,
    #[zeroize(skip)]
    client_identifier: String,
}

impl Credentials {
    pub fn new(
        bearer_token: impl Into<String>,
        cookie_value: impl Into<String>,
        client_identifier: impl Into<String>,
    ) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            cookie_value: cookie_value.into(),
            client_identifier: client_identifier.into(),
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn cookie_value(&self) -> &str {
        &self.cookie_value
    }

    pub fn client_identifier(&self) -> &str {
        &self.client_identifier
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &"[REDACTED]")
            .field("cookie_value", &"[REDACTED]")
            .field("client_identifier", &self.client_identifier)
            .finish()
    }
}

/// Inbound request metadata handed to the credential provider.
///
/// Empty for stdio calls; carries the HTTP request headers otherwise.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    headers: HeaderMap,
}

impl RequestMetadata {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    fn header(&self, name: &'static str) -> Result<Option<&str>, CredentialError> {
        match self.headers.get(name) {
            None => Ok(None),
            Some(value) => value
                .to_str()
                .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
                .map_err(|_| CredentialError::InvalidHeader(name)),
        }
    }
}

/// Strategy for selecting the credentials of a call.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self, metadata: &RequestMetadata) -> Result<Credentials, CredentialError>;

    /// Short label for startup logging
    fn source(&self) -> &'static str;
}

/// Process-wide credentials loaded from configuration (stdio mode).
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentials {
    fn resolve(&self, _metadata: &RequestMetadata) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }

    fn source(&self) -> &'static str {
        "configuration"
    }
}

/// Per-request credentials read from HTTP headers (multi-tenant mode).
///
/// Never falls back to process configuration, so concurrent callers cannot
/// end up sharing a token.
#[derive(Debug, Default)]
pub struct HeaderCredentials;

impl CredentialProvider for HeaderCredentials {
    fn resolve(&self, metadata: &RequestMetadata) -> Result<Credentials, CredentialError> {
        let web_token = metadata
            .header(WEB_TOKEN_HEADER)?
            .ok_or(CredentialError::MissingHeader(WEB_TOKEN_HEADER))?;
        let cookie_token = metadata
            .header(COOKIE_TOKEN_HEADER)?
            .ok_or(CredentialError::MissingHeader(COOKIE_TOKEN_HEADER))?;
        let client_identifier = metadata
            .header(CLIENT_IDENTIFIER_HEADER)?
            .unwrap_or(DEFAULT_CLIENT_IDENTIFIER);

        Ok(Credentials::new(web_token, cookie_token, client_identifier))
    }

    fn source(&self) -> &'static str {
        "request headers"
    }
}
