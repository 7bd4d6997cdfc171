//! Slack Web API access
//!
//! Credential selection, the one-shot request executor, and the pure
//! timestamp/permalink helpers the tools build on.

pub mod client;
pub mod credentials;
pub mod timestamp;

pub use client::{HttpMethod, Payload, SLACK_API_BASE, SlackClient, endpoints, is_ok};
pub use credentials::{
    CredentialError, CredentialProvider, Credentials, DEFAULT_CLIENT_IDENTIFIER,
    HeaderCredentials, RequestMetadata, StaticCredentials,
};
pub use timestamp::{LinkError, ThreadLink, normalize_timestamp, parse_thread_link};
