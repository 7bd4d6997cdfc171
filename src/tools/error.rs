//! Tool Error Types

use crate::slack::CredentialError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

/// Failures that reach the caller of a tool.
///
/// Slack-side failures are not represented here: handlers turn those into
/// their empty/false/error-object defaults.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Credential lookup failed: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_error_converts() {
        let err: ToolError = CredentialError::MissingHeader("X-Slack-Web-Token").into();
        assert_eq!(
            err.to_string(),
            "Credential lookup failed: Missing required header: X-Slack-Web-Token"
        );
    }
}
