//! Error Types
//!
//! Crate-level error for the MCP protocol layer. Every variant maps onto a
//! JSON-RPC 2.0 error code through [`ErrorCode`].

use crate::tools::ToolError;
use thiserror::Error;

/// JSON-RPC 2.0 error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }
}

#[derive(Debug, Error)]
pub enum SlackMcpError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SlackMcpError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::ParseError,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::MethodNotFound(_) => ErrorCode::MethodNotFound,
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::Tool(ToolError::UnknownTool(_) | ToolError::InvalidInput(_)) => {
                ErrorCode::InvalidParams
            }
            Self::Tool(_) | Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::ParseError.as_i32(), -32700);
        assert_eq!(ErrorCode::InvalidRequest.as_i32(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.as_i32(), -32601);
        assert_eq!(ErrorCode::InvalidParams.as_i32(), -32602);
        assert_eq!(ErrorCode::InternalError.as_i32(), -32603);
    }

    #[test]
    fn test_unknown_tool_is_invalid_params() {
        let err = SlackMcpError::from(ToolError::UnknownTool("nope".into()));
        assert_eq!(err.code(), ErrorCode::InvalidParams);
        assert_eq!(err.to_string(), "Unknown tool: nope");
    }

    #[test]
    fn test_parse_error_code() {
        let err: SlackMcpError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert!(err.to_string().starts_with("Parse error"));
    }
}
