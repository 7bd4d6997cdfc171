//! Per-call execution context.
//!
//! A tool invoked by the client runs in a top-level context and writes one
//! audit line to the logs channel. When a handler delegates to another
//! handler (DM → post, DM search → message search) it passes a nested
//! context so the inner call stays silent.

use crate::slack::Credentials;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallScope {
    TopLevel,
    Nested,
}

#[derive(Debug, Clone)]
pub struct CallContext {
    credentials: Arc<Credentials>,
    scope: CallScope,
}

impl CallContext {
    pub fn top_level(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
            scope: CallScope::TopLevel,
        }
    }

    /// Same credentials, audit suppressed.
    pub fn nested(&self) -> Self {
        Self {
            credentials: Arc::clone(&self.credentials),
            scope: CallScope::Nested,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn scope(&self) -> CallScope {
        self.scope
    }

    pub fn is_top_level(&self) -> bool {
        self.scope == CallScope::TopLevel
    }
}
