//! Error taxonomy for the communication layer.
//!
//! Every error carries the originating component and operation name plus the
//! correlation id of the request it belongs to, so failures can be traced
//! across services.

use thiserror::Error;

/// Errors produced by the resolver, executor factory, and validator.
#[derive(Debug, Error)]
pub enum CommError {
    /// A required configuration field is absent (backend url, discovery name).
    #[error("{component}.{operation} [{correlation_id}]: invalid configuration: {detail}")]
    Config {
        component: &'static str,
        operation: &'static str,
        correlation_id: String,
        detail: String,
    },

    /// The discovery provider reported failure or returned a malformed result.
    #[error("{component}.{operation} [{correlation_id}]: discovery failed: {detail}")]
    Discovery {
        component: &'static str,
        operation: &'static str,
        correlation_id: String,
        detail: String,
    },

    /// HTTP 401 from the backend.
    #[error("{component}.{operation} [{correlation_id}]: Invalid authorization")]
    Auth {
        component: &'static str,
        operation: &'static str,
        correlation_id: String,
    },

    /// HTTP 404 from the backend.
    #[error("{component}.{operation} [{correlation_id}]: Resource not found")]
    NotFound {
        component: &'static str,
        operation: &'static str,
        correlation_id: String,
    },

    /// Any other non-200 status.
    #[error("{component}.{operation} [{correlation_id}]: Not valid response (status {status})")]
    Validation {
        component: &'static str,
        operation: &'static str,
        correlation_id: String,
        status: u16,
    },

    /// The transport itself failed (connect error, timeout, status outside
    /// the accepted window).
    #[error("{component}.{operation} [{correlation_id}]: transport error: {detail}")]
    Transport {
        component: &'static str,
        operation: &'static str,
        correlation_id: String,
        detail: String,
        #[source]
        source: Option<reqwest::Error>,
    },
}

impl CommError {
    pub fn config(
        component: &'static str,
        operation: &'static str,
        correlation_id: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self::Config {
            component,
            operation,
            correlation_id: correlation_id.to_string(),
            detail: detail.into(),
        }
    }

    pub fn discovery(
        component: &'static str,
        operation: &'static str,
        correlation_id: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self::Discovery {
            component,
            operation,
            correlation_id: correlation_id.to_string(),
            detail: detail.into(),
        }
    }

    pub fn auth(component: &'static str, operation: &'static str, correlation_id: &str) -> Self {
        Self::Auth {
            component,
            operation,
            correlation_id: correlation_id.to_string(),
        }
    }

    pub fn not_found(
        component: &'static str,
        operation: &'static str,
        correlation_id: &str,
    ) -> Self {
        Self::NotFound {
            component,
            operation,
            correlation_id: correlation_id.to_string(),
        }
    }

    pub fn validation(
        component: &'static str,
        operation: &'static str,
        correlation_id: &str,
        status: u16,
    ) -> Self {
        Self::Validation {
            component,
            operation,
            correlation_id: correlation_id.to_string(),
            status,
        }
    }

    pub fn transport(
        component: &'static str,
        operation: &'static str,
        correlation_id: &str,
        detail: impl Into<String>,
        source: Option<reqwest::Error>,
    ) -> Self {
        Self::Transport {
            component,
            operation,
            correlation_id: correlation_id.to_string(),
            detail: detail.into(),
            source,
        }
    }

    /// The correlation id this error was raised under.
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Config { correlation_id, .. }
            | Self::Discovery { correlation_id, .. }
            | Self::Auth { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Validation { correlation_id, .. }
            | Self::Transport { correlation_id, .. } => correlation_id,
        }
    }
}
