//! Result and error types for the core library

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised by every Investec client operation.
///
/// Callers can tell "the bank rejected this" (`Authentication`, `RateLimit`,
/// `Request`) apart from "we could not make sense of the bank's answer or of
/// the caller's input" (`Validation`) and from setup problems (`Config`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {message}")]
    Authentication {
        status: Option<u16>,
        message: String,
    },

    #[error("Rate limit exceeded (HTTP {status_code}), retry after a delay")]
    RateLimit {
        status_code: u16,
        retry_after: Option<Duration>,
        body: Option<String>,
    },

    #[error("Request failed: {message}")]
    Request {
        /// `None` when the request never produced an HTTP response
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an authentication error
    pub fn authentication(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Authentication {
            status,
            message: msg.into(),
        }
    }

    /// Create a transport-level request error (no HTTP response)
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: msg.into(),
            body: None,
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::RateLimit { status_code, .. } => Some(*status_code),
            Self::Request { status, .. } => *status,
            Self::Config(_) | Self::Validation(_) => None,
        }
    }

    /// True for network/timeout failures where no response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request { status: None, .. })
    }

    /// Server-provided retry hint for rate limited requests
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result envelope returned across the tool boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::json!(error_kind(&e)));
                if let Some(status) = e.status_code() {
                    context.insert("statusCode".to_string(), serde_json::json!(status));
                }
                if let Some(retry_after) = e.retry_after() {
                    context.insert(
                        "retryAfterSeconds".to_string(),
                        serde_json::json!(retry_after.as_secs()),
                    );
                }
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}

fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "configuration",
        Error::Authentication { .. } => "authentication",
        Error::RateLimit { .. } => "rate_limit",
        Error::Request { .. } => "request",
        Error::Validation(_) => "validation",
    }
}
