//! Error types for the request executor.
//!
//! # Design
//! Only malformed *input* is an error. A remote failure status is reported
//! as a normal return value, and a response body that fails to decode is
//! folded into the returned text. What remains here is the input validation
//! taxonomy, the command-dispatch failures, and transport failures, which
//! are passed through untouched.

use std::error::Error as StdError;

/// Errors returned by `RequestExecutor::execute` and command dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The method is not one of GET, POST, PUT, DELETE, PATCH.
    #[error("Invalid HTTP method '{0}'. Allowed methods: GET, POST, PUT, DELETE, PATCH.")]
    InvalidMethod(String),

    /// The headers argument is not a JSON object of string values.
    #[error("headers must be a JSON object of strings: {0}")]
    MalformedHeaders(#[source] serde_json::Error),

    /// The body argument is not valid JSON.
    #[error("body must be valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// A command invocation did not supply a required argument.
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    /// No command is registered under the requested name.
    #[error("no command registered as '{0}'")]
    UnknownCommand(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A network-level failure: DNS, connect, TLS, timeout, or an unbuildable
/// request. Never raised for an HTTP error status.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError::with_source(err)
    }
}

/// Errors raised while reading plugin configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: expected a positive number of seconds")]
    InvalidTimeout { var: &'static str, value: String },
}
