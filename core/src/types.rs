//! Result shapes returned to the agent.
//!
//! # Design
//! The message body is a `serde_json::Value` because its shape is defined by
//! the remote server, not by this crate. Text bodies and decode diagnostics
//! are carried as `Value::String`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured result of a request that completed with a success status.
///
/// `response_headers` keys are lowercase when the response came through
/// `UreqTransport`, whatever casing the server used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub response_status_code: u16,
    pub response_message_body: Value,
    pub response_headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    /// Serialize to compact JSON text.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "response_status_code": self.response_status_code,
            "response_message_body": self.response_message_body,
            "response_headers": self.response_headers,
        })
        .to_string()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Explanation handed back when the server answered with a failure status.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    pub status: u16,
    pub body: Value,
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "The HTTP Request failed with the following HTTP Status Code: {}.",
            self.status
        )?;
        if has_content(&self.body) {
            write!(
                f,
                "In addition, the API returned the following response. \
                 Please use this information to debug the issue: {}",
                render(&self.body)
            )?;
        }
        Ok(())
    }
}

/// Empty strings, empty containers, null, false and zero carry no content.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
