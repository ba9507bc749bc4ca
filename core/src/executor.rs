//! Validate, send, and normalize one HTTP request on behalf of an agent.
//!
//! # Design
//! `build_request` and `parse_response` are pure: the first turns the
//! agent's textual arguments into an `HttpRequest`, the second turns an
//! `HttpResponse` into the text handed back to the agent. `RequestExecutor`
//! glues them around a single transport call and holds no other state, so
//! one executor can serve concurrent calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::error::ExecuteError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{HttpTransport, UreqTransport};
use crate::types::{FailureReport, ResponseEnvelope};

/// Prefix of the body text substituted when a response cannot be decoded.
pub const PARSE_ERROR_PREFIX: &str = "Error while parsing response content";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Sends agent-described requests through an `HttpTransport`.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}

impl Default for RequestExecutor {
    fn default() -> Self {
        Self::new(Arc::new(UreqTransport::default()))
    }
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(Arc::new(UreqTransport::new(config)))
    }

    /// Run one request and describe the outcome as text.
    ///
    /// Returns envelope JSON for a success status and a plain explanation
    /// for a failure status. Errors are reserved for bad arguments, which
    /// are rejected before any I/O, and for transport failures.
    pub fn execute(
        &self,
        method: &str,
        url: &str,
        headers: Option<&str>,
        body: Option<&str>,
    ) -> Result<String, ExecuteError> {
        let request = build_request(method, url, headers, body)?;

        debug!(
            method = %request.method,
            url = %request.url,
            body = request.body.as_deref().unwrap_or(""),
            "sending request"
        );
        let response = self.transport.send(&request)?;
        info!(method = %request.method, status = response.status, "request completed");

        Ok(parse_response(response))
    }
}

/// Validate the agent's arguments and assemble the outgoing request.
///
/// Empty `headers`/`body` text is treated the same as an absent one. A body
/// decoding to JSON `null` sends no payload.
pub fn build_request(
    method: &str,
    url: &str,
    headers: Option<&str>,
    body: Option<&str>,
) -> Result<HttpRequest, ExecuteError> {
    let method: HttpMethod = method.parse()?;

    let mut header_list = match non_empty(headers) {
        Some(raw) => decode_headers(raw)?,
        None => Vec::new(),
    };
    let body = match non_empty(body) {
        Some(raw) => decode_body(raw)?,
        None => None,
    };

    if body.is_some()
        && !header_list
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
    {
        header_list.push(("content-type".to_string(), JSON_CONTENT_TYPE.to_string()));
    }

    Ok(HttpRequest {
        method,
        url: url.to_string(),
        headers: header_list,
        body,
    })
}

/// Turn a received response into the text returned to the agent.
pub fn parse_response(response: HttpResponse) -> String {
    let body = decode_message_body(&response);

    if response.is_success() {
        ResponseEnvelope {
            response_status_code: response.status,
            response_message_body: body,
            response_headers: merge_headers(&response.headers),
        }
        .to_json()
    } else {
        FailureReport {
            status: response.status,
            body,
        }
        .to_string()
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn decode_headers(raw: &str) -> Result<Vec<(String, String)>, ExecuteError> {
    let map: BTreeMap<String, String> =
        serde_json::from_str(raw).map_err(ExecuteError::MalformedHeaders)?;
    Ok(map.into_iter().collect())
}

fn decode_body(raw: &str) -> Result<Option<String>, ExecuteError> {
    let value: Value = serde_json::from_str(raw).map_err(ExecuteError::MalformedBody)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(value.to_string()))
}

fn decode_message_body(response: &HttpResponse) -> Value {
    let content_type = response.header("content-type").unwrap_or("");

    let decoded = if content_type.contains(JSON_CONTENT_TYPE) {
        serde_json::from_slice::<Value>(&response.body).map_err(|e| e.to_string())
    } else {
        std::str::from_utf8(&response.body)
            .map(|text| Value::String(text.to_string()))
            .map_err(|e| e.to_string())
    };

    decoded.unwrap_or_else(|reason| {
        warn!(status = response.status, %reason, "could not decode response body");
        Value::String(format!("{PARSE_ERROR_PREFIX}: {reason}"))
    })
}

/// Repeated header names are joined with ", ". Names are kept as the
/// transport reports them; `UreqTransport` yields them lowercased.
fn merge_headers(headers: &[(String, String)]) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        merged
            .entry(name.clone())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a canned response and records every request it sees.
    struct CannedTransport {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, content_type: &str, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse {
                    status,
                    headers: vec![("Content-Type".to_string(), content_type.to_string())],
                    body: body.as_bytes().to_vec(),
                },
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl HttpTransport for CannedTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    struct UnreachableTransport;

    impl HttpTransport for UnreachableTransport {
        fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::new("dns error: no such host"))
        }
    }

    fn envelope(text: &str) -> ResponseEnvelope {
        ResponseEnvelope::from_json(text).unwrap()
    }

    #[test]
    fn build_request_without_headers_or_body() {
        let req = build_request("GET", "http://example.test/items", None, None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://example.test/items");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_treats_empty_text_as_absent() {
        let req = build_request("POST", "http://example.test", Some(""), Some("")).unwrap();
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_adds_json_content_type_for_body() {
        let req = build_request(
            "POST",
            "http://example.test",
            Some(r#"{"Authorization":"Bearer t"}"#),
            Some(r#"{"name": "widget", "qty": 2}"#),
        )
        .unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"name": "widget", "qty": 2}));
    }

    #[test]
    fn build_request_keeps_caller_content_type() {
        let req = build_request(
            "PUT",
            "http://example.test",
            Some(r#"{"Content-Type":"application/merge-patch+json"}"#),
            Some(r#"{"a":1}"#),
        )
        .unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("content-type"), Some("application/merge-patch+json"));
    }

    #[test]
    fn build_request_null_body_sends_nothing() {
        let req = build_request("PATCH", "http://example.test", None, Some("null")).unwrap();
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn build_request_accepts_scalar_body() {
        let req = build_request("POST", "http://example.test", None, Some("42")).unwrap();
        assert_eq!(req.body.as_deref(), Some("42"));
    }

    #[test]
    fn build_request_rejects_headers_that_are_not_string_objects() {
        for raw in ["not json", "[1,2]", r#"{"X-Count": 3}"#] {
            let err = build_request("GET", "http://example.test", Some(raw), None).unwrap_err();
            assert!(matches!(err, ExecuteError::MalformedHeaders(_)), "{raw}");
        }
    }

    #[test]
    fn build_request_rejects_malformed_body() {
        let err = build_request("POST", "http://example.test", None, Some("{oops")).unwrap_err();
        assert!(matches!(err, ExecuteError::MalformedBody(_)));
    }

    #[test]
    fn invalid_method_never_reaches_transport() {
        let transport = CannedTransport::new(200, "application/json", "{}");
        let executor = RequestExecutor::new(transport.clone());
        for method in ["get", "HEAD", "OPTIONS", "FETCH"] {
            let err = executor.execute(method, "http://example.test", None, None).unwrap_err();
            assert!(matches!(err, ExecuteError::InvalidMethod(_)));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn malformed_input_never_reaches_transport() {
        let transport = CannedTransport::new(200, "application/json", "{}");
        let executor = RequestExecutor::new(transport.clone());
        let err = executor
            .execute("GET", "http://example.test", Some("{"), None)
            .unwrap_err();
        assert!(matches!(err, ExecuteError::MalformedHeaders(_)));
        let err = executor
            .execute("POST", "http://example.test", None, Some("]"))
            .unwrap_err();
        assert!(matches!(err, ExecuteError::MalformedBody(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn json_success_is_wrapped_in_envelope() {
        let transport = CannedTransport::new(200, "application/json", r#"{"a":1}"#);
        let executor = RequestExecutor::new(transport.clone());
        let out = executor.execute("GET", "http://example.test", None, None).unwrap();
        let env = envelope(&out);
        assert_eq!(env.response_status_code, 200);
        assert_eq!(env.response_message_body, json!({"a": 1}));
        assert_eq!(
            env.response_headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn json_content_type_with_charset_is_decoded() {
        let transport = CannedTransport::new(201, "application/json; charset=utf-8", "[1,2]");
        let out = RequestExecutor::new(transport)
            .execute("POST", "http://example.test", None, Some("{}"))
            .unwrap();
        assert_eq!(envelope(&out).response_message_body, json!([1, 2]));
    }

    #[test]
    fn text_success_body_is_a_plain_string() {
        let transport = CannedTransport::new(200, "text/plain", "hello");
        let out = RequestExecutor::new(transport)
            .execute("GET", "http://example.test", None, None)
            .unwrap();
        assert_eq!(envelope(&out).response_message_body, json!("hello"));
    }

    #[test]
    fn unparseable_json_becomes_diagnostic_body() {
        let transport = CannedTransport::new(200, "application/json", "{not json");
        let out = RequestExecutor::new(transport)
            .execute("GET", "http://example.test", None, None)
            .unwrap();
        let body = envelope(&out).response_message_body;
        let text = body.as_str().unwrap();
        assert!(text.starts_with(PARSE_ERROR_PREFIX), "{text}");
    }

    #[test]
    fn invalid_utf8_text_becomes_diagnostic_body() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: vec![0xff, 0xfe, 0xfd],
        };
        let env = envelope(&parse_response(response));
        assert!(env.response_message_body.as_str().unwrap().starts_with(PARSE_ERROR_PREFIX));
    }

    #[test]
    fn missing_content_type_is_read_as_text() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: Vec::new(),
        };
        let env = envelope(&parse_response(response));
        assert_eq!(env.response_status_code, 204);
        assert_eq!(env.response_message_body, json!(""));
        assert!(env.response_headers.is_empty());
    }

    #[test]
    fn failure_status_returns_report_with_body() {
        let transport = CannedTransport::new(404, "application/json", r#"{"error":"not found"}"#);
        let out = RequestExecutor::new(transport)
            .execute("GET", "http://example.test/missing", None, None)
            .unwrap();
        assert!(out.contains("404"));
        assert!(out.contains("not found"));
        assert!(ResponseEnvelope::from_json(&out).is_err());
    }

    #[test]
    fn failure_status_without_body_omits_second_sentence() {
        let transport = CannedTransport::new(500, "text/plain", "");
        let out = RequestExecutor::new(transport)
            .execute("DELETE", "http://example.test/1", None, None)
            .unwrap();
        assert_eq!(
            out,
            "The HTTP Request failed with the following HTTP Status Code: 500.\n"
        );
    }

    #[test]
    fn transport_failure_propagates() {
        let executor = RequestExecutor::new(Arc::new(UnreachableTransport));
        let err = executor
            .execute("GET", "http://nowhere.invalid", None, None)
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Transport(_)));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let transport = CannedTransport::new(200, "application/json", r#"{"b":[1,2],"a":null}"#);
        let executor = RequestExecutor::new(transport);
        let first = executor
            .execute("POST", "http://example.test", Some(r#"{"X-Id":"1"}"#), Some("[true]"))
            .unwrap();
        let second = executor
            .execute("POST", "http://example.test", Some(r#"{"X-Id":"1"}"#), Some("[true]"))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn response_header_names_keep_transport_casing() {
        let merged = merge_headers(&[
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("x-lower".to_string(), "1".to_string()),
        ]);
        assert_eq!(merged["Content-Type"], "text/plain");
        assert_eq!(merged["x-lower"], "1");
        assert!(!merged.contains_key("content-type"));
    }

    #[test]
    fn repeated_response_headers_are_joined() {
        let merged = merge_headers(&[
            ("set-cookie".to_string(), "a=1".to_string()),
            ("x-one".to_string(), "1".to_string()),
            ("set-cookie".to_string(), "b=2".to_string()),
        ]);
        assert_eq!(merged["set-cookie"], "a=1, b=2");
        assert_eq!(merged["x-one"], "1");
    }
}
