//! The network seam between the executor and an HTTP client library.
//!
//! # Design
//! `HttpTransport` takes a fully validated `HttpRequest` and returns the raw
//! `HttpResponse`. Error statuses are data, not errors: only failures that
//! prevent a response from arriving at all become `TransportError`. Tests
//! substitute in-memory transports; production uses `UreqTransport`.

use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one blocking HTTP round-trip.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    user_agent: Option<String>,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        // 4xx/5xx must come back as responses so the executor can report them.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    fn without_body(
        &self,
        builder: RequestBuilder<WithoutBody>,
        request: &HttpRequest,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = self.apply_headers(builder, request);
        match &request.body {
            Some(body) => builder.force_send_body().send(body.as_bytes()),
            None => builder.call(),
        }
    }

    fn with_body(
        &self,
        builder: RequestBuilder<WithBody>,
        request: &HttpRequest,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = self.apply_headers(builder, request);
        match &request.body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    fn apply_headers<B>(
        &self,
        mut builder: RequestBuilder<B>,
        request: &HttpRequest,
    ) -> RequestBuilder<B> {
        if let Some(user_agent) = &self.user_agent {
            if request.header("user-agent").is_none() {
                builder = builder.header("user-agent", user_agent.as_str());
            }
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let mut response = match request.method {
            HttpMethod::Get => self.without_body(self.agent.get(url), request),
            HttpMethod::Delete => self.without_body(self.agent.delete(url), request),
            HttpMethod::Post => self.with_body(self.agent.post(url), request),
            HttpMethod::Put => self.with_body(self.agent.put(url), request),
            HttpMethod::Patch => self.with_body(self.agent.patch(url), request),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // No size cap: a received body is always handed to the executor.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
