//! REST request capability for an agent host.
//!
//! # Overview
//! Lets an autonomous agent issue an arbitrary HTTP request (method, URL,
//! JSON headers, JSON body) and get back text it can read: envelope JSON
//! when the server reports success, a plain explanation when it does not.
//!
//! # Design
//! - `executor::build_request` validates input and `executor::parse_response`
//!   normalizes output; both are pure. `RequestExecutor` runs the round-trip
//!   between them through an `HttpTransport`.
//! - `UreqTransport` is the blocking production transport; tests plug in
//!   their own.
//! - `plugin` adapts the executor to the host's lifecycle hooks.

pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod plugin;
pub mod transport;
pub mod types;

pub use config::TransportConfig;
pub use error::{ConfigError, ExecuteError, TransportError};
pub use executor::{build_request, parse_response, RequestExecutor, PARSE_ERROR_PREFIX};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use plugin::{
    Command, CommandArgs, CommandRegistry, Hook, Message, Plugin, PromptGenerator, RestApiPlugin,
};
pub use transport::{HttpTransport, UreqTransport};
pub use types::{FailureReport, ResponseEnvelope};
