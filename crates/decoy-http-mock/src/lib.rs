//! In-process test double for an HTTP client's transport layer.
//!
//! Decoy intercepts outgoing requests before they reach a real connection
//! and answers them from an ordered registry of rules, recording every
//! request/outcome pair for later assertions. Nothing touches the network;
//! dispatch runs synchronously on the calling thread.
//!
//! # Example
//!
//! ```
//! use decoy_http_mock::{HeaderMap, Method, MockTransport, Origin, Rule};
//!
//! let mock = MockTransport::new();
//! mock.add(Rule::get("/hello").body("world"));
//!
//! let origin = Origin::http("example.com");
//! let response = mock
//!     .dispatch(&origin, Method::GET, "/hello", None, HeaderMap::new())
//!     .unwrap();
//!
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.text(), "world");
//! assert_eq!(mock.calls().len(), 1);
//! ```
//!
//! Production plumbing depends on the [`Transport`] trait and receives a
//! [`MockTransport`] by injection, or consults [`interception::installed`]
//! when it is wired to the process default; [`MockTransport::activate`]
//! scopes the latter to a test and tears everything down on drop.
//!
//! Unmatched requests come back as
//! [`TransportError::ConnectionRefused`] and still land in the call log, so
//! a missing rule is observable both ways.

pub mod error;
pub mod interception;

mod matcher;
mod registry;
mod request;
mod responder;
mod response;
mod rule;
mod transport;

pub use error::{ActivationError, ConfiguredError, TransportError};
pub use interception::ActivationGuard;
pub use registry::{Call, Outcome};
pub use request::{Origin, Request};
pub use response::Response;
pub use rule::{Any, Callback, MethodMatcher, Payload, Reply, Rule, StatusSpec, UrlPattern};
pub use transport::{MockTransport, Transport};

// Re-exported vocabulary so downstream tests need no direct `http` or
// `bytes` dependency.
pub use bytes::Bytes;
pub use http::{HeaderMap, Method, StatusCode};
