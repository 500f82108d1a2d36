//! The transport seam and its mock implementation.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::matcher;
use crate::registry::{Call, Outcome, Registry};
use crate::request::{Origin, Request};
use crate::responder;
use crate::response::Response;
use crate::rule::{MethodMatcher, Reply, Rule, UrlPattern};

/// The single request-execution entry point production plumbing depends on.
///
/// A real implementation performs network I/O; [`MockTransport`] answers
/// from registered rules instead. Code under test receives a
/// `dyn Transport` (or consults [`crate::interception::installed`]) rather
/// than opening connections itself.
pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> Result<Response, TransportError>;
}

/// In-memory stand-in for the transport entry point: ordered rules, a call
/// log, and no network.
///
/// Cloning yields another handle to the same registry and call log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    registry: Mutex<Registry>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Registration order is matching priority; rules are
    /// immutable once added.
    pub fn add(&self, rule: Rule) {
        self.inner.registry.lock().add(rule);
    }

    /// Append a computed rule.
    pub fn add_callback(
        &self,
        method: impl Into<MethodMatcher>,
        pattern: impl Into<UrlPattern>,
        callback: impl Fn(&Request) -> Reply + Send + Sync + 'static,
    ) {
        self.add(Rule::with_callback(method, pattern, callback));
    }

    /// Ordered snapshot of every intercepted call so far, matched or not.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.registry.lock().calls().to_vec()
    }

    pub fn rule_count(&self) -> usize {
        self.inner.registry.lock().rules().len()
    }

    /// Drop all rules and recorded calls.
    pub fn reset(&self) {
        self.inner.registry.lock().reset();
    }

    /// Build the [`Request`] from the entry-point arguments plus the
    /// connection origin, then execute it.
    pub fn dispatch(
        &self,
        origin: &Origin,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: HeaderMap,
    ) -> Result<Response, TransportError> {
        self.execute(Request::new(origin, method, url, body, headers))
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        debug!("intercepted {} {}", request.method, request.url);

        // Clone the matched rule out so user callbacks run without the lock.
        let matched = {
            let registry = self.inner.registry.lock();
            matcher::find_match(registry.rules(), &request).cloned()
        };

        let Some(rule) = matched else {
            let err = TransportError::ConnectionRefused {
                method: request.method.clone(),
                url: request.url.clone(),
            };
            debug!("no rule matched {} {}", request.method, request.url);
            self.inner
                .registry
                .lock()
                .record(request, Outcome::Error(err.clone()));
            return Err(err);
        };

        match responder::respond(&rule, &request) {
            Err(configured) => {
                let err = TransportError::Configured(configured);
                self.inner
                    .registry
                    .lock()
                    .record(request, Outcome::Error(err.clone()));
                Err(err)
            }
            Ok(resolved) => {
                let response = Response::new(
                    resolved.status,
                    resolved.reason,
                    resolved.headers,
                    resolved.body,
                );
                self.inner
                    .registry
                    .lock()
                    .record(request, Outcome::Response(response.clone()));
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Any;
    use http::StatusCode;

    fn origin() -> Origin {
        Origin::http("example.com")
    }

    fn get(mock: &MockTransport, url: &str) -> Result<Response, TransportError> {
        mock.dispatch(&origin(), Method::GET, url, None, HeaderMap::new())
    }

    #[test]
    fn test_matched_dispatch_returns_and_records() {
        let mock = MockTransport::new();
        mock.add(Rule::get("/").body("hi"));

        let response = get(&mock, "/?a=1").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), "hi");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request.url, "/?a=1");
        let recorded = calls[0].outcome.response().unwrap();
        assert_eq!(recorded.status(), StatusCode::OK);
    }

    #[test]
    fn test_unmatched_dispatch_errors_and_records() {
        let mock = MockTransport::new();

        let err = get(&mock, "/missing").unwrap_err();
        assert!(err.is_connection_refused());
        assert_eq!(err.to_string(), "connection refused: GET /missing");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request.url, "/missing");
        let recorded = calls[0].outcome.error().unwrap();
        assert_eq!(recorded.to_string(), err.to_string());
    }

    #[test]
    fn test_error_body_is_raised_not_responded() {
        let mock = MockTransport::new();
        mock.add_callback(Method::GET, "/", |_| {
            Reply::new(400)
                .header("k", "v")
                .failing(anyhow::anyhow!("configured failure"))
        });

        let err = get(&mock, "/").unwrap_err();
        assert!(matches!(err, TransportError::Configured(_)));
        assert_eq!(err.to_string(), "configured failure");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].outcome.is_error());
    }

    #[test]
    fn test_every_call_appends_exactly_once() {
        let mock = MockTransport::new();
        mock.add(Rule::get("/ok"));
        mock.add(Rule::get("/fail").failing(anyhow::anyhow!("down")));

        let _ = get(&mock, "/ok");
        let _ = get(&mock, "/missing");
        let _ = get(&mock, "/fail");
        let _ = get(&mock, "/ok");

        assert_eq!(mock.calls().len(), 4);
    }

    #[test]
    fn test_first_registration_wins_on_overlap() {
        let mock = MockTransport::new();
        mock.add(Rule::get("/p").body("first"));
        mock.add(Rule::new(Any, "/p").body("second"));

        let response = get(&mock, "/p").unwrap();
        assert_eq!(response.text(), "first");
    }

    #[test]
    fn test_reset_clears_rules_and_calls() {
        let mock = MockTransport::new();
        mock.add(Rule::get("/"));
        let _ = get(&mock, "/");
        assert_eq!(mock.rule_count(), 1);
        assert_eq!(mock.calls().len(), 1);

        mock.reset();
        assert_eq!(mock.rule_count(), 0);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let mock = MockTransport::new();
        let handle = mock.clone();
        handle.add(Rule::get("/"));

        let _ = get(&mock, "/");
        assert_eq!(handle.calls().len(), 1);
    }

    #[test]
    fn test_callback_can_reenter_the_transport() {
        // The registry lock is not held across callbacks, so a callback may
        // issue its own mock request; both calls land in the log in order.
        let mock = MockTransport::new();
        let inner = mock.clone();
        mock.add(Rule::get("/inner").body("deep"));
        mock.add_callback(Method::GET, "/outer", move |_| {
            let nested = inner
                .dispatch(
                    &Origin::http("example.com"),
                    Method::GET,
                    "/inner",
                    None,
                    HeaderMap::new(),
                )
                .unwrap();
            Reply::new(200).body(nested.text().into_owned())
        });

        let response = get(&mock, "/outer").unwrap();
        assert_eq!(response.text(), "deep");

        let urls: Vec<_> = mock
            .calls()
            .iter()
            .map(|call| call.request.url.clone())
            .collect();
        assert_eq!(urls, vec!["/inner", "/outer"]);
    }
}
