//! Registered expectations: what to match and what to answer.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use regex::Regex;

use crate::error::ConfiguredError;
use crate::request::Request;

/// Wildcard sentinel accepted in place of a literal method or URL pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Any;

/// Method predicate of a rule.
#[derive(Debug, Clone)]
pub enum MethodMatcher {
    Any,
    Exact(Method),
}

impl MethodMatcher {
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(expected) => expected == method,
        }
    }
}

impl From<Method> for MethodMatcher {
    fn from(method: Method) -> Self {
        MethodMatcher::Exact(method)
    }
}

impl From<Any> for MethodMatcher {
    fn from(_: Any) -> Self {
        MethodMatcher::Any
    }
}

impl From<&str> for MethodMatcher {
    /// # Panics
    ///
    /// Panics if `method` is not a valid HTTP method token.
    fn from(method: &str) -> Self {
        let parsed = Method::from_bytes(method.as_bytes())
            .unwrap_or_else(|_| panic!("invalid HTTP method: {method:?}"));
        MethodMatcher::Exact(parsed)
    }
}

/// URL predicate of a rule.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Matches every URL.
    Any,
    /// Exact path (+ optional query) string.
    Exact(String),
    /// Unanchored regular-expression search over the whole URL.
    Regex(Regex),
}

impl From<&str> for UrlPattern {
    fn from(url: &str) -> Self {
        UrlPattern::Exact(url.to_string())
    }
}

impl From<String> for UrlPattern {
    fn from(url: String) -> Self {
        UrlPattern::Exact(url)
    }
}

impl From<Regex> for UrlPattern {
    fn from(re: Regex) -> Self {
        UrlPattern::Regex(re)
    }
}

impl From<Any> for UrlPattern {
    fn from(_: Any) -> Self {
        UrlPattern::Any
    }
}

/// Response status: a bare code, or a full `"code reason"` line whose reason
/// text is used verbatim.
#[derive(Debug, Clone)]
pub enum StatusSpec {
    Code(u16),
    Line(String),
}

impl Default for StatusSpec {
    fn default() -> Self {
        StatusSpec::Code(200)
    }
}

impl From<u16> for StatusSpec {
    fn from(code: u16) -> Self {
        StatusSpec::Code(code)
    }
}

impl From<StatusCode> for StatusSpec {
    fn from(status: StatusCode) -> Self {
        StatusSpec::Code(status.as_u16())
    }
}

impl From<&str> for StatusSpec {
    fn from(line: &str) -> Self {
        StatusSpec::Line(line.to_string())
    }
}

impl From<String> for StatusSpec {
    fn from(line: String) -> Self {
        StatusSpec::Line(line)
    }
}

/// Body of a canned reply: text encoded at respond time, raw bytes passed
/// through, or an error returned to the caller instead of any response.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Bytes(Bytes),
    Error(ConfiguredError),
}

impl Payload {
    /// An error payload; dispatching a rule with this body returns the error
    /// to the caller in place of a response.
    pub fn error(err: impl Into<anyhow::Error>) -> Self {
        Payload::Error(ConfiguredError::new(err))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Bytes(Bytes::new())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

/// What a callback hands back: status, optional extra headers, body.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub status: StatusSpec,
    pub headers: Option<Vec<(String, String)>>,
    pub body: Payload,
}

impl Reply {
    pub fn new(status: impl Into<StatusSpec>) -> Self {
        Self {
            status: status.into(),
            headers: None,
            body: Payload::default(),
        }
    }

    /// Append a header pair; repeated names accumulate as multi-value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = body.into();
        self
    }

    /// Replace the body with an error payload.
    pub fn failing(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.body = Payload::error(err);
        self
    }
}

/// Callback signature for computed rules. Runs synchronously on the calling
/// thread; must not block on I/O.
pub type Callback = dyn Fn(&Request) -> Reply + Send + Sync;

pub(crate) enum Responder {
    Canned {
        status: StatusSpec,
        extra_headers: Vec<(String, String)>,
        body: Payload,
    },
    Callback(Arc<Callback>),
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responder::Canned {
                status,
                extra_headers,
                body,
            } => f
                .debug_struct("Canned")
                .field("status", status)
                .field("extra_headers", extra_headers)
                .field("body", body)
                .finish(),
            Responder::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl Clone for Responder {
    fn clone(&self) -> Self {
        match self {
            Responder::Canned {
                status,
                extra_headers,
                body,
            } => Responder::Canned {
                status: status.clone(),
                extra_headers: extra_headers.clone(),
                body: body.clone(),
            },
            Responder::Callback(cb) => Responder::Callback(Arc::clone(cb)),
        }
    }
}

/// One registered expectation: a method + URL predicate mapped to a canned
/// reply or a callback. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Rule {
    method: MethodMatcher,
    pattern: UrlPattern,
    match_query: bool,
    content_type: String,
    responder: Responder,
}

impl Rule {
    /// Canned rule with defaults: status 200, empty body, `text/plain`.
    pub fn new(method: impl Into<MethodMatcher>, pattern: impl Into<UrlPattern>) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            match_query: false,
            content_type: "text/plain".to_string(),
            responder: Responder::Canned {
                status: StatusSpec::default(),
                extra_headers: Vec::new(),
                body: Payload::default(),
            },
        }
    }

    /// Computed rule: the callback builds the reply per request.
    pub fn with_callback(
        method: impl Into<MethodMatcher>,
        pattern: impl Into<UrlPattern>,
        callback: impl Fn(&Request) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            match_query: false,
            content_type: "text/plain".to_string(),
            responder: Responder::Callback(Arc::new(callback)),
        }
    }

    pub fn get(pattern: impl Into<UrlPattern>) -> Self {
        Self::new(Method::GET, pattern)
    }

    pub fn post(pattern: impl Into<UrlPattern>) -> Self {
        Self::new(Method::POST, pattern)
    }

    pub fn put(pattern: impl Into<UrlPattern>) -> Self {
        Self::new(Method::PUT, pattern)
    }

    pub fn delete(pattern: impl Into<UrlPattern>) -> Self {
        Self::new(Method::DELETE, pattern)
    }

    pub fn head(pattern: impl Into<UrlPattern>) -> Self {
        Self::new(Method::HEAD, pattern)
    }

    pub fn patch(pattern: impl Into<UrlPattern>) -> Self {
        Self::new(Method::PATCH, pattern)
    }

    /// Set the canned status; no effect on callback rules.
    pub fn status(mut self, status: impl Into<StatusSpec>) -> Self {
        if let Responder::Canned { status: slot, .. } = &mut self.responder {
            *slot = status.into();
        }
        self
    }

    /// Set the canned body; no effect on callback rules.
    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        if let Responder::Canned { body: slot, .. } = &mut self.responder {
            *slot = body.into();
        }
        self
    }

    /// Make the rule fail with `err` instead of responding; no effect on
    /// callback rules.
    pub fn failing(mut self, err: impl Into<anyhow::Error>) -> Self {
        if let Responder::Canned { body: slot, .. } = &mut self.responder {
            *slot = Payload::error(err);
        }
        self
    }

    /// Append an extra response header; repeated names accumulate as
    /// multi-value. No effect on callback rules (their reply carries its own
    /// headers).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Responder::Canned { extra_headers, .. } = &mut self.responder {
            extra_headers.push((name.into(), value.into()));
        }
        self
    }

    /// Default `Content-Type` emitted unless the reply overrides it.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Compare query strings as order-insensitive pair sets instead of
    /// stripping them. Ignored for regex and wildcard patterns.
    pub fn match_query(mut self, strict: bool) -> Self {
        self.match_query = strict;
        self
    }

    pub(crate) fn method_matcher(&self) -> &MethodMatcher {
        &self.method
    }

    pub(crate) fn url_pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    pub(crate) fn strict_query(&self) -> bool {
        self.match_query
    }

    pub(crate) fn content_type_value(&self) -> &str {
        &self.content_type
    }

    pub(crate) fn responder(&self) -> &Responder {
        &self.responder
    }
}
