//! The synthetic request handed to matchers and callbacks.

use bytes::Bytes;
use http::{HeaderMap, Method};

/// Connection identity the transport would have dialed: scheme, host, port.
///
/// Carried separately from the URL because the intercepted entry point only
/// sees path + query; the connection itself knows where it points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Plain-HTTP origin on the default port.
    pub fn http(host: impl Into<String>) -> Self {
        Self::new("http", host, 80)
    }

    /// HTTPS origin on the default port.
    pub fn https(host: impl Into<String>) -> Self {
        Self::new("https", host, 443)
    }
}

/// One intercepted outgoing request, rebuilt from the entry-point arguments
/// plus the connection [`Origin`]. Constructed fresh for every call.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path plus query string; no scheme or host.
    pub url: String,
    pub body: Option<Bytes>,
    pub headers: HeaderMap,
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Request {
    /// Build the request a transport entry point was asked to perform.
    pub fn new(
        origin: &Origin,
        method: Method,
        url: impl Into<String>,
        body: Option<Bytes>,
        headers: HeaderMap,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            body,
            headers,
            scheme: origin.scheme.clone(),
            host: origin.host.clone(),
            port: origin.port,
        }
    }

    /// URL with any query string stripped.
    pub fn path(&self) -> &str {
        match self.url.split_once('?') {
            Some((path, _)) => path,
            None => &self.url,
        }
    }

    /// Query string, if the URL carries one.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }
}
