//! Error types surfaced by the mock transport.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use http::Method;
use thiserror::Error;

/// A failure a rule was configured to produce instead of a response.
///
/// The underlying error is shared behind an `Arc`, so the value recorded in
/// the call log and the value returned to the caller are the same object.
#[derive(Debug, Clone)]
pub struct ConfiguredError(Arc<anyhow::Error>);

impl ConfiguredError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(Arc::new(err.into()))
    }

    /// The wrapped error as supplied at registration time.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Display for ConfiguredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl StdError for ConfiguredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let inner: &(dyn StdError + 'static) = &**self.0;
        Some(inner)
    }
}

/// Errors returned from the transport entry point in place of real network
/// failures.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No registered rule matched the request.
    #[error("connection refused: {method} {url}")]
    ConnectionRefused { method: Method, url: String },

    /// A matched rule carried an error payload instead of a body.
    #[error(transparent)]
    Configured(#[from] ConfiguredError),
}

impl TransportError {
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, TransportError::ConnectionRefused { .. })
    }
}

/// Lifecycle misuse errors.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// A mock transport is already installed as the process entry point.
    #[error("a mock transport is already active")]
    AlreadyActive,
}
