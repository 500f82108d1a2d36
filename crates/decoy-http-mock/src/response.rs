//! The synthetic response returned as if it came off the wire.

use std::borrow::Cow;
use std::io::Read;

use bytes::{Buf, Bytes};
use http::{HeaderMap, StatusCode};

/// A canned response built by the dispatcher.
///
/// Cheap to clone: the body is a shared [`Bytes`] buffer, so the value stored
/// in the call log and the value handed to the caller alias the same bytes.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    reason: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub fn new(
        status: StatusCode,
        reason: Option<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            status,
            reason,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Reason phrase: the verbatim text of a composite status line, or the
    /// standard phrase for the code. `None` when the code has no standard
    /// phrase.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as a readable stream.
    pub fn reader(&self) -> impl Read {
        self.body.clone().reader()
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
