//! Reply normalization: status line, reason phrase, header merge, body bytes.

use std::collections::HashSet;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};

use crate::error::ConfiguredError;
use crate::request::Request;
use crate::rule::{Payload, Reply, Responder, Rule, StatusSpec};

/// A fully normalized reply, ready to become a [`crate::Response`].
#[derive(Debug)]
pub(crate) struct ResolvedReply {
    pub status: StatusCode,
    pub reason: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Resolve a matched rule against the request.
///
/// `Err` means the rule was configured to fail: the caller must return the
/// error instead of building any response.
pub(crate) fn respond(rule: &Rule, request: &Request) -> Result<ResolvedReply, ConfiguredError> {
    let (status, extra_headers, body) = match rule.responder() {
        Responder::Canned {
            status,
            extra_headers,
            body,
        } => (status.clone(), extra_headers.clone(), body.clone()),
        Responder::Callback(callback) => {
            let Reply {
                status,
                headers,
                body,
            } = callback(request);
            (status, headers.unwrap_or_default(), body)
        }
    };

    // An error body wins over any status/header processing.
    let body = match body {
        Payload::Error(err) => return Err(err),
        Payload::Text(text) => Bytes::from(text.into_bytes()),
        Payload::Bytes(bytes) => bytes,
    };

    let (status, reason) = resolve_status(&status);
    let headers = merge_headers(rule.content_type_value(), &extra_headers);

    Ok(ResolvedReply {
        status,
        reason,
        headers,
        body,
    })
}

/// Status normalization.
///
/// A composite `"code reason"` line splits on the first whitespace and keeps
/// the remainder verbatim as the reason phrase; a bare code falls back to the
/// standard reason-phrase table.
///
/// # Panics
///
/// Panics on a malformed status line or an out-of-range code; both are
/// misconfigurations of the test double.
fn resolve_status(spec: &StatusSpec) -> (StatusCode, Option<String>) {
    match spec {
        StatusSpec::Code(code) => {
            let status = StatusCode::from_u16(*code)
                .unwrap_or_else(|_| panic!("invalid HTTP status code: {code}"));
            (status, status.canonical_reason().map(str::to_owned))
        }
        StatusSpec::Line(line) => {
            let trimmed = line.trim();
            let (code, reason) = match trimmed.split_once(char::is_whitespace) {
                Some((code, rest)) => (code, Some(rest.to_string())),
                None => (trimmed, None),
            };
            let code: u16 = code
                .parse()
                .unwrap_or_else(|_| panic!("invalid status line: {line:?}"));
            let status = StatusCode::from_u16(code)
                .unwrap_or_else(|_| panic!("invalid HTTP status code in {line:?}"));
            let reason = reason.or_else(|| status.canonical_reason().map(str::to_owned));
            (status, reason)
        }
    }
}

/// Start from the rule's default `Content-Type`, then apply the supplied
/// headers: the first occurrence of a name replaces any default, repeated
/// occurrences append, so multi-value headers like `set-cookie` survive.
///
/// # Panics
///
/// Panics on header names or values `http` rejects.
fn merge_headers(content_type: &str, extra: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| panic!("invalid content type: {content_type:?}")),
    );

    let mut replaced: HashSet<HeaderName> = HashSet::new();
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|_| panic!("invalid header name: {name:?}"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|_| panic!("invalid header value for {name}: {value:?}"));
        if replaced.insert(name.clone()) {
            headers.insert(name, value);
        } else {
            headers.append(name, value);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Origin;
    use http::Method;

    fn request(url: &str) -> Request {
        Request::new(
            &Origin::http("example.com"),
            Method::GET,
            url,
            None,
            HeaderMap::new(),
        )
    }

    #[test]
    fn test_plain_code_uses_standard_reason() {
        let (status, reason) = resolve_status(&StatusSpec::Code(200));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason.as_deref(), Some("OK"));
    }

    #[test]
    fn test_unknown_code_has_no_reason() {
        let (status, reason) = resolve_status(&StatusSpec::Code(599));
        assert_eq!(status.as_u16(), 599);
        assert_eq!(reason, None);
    }

    #[test]
    fn test_composite_line_keeps_reason_verbatim() {
        let (status, reason) = resolve_status(&StatusSpec::Line("418 I'm a teapot".to_string()));
        assert_eq!(status.as_u16(), 418);
        assert_eq!(reason.as_deref(), Some("I'm a teapot"));

        let (status, reason) = resolve_status(&StatusSpec::Line("400 Broken Stuff".to_string()));
        assert_eq!(status.as_u16(), 400);
        assert_eq!(reason.as_deref(), Some("Broken Stuff"));
    }

    #[test]
    fn test_bare_numeric_line_falls_back_to_table() {
        let (status, reason) = resolve_status(&StatusSpec::Line("404".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(reason.as_deref(), Some("Not Found"));
    }

    #[test]
    #[should_panic(expected = "invalid status line")]
    fn test_malformed_line_panics() {
        let _ = resolve_status(&StatusSpec::Line("teapot 418".to_string()));
    }

    #[test]
    #[should_panic(expected = "invalid HTTP status code")]
    fn test_out_of_range_code_panics() {
        let _ = resolve_status(&StatusSpec::Code(42));
    }

    #[test]
    fn test_merge_defaults_content_type() {
        let headers = merge_headers("text/plain", &[]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_supplied_content_type_overrides_default() {
        let headers = merge_headers(
            "text/plain",
            &[("Content-Type".to_string(), "text/nonsense".to_string())],
        );
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "text/nonsense");
    }

    #[test]
    fn test_repeated_headers_accumulate() {
        let headers = merge_headers(
            "text/plain",
            &[
                ("set-cookie".to_string(), "session_id=12345".to_string()),
                ("set-cookie".to_string(), "username=john john".to_string()),
            ],
        );
        let cookies: Vec<_> = headers.get_all("set-cookie").iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "session_id=12345");
        assert_eq!(cookies[1], "username=john john");
    }

    #[test]
    fn test_repeated_supplied_content_type_replaces_then_appends() {
        let headers = merge_headers(
            "text/plain",
            &[
                ("content-type".to_string(), "a/b".to_string()),
                ("content-type".to_string(), "c/d".to_string()),
            ],
        );
        let values: Vec<_> = headers.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["a/b", "c/d"]);
    }

    #[test]
    fn test_respond_canned_encodes_text() {
        let rule = Rule::get("/").status(200).body("hi");
        let resolved = respond(&rule, &request("/")).unwrap();
        assert_eq!(resolved.status, StatusCode::OK);
        assert_eq!(resolved.reason.as_deref(), Some("OK"));
        assert_eq!(resolved.body.as_ref(), b"hi");
        assert_eq!(resolved.headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_respond_error_body_wins() {
        let rule = Rule::get("/").status(400).failing(anyhow::anyhow!("HTTP Error"));
        let err = respond(&rule, &request("/")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP Error");
    }

    #[test]
    fn test_respond_callback_gets_request_and_merges_headers() {
        let rule = Rule::with_callback(Method::GET, "/", |req| {
            assert_eq!(req.url, "/");
            assert_eq!(req.scheme, "http");
            assert_eq!(req.host, "example.com");
            assert_eq!(req.port, 80);
            Reply::new("400 Broken Stuff")
                .header("foo", "bar")
                .header("content-type", "text/nonsense")
                .body("test callback")
        });

        let resolved = respond(&rule, &request("/")).unwrap();
        assert_eq!(resolved.status.as_u16(), 400);
        assert_eq!(resolved.reason.as_deref(), Some("Broken Stuff"));
        assert_eq!(resolved.headers["foo"], "bar");
        assert_eq!(resolved.headers[CONTENT_TYPE], "text/nonsense");
        assert_eq!(resolved.body.as_ref(), b"test callback");
    }

    #[test]
    fn test_respond_callback_without_headers_keeps_default() {
        let rule = Rule::with_callback(Method::GET, "/", |_| {
            Reply::new(200).body("test no additional header")
        });

        let resolved = respond(&rule, &request("/")).unwrap();
        assert_eq!(resolved.headers.len(), 1);
        assert_eq!(resolved.headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_respond_callback_error_body_wins_over_status() {
        let rule = Rule::with_callback(Method::GET, "/", |_| {
            Reply::new(400)
                .header("k", "v")
                .failing(anyhow::anyhow!("configured failure"))
        });

        let err = respond(&rule, &request("/")).unwrap_err();
        assert_eq!(err.to_string(), "configured failure");
    }
}
