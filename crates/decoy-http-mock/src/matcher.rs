//! First-match rule selection and the URL predicate.

use std::borrow::Cow;

use crate::request::Request;
use crate::rule::{Rule, UrlPattern};

/// Scan rules in registration order; first rule whose method and URL
/// predicate both hold wins. `None` is a signal for the dispatcher, not an
/// error by itself.
pub(crate) fn find_match<'a>(rules: &'a [Rule], request: &Request) -> Option<&'a Rule> {
    rules.iter().find(|rule| {
        rule.method_matcher().matches(&request.method) && url_matches(rule, &request.url)
    })
}

fn url_matches(rule: &Rule, url: &str) -> bool {
    match rule.url_pattern() {
        UrlPattern::Any => true,
        // Regex authors encode query constraints themselves; the strict-query
        // flag is ignored here.
        UrlPattern::Regex(re) => re.is_match(url),
        UrlPattern::Exact(pattern) => {
            if rule.strict_query() {
                strict_url_match(pattern, url)
            } else {
                pattern == strip_query(url)
            }
        }
    }
}

pub(crate) fn strip_query(url: &str) -> &str {
    match url.split_once('?') {
        Some((path, _)) => path,
        None => url,
    }
}

/// Paths must be equal; query strings must be equal as order-insensitive
/// multisets of decoded key-value pairs.
fn strict_url_match(pattern: &str, url: &str) -> bool {
    let (pattern_path, pattern_query) = split_url(pattern);
    let (url_path, url_query) = split_url(url);

    pattern_path == url_path && query_pairs(pattern_query) == query_pairs(url_query)
}

fn split_url(url: &str) -> (&str, &str) {
    match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    }
}

/// Decoded key-value pairs, sorted. Duplicates are kept so repeated keys
/// must appear the same number of times on both sides.
fn query_pairs(query: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            (decode_component(key), decode_component(value))
        })
        .collect();
    pairs.sort();
    pairs
}

fn decode_component(raw: &str) -> String {
    // Form encoding: '+' is a space.
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(Cow::into_owned)
        .unwrap_or(plus_decoded)
}
