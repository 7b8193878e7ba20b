//! Request-line decomposition: `"METHOD URL PROTOCOL"` → method + path.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ParseError, ParseResult};
use crate::tokenizer::unquote;
use crate::types::UNKNOWN;

// RFC 3986 appendix B: scheme, authority, path (query and fragment dropped)
static RE_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?(?://([^/?#]*))?([^?#]*)").unwrap()
});

const METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Method and path extracted from a request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
}

impl RequestLine {
    /// Fallback for request lines that cannot be decomposed.
    pub fn unknown() -> Self {
        Self {
            method: UNKNOWN.to_string(),
            path: String::new(),
        }
    }
}

/// Decompose a quoted request token.
///
/// Errors are field-local: callers substitute [`RequestLine::unknown`]
/// rather than rejecting the line.
pub fn decompose(token: &str) -> ParseResult<RequestLine> {
    let content = unquote(token);
    // The protocol part, if any, is never read.
    let mut parts = content.split_whitespace();
    let (Some(method), Some(url)) = (parts.next(), parts.next()) else {
        return Err(ParseError::Request(content.to_string()));
    };

    if !METHODS.contains(&method) {
        return Err(ParseError::Request(content.to_string()));
    }

    Ok(RequestLine {
        method: method.to_string(),
        path: url_path(url)?.to_string(),
    })
}

/// Like [`decompose`], but falls back to [`RequestLine::unknown`].
pub fn decompose_or_unknown(token: &str) -> RequestLine {
    decompose(token).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "request line not decomposable");
        RequestLine::unknown()
    })
}

/// Return only the path component of an absolute or relative URL.
pub fn url_path(url: &str) -> ParseResult<&str> {
    let caps = RE_URI
        .captures(url)
        .ok_or_else(|| ParseError::Url(url.to_string()))?;

    if let Some(authority) = caps.get(1).map(|m| m.as_str()) {
        // Unbalanced IPv6 literal brackets
        if authority.contains('[') != authority.contains(']') {
            return Err(ParseError::Url(url.to_string()));
        }
    }

    Ok(caps.get(2).map_or("", |m| m.as_str()))
}
