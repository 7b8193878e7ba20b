//! Quote-aware field tokenizer for ALB log lines.
//!
//! A token is a maximal run of non-whitespace characters, where a
//! double-quoted span counts as non-whitespace even if it contains spaces.
//! Quotes stay in the token. Inside a quoted span a backslash escapes the
//! next character, so `\"` does not close the span. An unterminated quote
//! runs to the end of the line.

/// Split a raw line into positional fields.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }

        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
        } else {
            if start.is_none() {
                start = Some(i);
            }
            if c == '"' {
                in_quotes = true;
            }
        }
    }

    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    tokens
}

/// Strip one pair of surrounding double quotes, if present.
///
/// A lone leading quote (unterminated span) is stripped as well.
pub fn unquote(token: &str) -> &str {
    let inner = token.strip_prefix('"').unwrap_or(token);
    if inner.len() < token.len() {
        inner.strip_suffix('"').unwrap_or(inner)
    } else {
        token
    }
}
