//! Lenient numeric coercion for log fields.
//!
//! Both coercers collapse "absent" (`-`) and "malformed" into zero. That
//! loses the distinction from a literal `0`, which downstream queries
//! have to live with.

/// Parse an all-digit token; anything else (signs, decimals, empty) is `0`.
pub fn to_int(token: &str) -> u64 {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    token.parse().unwrap_or(0)
}

/// Parse a float token; unparseable or non-finite values are `0.0`.
pub fn to_float(token: &str) -> f64 {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
