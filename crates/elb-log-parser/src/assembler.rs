//! Record assembly: one raw ALB line → one [`NormalizedRecord`] or a rejection.
//!
//! Gates run in order: field count, timestamp, then the field extractions.
//! Only the first two (and internal faults) reject a line; a malformed
//! request line falls back to `Unknown` and an empty path.

use crate::coerce::{to_float, to_int};
use crate::error::{ParseError, ParseResult};
use crate::request;
use crate::timestamp::parse_timestamp;
use crate::tokenizer::{tokenize, unquote};
use crate::types::{NormalizedRecord, ParseStats};
use crate::user_agent;

/// Minimum number of positional fields for a usable line.
pub const MIN_FIELDS: usize = 15;

/// Characters of the offending line included in diagnostics.
const LINE_PREFIX_CHARS: usize = 120;

// Positional field indices
const F_TIMESTAMP: usize = 1;
const F_CLIENT: usize = 3;
const F_REQUEST_TIME: usize = 5;
const F_TARGET_TIME: usize = 6;
const F_RESPONSE_TIME: usize = 7;
const F_ELB_STATUS: usize = 8;
const F_BACKEND_STATUS: usize = 9;
const F_RECEIVED_BYTES: usize = 10;
const F_SENT_BYTES: usize = 11;
const F_REQUEST: usize = 12;
const F_USER_AGENT: usize = 13;

/// Parse one log line, logging and discarding rejections.
///
/// Never panics on malformed input; `None` means the line was skipped.
pub fn parse_line(raw_line: &str, source_file: &str) -> Option<NormalizedRecord> {
    match try_parse_line(raw_line, source_file) {
        Ok(record) => Some(record),
        Err(ParseError::Internal(reason)) => {
            tracing::error!(
                source_file,
                line_prefix = line_prefix(raw_line),
                %reason,
                "unexpected fault while assembling record, line skipped"
            );
            None
        }
        Err(err) => {
            tracing::warn!(
                source_file,
                line_prefix = line_prefix(raw_line),
                reason = %err,
                "log line rejected"
            );
            None
        }
    }
}

/// Parse one log line, returning the rejection reason on failure.
pub fn try_parse_line(raw_line: &str, source_file: &str) -> ParseResult<NormalizedRecord> {
    let fields = tokenize(raw_line);
    if fields.len() < MIN_FIELDS {
        return Err(ParseError::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    let log_timestamp = parse_timestamp(fields[F_TIMESTAMP])?;
    assemble(&fields, log_timestamp, source_file)
}

/// Parse a batch of lines from one source file.
///
/// Blank lines are ignored and not counted.
pub fn parse_lines<I, S>(lines: I, source_file: &str) -> (Vec<NormalizedRecord>, ParseStats)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut stats = ParseStats::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line, source_file) {
            Some(record) => {
                records.push(record);
                stats.parsed += 1;
            }
            None => stats.skipped += 1,
        }
    }

    (records, stats)
}

fn assemble(
    fields: &[&str],
    log_timestamp: chrono::DateTime<chrono_tz::Tz>,
    source_file: &str,
) -> ParseResult<NormalizedRecord> {
    let field = |idx: usize| {
        fields
            .get(idx)
            .copied()
            .ok_or_else(|| ParseError::Internal(format!("field {idx} missing after count check")))
    };

    let client_ip = client_ip(field(F_CLIENT)?).to_string();

    let processing_secs: f64 = [F_REQUEST_TIME, F_TARGET_TIME, F_RESPONSE_TIME]
        .into_iter()
        .map(|idx| field(idx).map(|t| to_float(t).max(0.0)))
        .sum::<ParseResult<f64>>()?;

    let request = request::decompose_or_unknown(field(F_REQUEST)?);

    let user_agent_full = unquote(field(F_USER_AGENT)?).to_string();
    let ua = user_agent::classify(&user_agent_full);

    Ok(NormalizedRecord {
        log_timestamp,
        client_ip,
        http_method: request.method,
        requested_path: request.path,
        elb_status_code: to_int(field(F_ELB_STATUS)?),
        backend_status_code: to_int(field(F_BACKEND_STATUS)?),
        total_processing_time_ms: round_ms(processing_secs * 1000.0),
        received_bytes: to_int(field(F_RECEIVED_BYTES)?),
        sent_bytes: to_int(field(F_SENT_BYTES)?),
        user_agent_full,
        ua_browser_family: ua.browser_family,
        ua_os_family: ua.os_family,
        log_source_file: source_file.to_string(),
    })
}

/// Strip the port from a `client:port` field.
///
/// Handles `1.2.3.4:5678`, bracketed `[::1]:443`, and bare IPv6 where the
/// port follows the last colon.
pub fn client_ip(field: &str) -> &str {
    if let Some(rest) = field.strip_prefix('[') {
        if let Some((addr, _)) = rest.split_once(']') {
            return addr;
        }
    }
    field.rsplit_once(':').map_or(field, |(addr, _)| addr)
}

fn round_ms(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

fn line_prefix(line: &str) -> &str {
    match line.char_indices().nth(LINE_PREFIX_CHARS) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};

    const SAMPLE: &str = concat!(
        r#"h2 2025-05-26T23:55:02.179979Z app/erank-app/xxxxxxx 1.2.3.4:5678 "#,
        r#"5.6.7.8:80 0.001 0.303 0.000 200 200 74 1013 "#,
        r#""POST https://example.com:443/api/browser-ext-user HTTP/2.0" "#,
        r#""Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) "#,
        r#"Chrome/137.0.0.0 Safari/537.36" TLS_AES_128_GCM_SHA256 TLSv1.3 "#,
        r#"arn:aws:elasticloadbalancing:region:accountid:targetgroup/example-app-v3-production/xxxxxxxx "#,
        r#""Root=1-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx" "example.com" "session-reused" 1 2025-05-26T23:55:01.875000Z "#,
        r#""waf,forward" "-" "-" "5.6.7.8:80" "200" "-" "-" TID_xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"#
    );

    fn line_with(timestamp: &str, request: &str, user_agent: &str) -> String {
        format!(
            "https {timestamp} app/x 10.0.0.9:443 10.0.1.1:80 0.000 0.012 0.000 404 404 120 532 \
             {request} {user_agent} ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:tg"
        )
    }

    #[test]
    fn parse_valid_line() {
        let rec = parse_line(SAMPLE, "dummy.log").unwrap();
        assert_eq!(rec.client_ip, "1.2.3.4");
        assert_eq!(rec.http_method, "POST");
        assert_eq!(rec.requested_path, "/api/browser-ext-user");
        assert_eq!(rec.elb_status_code, 200);
        assert_eq!(rec.backend_status_code, 200);
        assert_eq!(rec.total_processing_time_ms, 304.0);
        assert_eq!(rec.received_bytes, 74);
        assert_eq!(rec.sent_bytes, 1013);
        assert!(rec.user_agent_full.starts_with("Mozilla/"));
        assert!(rec.user_agent_full.ends_with("Safari/537.36"));
        assert_eq!(rec.ua_browser_family, "Chrome");
        assert_eq!(rec.ua_os_family, "Windows");
        assert_eq!(rec.log_source_file, "dummy.log");
        assert_eq!(rec.log_timestamp.to_rfc3339(), "2025-05-26T19:55:02.179979-04:00");
    }

    #[test]
    fn too_few_fields_rejected() {
        assert!(parse_line("only this", "dummy.log").is_none());
        assert_eq!(
            try_parse_line("only this", "dummy.log"),
            Err(ParseError::TooFewFields {
                expected: 15,
                found: 2
            })
        );
    }

    #[test]
    fn fourteen_fields_rejected() {
        let line = "a b c d e f g h i j k l m n";
        assert!(parse_line(line, "f").is_none());
    }

    #[test]
    fn bad_timestamp_rejected() {
        let line = concat!(
            "h2 badtimestamp app/erank-app/xxxxxxx 1.2.3.4:5678 5.6.7.8:80 ",
            r#"0.001 0.303 0.000 200 200 74 1013 "POST /test HTTP/2.0" "-" TLS_AES_128_GCM_SHA256 TLSv1.3 x"#
        );
        assert!(parse_line(line, "dummy.log").is_none());
        assert!(matches!(
            try_parse_line(line, "dummy.log"),
            Err(ParseError::Timestamp(_))
        ));
    }

    #[test]
    fn quoted_spaces_do_not_count_as_fields() {
        let line = line_with("2024-01-15T12:00:00Z", r#""GET /a HTTP/1.1""#, r#""-""#);
        assert_eq!(tokenize(&line).len(), 17);
        assert!(parse_line(&line, "f").is_some());
    }

    #[test]
    fn malformed_request_still_produces_record() {
        let line = line_with("2024-01-15T12:00:00Z", r#""GET""#, r#""curl/8.5.0""#);
        let rec = parse_line(&line, "f").unwrap();
        assert_eq!(rec.http_method, "Unknown");
        assert_eq!(rec.requested_path, "");
        assert_eq!(rec.elb_status_code, 404);
        assert_eq!(rec.ua_browser_family, "curl");
    }

    #[test]
    fn dash_user_agent_is_unknown() {
        let line = line_with("2024-01-15T12:00:00Z", r#""GET /a HTTP/1.1""#, r#""-""#);
        let rec = parse_line(&line, "f").unwrap();
        assert_eq!(rec.user_agent_full, "-");
        assert_eq!(rec.ua_browser_family, "Unknown");
        assert_eq!(rec.ua_os_family, "Unknown");
    }

    #[test]
    fn dst_offsets_follow_the_date() {
        let summer = line_with("2024-07-04T16:00:00Z", r#""GET / HTTP/1.1""#, r#""-""#);
        let winter = line_with("2024-01-04T16:00:00.5Z", r#""GET / HTTP/1.1""#, r#""-""#);
        let s = parse_line(&summer, "f").unwrap().log_timestamp;
        let w = parse_line(&winter, "f").unwrap().log_timestamp;
        assert_eq!(s.offset().fix().local_minus_utc(), -4 * 3600);
        assert_eq!(w.offset().fix().local_minus_utc(), -5 * 3600);
        assert_eq!(s.hour(), 12);
        assert_eq!(w.hour(), 11);
    }

    #[test]
    fn parse_is_idempotent() {
        let a = parse_line(SAMPLE, "dummy.log").unwrap();
        let b = parse_line(SAMPLE, "dummy.log").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fields_survive_a_rebuilt_line() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
        let line = format!(
            "https 2024-11-05T03:04:05.000001Z app/x 203.0.113.7:51000 10.0.1.1:80 \
             0.002 0.250 0.001 502 503 2048 4096 \"DELETE https://api.example.com/v1/items/42?force=1 HTTP/1.1\" \
             \"{ua}\" c p arn"
        );
        let rec = parse_line(&line, "2024/11/05/elb.log.gz").unwrap();
        assert_eq!(rec.log_timestamp.to_rfc3339(), "2024-11-04T22:04:05.000001-05:00");
        assert_eq!(rec.client_ip, "203.0.113.7");
        assert_eq!(rec.http_method, "DELETE");
        assert_eq!(rec.requested_path, "/v1/items/42");
        assert_eq!(rec.elb_status_code, 502);
        assert_eq!(rec.backend_status_code, 503);
        assert_eq!(rec.total_processing_time_ms, 253.0);
        assert_eq!(rec.received_bytes, 2048);
        assert_eq!(rec.sent_bytes, 4096);
        assert_eq!(rec.user_agent_full, ua);
        assert_eq!(rec.ua_browser_family, "Safari");
        assert_eq!(rec.ua_os_family, "Mac OS X");
        assert_eq!(rec.log_source_file, "2024/11/05/elb.log.gz");
    }

    #[test]
    fn dashes_and_negative_legs_coerce_to_zero() {
        let line = concat!(
            "http 2018-11-30T22:23:00.186641Z app/lb/50dc 192.168.131.39:2817 - ",
            r#"-1 -1 -1 460 - 34 0 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.46.0" - - arn:tg"#
        );
        let rec = parse_line(line, "f").unwrap();
        assert_eq!(rec.total_processing_time_ms, 0.0);
        assert_eq!(rec.elb_status_code, 460);
        assert_eq!(rec.backend_status_code, 0);
        assert_eq!(rec.sent_bytes, 0);
        assert_eq!(rec.requested_path, "/");
    }

    #[test]
    fn processing_time_rounds_to_three_places() {
        let line = concat!(
            "https 2024-01-15T12:00:00Z app/x 10.0.0.9:443 10.0.1.1:80 ",
            r#"0.0000004 0.1234567 0.0000001 200 200 1 2 "GET / HTTP/1.1" "-" c p arn"#
        );
        let rec = parse_line(line, "f").unwrap();
        assert_eq!(rec.total_processing_time_ms, 123.457);
    }

    #[test]
    fn client_ip_variants() {
        assert_eq!(client_ip("1.2.3.4:5678"), "1.2.3.4");
        assert_eq!(client_ip("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(client_ip("2001:db8::1:443"), "2001:db8::1");
        assert_eq!(client_ip("1.2.3.4"), "1.2.3.4");
    }

    #[test]
    fn out_of_range_status_is_kept() {
        let line = concat!(
            "https 2024-01-15T12:00:00Z app/x 10.0.0.9:443 10.0.1.1:80 0.000 0.012 0.000 ",
            r#"70000 - 1 2 "GET / HTTP/1.1" "-" c p arn"#
        );
        let rec = parse_line(line, "f").unwrap();
        assert_eq!(rec.elb_status_code, 70000);
        assert_eq!(rec.backend_status_code, 0);
    }

    #[test]
    fn rejection_log_carries_line_prefix() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert!(parse_line("h2 2025-05-26T23:55:02Z truncated", "a.gz").is_none());
        });

        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("log line rejected"));
        assert!(out.contains(r#""line_prefix":"h2 2025-05-26T23:55:02Z truncated""#));
        assert!(out.contains(r#""source_file":"a.gz""#));
    }

    #[test]
    fn parse_lines_counts_outcomes() {
        let lines = vec![SAMPLE, "", "only this", "   ", SAMPLE];
        let (records, stats) = parse_lines(lines, "dummy.log");
        assert_eq!(records.len(), 2);
        assert_eq!(stats.parsed, 2);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn line_prefix_is_char_safe() {
        let long = "é".repeat(200);
        assert_eq!(line_prefix(&long).chars().count(), 120);
        assert_eq!(line_prefix("short"), "short");
    }

    #[test]
    fn record_serializes_with_offset() {
        let rec = parse_line(SAMPLE, "dummy.log").unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["client_ip"], "1.2.3.4");
        assert_eq!(json["log_timestamp"], "2025-05-26T19:55:02.179979-04:00");
    }
}
