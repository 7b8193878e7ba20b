//! Normalized record and batch statistics types.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Sentinel for fields that are absent or could not be classified.
pub const UNKNOWN: &str = "Unknown";

// ── Normalized Record ─────────────────────────────────────────

/// One ALB access-log line, normalized for the `elb_logs` table.
///
/// Numeric fields use `0` for both "absent" and "malformed"; consumers
/// cannot tell those apart from a literal zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    /// Request time in US Eastern, keeping its UTC offset.
    pub log_timestamp: DateTime<Tz>,
    /// Client address without the port.
    pub client_ip: String,
    /// HTTP verb, or [`UNKNOWN`] when the request line was malformed.
    pub http_method: String,
    /// URL path only (no host, query or fragment). May be empty.
    pub requested_path: String,
    /// Status code returned by the load balancer itself.
    pub elb_status_code: u64,
    /// Status code returned by the backend target.
    pub backend_status_code: u64,
    /// Request + target + response processing time, in milliseconds.
    pub total_processing_time_ms: f64,
    pub received_bytes: u64,
    pub sent_bytes: u64,
    /// User-agent string as logged (quotes stripped).
    pub user_agent_full: String,
    pub ua_browser_family: String,
    pub ua_os_family: String,
    /// Object key the line was read from.
    pub log_source_file: String,
}

// ── Parse Stats ───────────────────────────────────────────────

/// Outcome counts for a batch of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub parsed: usize,
    pub skipped: usize,
}

impl ParseStats {
    /// Total non-blank lines seen.
    pub fn total(&self) -> usize {
        self.parsed + self.skipped
    }

    /// Fold another batch's counts into this one.
    pub fn merge(&mut self, other: ParseStats) {
        self.parsed += other.parsed;
        self.skipped += other.skipped;
    }
}
