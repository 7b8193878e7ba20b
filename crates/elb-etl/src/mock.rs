//! In-memory object store and record sink for testing without AWS or MySQL.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use elb_log_parser::NormalizedRecord;

use crate::db::RecordSink;
use crate::decode;
use crate::error::{EtlError, EtlResult};
use crate::store::ObjectStore;

/// Sample ALB lines: two valid, one truncated, one with a bad timestamp.
pub const SAMPLE_LINES: &[&str] = &[
    concat!(
        r#"h2 2025-05-26T23:55:02.179979Z app/erank-app/xxxxxxx 1.2.3.4:5678 5.6.7.8:80 0.001 0.303 0.000 200 200 74 1013 "#,
        r#""POST https://example.com:443/api/browser-ext-user HTTP/2.0" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36" "#,
        r#"TLS_AES_128_GCM_SHA256 TLSv1.3 arn:aws:elasticloadbalancing:region:accountid:targetgroup/example/xxxxxxxx "Root=1-abc" "example.com" "session-reused" 1 2025-05-26T23:55:01.875000Z "waf,forward" "-" "-" "5.6.7.8:80" "200" "-" "-" TID_x"#
    ),
    concat!(
        r#"http 2024-01-15T12:00:00Z app/erank-app/xxxxxxx 10.0.0.9:443 - -1 -1 -1 460 - 34 0 "#,
        r#""GET http://www.example.com:80/health HTTP/1.1" "curl/8.5.0" - - arn:tg "Root=1-def" "-" "-" 0 2024-01-15T11:59:59Z "forward" "-" "-" "-" "-" "-" "-""#
    ),
    "h2 2025-05-26T23:55:02Z truncated",
    concat!(
        r#"h2 badtimestamp app/erank-app/xxxxxxx 1.2.3.4:5678 5.6.7.8:80 0.001 0.303 0.000 200 200 74 1013 "#,
        r#""POST /test HTTP/2.0" "-" TLS_AES_128_GCM_SHA256 TLSv1.3 x"#
    ),
];

/// Object store serving pre-loaded objects by key, in key order.
pub struct MockObjectStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
        }
    }

    /// Add an object with raw (possibly invalid) bytes.
    pub fn add_object(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.objects.insert(key.into(), bytes);
    }

    /// Add a gzip object containing the given lines.
    pub fn add_gzipped<S: AsRef<str>>(&mut self, key: impl Into<String>, lines: &[S]) {
        let bytes = decode::gzip_lines(lines).expect("gzip into memory");
        self.add_object(key, bytes);
    }

    /// Create a store with one gzip object of [`SAMPLE_LINES`] plus a
    /// non-gzip object that must be ignored.
    pub fn with_sample() -> Self {
        let mut m = Self::new();
        m.add_gzipped(
            "AWSLogs/123/elasticloadbalancing/us-east-1/2025/05/26/elb_1.log.gz",
            SAMPLE_LINES,
        );
        m.add_object(
            "AWSLogs/123/elasticloadbalancing/us-east-1/ELBAccessLogTestFile",
            b"Enable AccessLog for ELB: test".to_vec(),
        );
        m
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_keys(&self, prefix: &str) -> EtlResult<Vec<String>> {
        Ok(self
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn fetch(&self, key: &str) -> EtlResult<Vec<u8>> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| EtlError::NotFound(key.to_string()))
    }
}

/// Record sink keeping every written batch in memory.
///
/// Thread-safe via `Mutex` (fine for test contexts).
pub struct MemorySink {
    records: Mutex<Vec<NormalizedRecord>>,
    batch_sizes: Mutex<Vec<usize>>,
    fail_writes: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            batch_sizes: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    /// A sink whose every write fails, as a lost database would.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// All records written so far, in write order.
    pub fn records(&self) -> Vec<NormalizedRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Size of each batch written, in write order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write_batch(&self, records: &[NormalizedRecord]) -> EtlResult<usize> {
        if self.fail_writes {
            return Err(EtlError::Database("connection refused".into()));
        }
        self.records.lock().unwrap().extend_from_slice(records);
        self.batch_sizes.lock().unwrap().push(records.len());
        Ok(records.len())
    }
}
