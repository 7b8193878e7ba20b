//! Shared test harness for E2E integration tests.
//!
//! Wires the real pipeline to an in-memory object store and sink, so
//! every line goes through the same gunzip → parse → batch path as the
//! production binary.

#![allow(dead_code)]

use std::sync::Arc;

use elb_etl::{EtlPipeline, MemorySink, MockObjectStore, RunSummary};

/// Prefix under which harness objects are stored.
pub const PREFIX: &str = "AWSLogs/123456789012/elasticloadbalancing/us-east-1/";

/// In-memory pipeline harness.
pub struct TestHarness {
    pub store: MockObjectStore,
    pub sink: Arc<MemorySink>,
    pub batch_size: usize,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            store: MockObjectStore::new(),
            sink: Arc::new(MemorySink::new()),
            batch_size: 1000,
        }
    }

    /// Add a gzip log object at `PREFIX` + `name`.
    pub fn add_log(&mut self, name: &str, lines: &[String]) -> &mut Self {
        self.store.add_gzipped(format!("{PREFIX}{name}"), lines);
        self
    }

    /// Add an object with raw bytes at `PREFIX` + `name`.
    pub fn add_raw(&mut self, name: &str, bytes: &[u8]) -> &mut Self {
        self.store.add_object(format!("{PREFIX}{name}"), bytes.to_vec());
        self
    }

    /// Run the pipeline once and return its summary.
    pub async fn run(self) -> (RunSummary, Arc<MemorySink>) {
        let sink = self.sink.clone();
        let pipeline = EtlPipeline::new(Arc::new(self.store), sink.clone(), PREFIX, self.batch_size);
        let summary = pipeline.run().await.expect("pipeline run");
        (summary, sink)
    }
}

/// Build an ALB line from the fields the loader reads.
pub struct LineBuilder {
    pub timestamp: String,
    pub client: String,
    pub durations: [String; 3],
    pub elb_status: String,
    pub backend_status: String,
    pub received: String,
    pub sent: String,
    pub request: String,
    pub user_agent: String,
}

impl Default for LineBuilder {
    fn default() -> Self {
        Self {
            timestamp: "2025-05-26T23:55:02.179979Z".into(),
            client: "1.2.3.4:5678".into(),
            durations: ["0.001".into(), "0.303".into(), "0.000".into()],
            elb_status: "200".into(),
            backend_status: "200".into(),
            received: "74".into(),
            sent: "1013".into(),
            request: "POST https://example.com:443/api/foo HTTP/2.0".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36".into(),
        }
    }
}

impl LineBuilder {
    pub fn build(&self) -> String {
        let [req_t, target_t, resp_t] = &self.durations;
        format!(
            "h2 {ts} app/erank-app/xxxxxxx {client} 5.6.7.8:80 {req_t} {target_t} {resp_t} \
             {elb} {backend} {received} {sent} \"{request}\" \"{ua}\" TLS_AES_128_GCM_SHA256 TLSv1.3 \
             arn:aws:elasticloadbalancing:region:accountid:targetgroup/example/xxxxxxxx \"Root=1-abc\" \
             \"example.com\" \"session-reused\" 1 2025-05-26T23:55:01.875000Z \"waf,forward\" \"-\" \"-\" \
             \"5.6.7.8:80\" \"200\" \"-\" \"-\" TID_x",
            ts = self.timestamp,
            client = self.client,
            elb = self.elb_status,
            backend = self.backend_status,
            received = self.received,
            sent = self.sent,
            request = self.request,
            ua = self.user_agent,
        )
    }
}
