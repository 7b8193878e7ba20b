//! Batch pipeline: list → fetch → gunzip → parse → write.
//!
//! Objects are processed one at a time. A failed download or decode skips
//! that object; a failed write aborts the run, since later batches would
//! hit the same database.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use elb_log_parser::{NormalizedRecord, ParseStats, parse_lines};

use crate::db::RecordSink;
use crate::decode;
use crate::error::{EtlError, EtlResult};
use crate::store::ObjectStore;

/// Counts for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Keys returned by the listing, gzip or not.
    pub objects_listed: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub lines_parsed: usize,
    pub lines_skipped: usize,
    pub records_written: usize,
}

/// Loads every gzip object under a prefix into a record sink.
pub struct EtlPipeline {
    store: Arc<dyn ObjectStore>,
    sink: Arc<dyn RecordSink>,
    prefix: String,
    batch_size: usize,
}

impl EtlPipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        sink: Arc<dyn RecordSink>,
        prefix: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            sink,
            prefix: prefix.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Run once over the whole prefix.
    pub async fn run(&self) -> EtlResult<RunSummary> {
        let started_at: DateTime<Utc> = Utc::now();
        let keys = self.store.list_keys(&self.prefix).await?;
        tracing::info!(prefix = %self.prefix, count = keys.len(), "listed log objects");

        let mut summary = RunSummary {
            objects_listed: keys.len(),
            ..Default::default()
        };
        let mut line_stats = ParseStats::default();

        for key in &keys {
            if !key.ends_with(".gz") {
                tracing::debug!(key = %key, "skipping non-gzip object");
                continue;
            }

            let (records, stats) = match self.load_object(key).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "failed to load log object");
                    summary.files_failed += 1;
                    continue;
                }
            };

            let written = self.write_records(&records).await?;
            summary.files_processed += 1;
            summary.records_written += written;
            line_stats.merge(stats);
            tracing::info!(
                key = %key,
                lines = stats.total(),
                parsed = stats.parsed,
                skipped = stats.skipped,
                written,
                "log object loaded"
            );
        }

        summary.lines_parsed = line_stats.parsed;
        summary.lines_skipped = line_stats.skipped;

        let elapsed_ms = (Utc::now() - started_at).num_milliseconds();
        tracing::info!(
            files = summary.files_processed,
            failed = summary.files_failed,
            parsed = summary.lines_parsed,
            skipped = summary.lines_skipped,
            written = summary.records_written,
            elapsed_ms,
            "run complete"
        );
        Ok(summary)
    }

    /// Fetch, decompress and parse one object off the async runtime.
    async fn load_object(&self, key: &str) -> EtlResult<(Vec<NormalizedRecord>, ParseStats)> {
        let bytes = self.store.fetch(key).await?;
        let key = key.to_string();
        tokio::task::spawn_blocking(move || -> EtlResult<(Vec<NormalizedRecord>, ParseStats)> {
            let lines = decode::gunzip_lines(&key, &bytes)?;
            Ok(parse_lines(lines, &key))
        })
        .await
        .map_err(|e| EtlError::Other(format!("parse task failed: {e}")))?
    }

    async fn write_records(&self, records: &[NormalizedRecord]) -> EtlResult<usize> {
        let mut written = 0;
        for chunk in records.chunks(self.batch_size) {
            written += self.sink.write_batch(chunk).await?;
        }
        Ok(written)
    }
}
