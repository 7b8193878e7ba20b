//! Record sink abstraction and the MySQL implementation.
//!
//! The `elb_logs` table must already exist; this crate never creates or
//! alters schema.

pub mod elb_logs;

use async_trait::async_trait;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use elb_log_parser::NormalizedRecord;

use crate::error::EtlResult;

/// Append-only destination for parsed records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write one batch; returns the number of rows stored.
    async fn write_batch(&self, records: &[NormalizedRecord]) -> EtlResult<usize>;
}

/// Connect to MySQL.
pub async fn connect(options: MySqlConnectOptions) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Sink writing to the `elb_logs` table.
pub struct MySqlSink {
    pool: MySqlPool,
}

impl MySqlSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSink for MySqlSink {
    async fn write_batch(&self, records: &[NormalizedRecord]) -> EtlResult<usize> {
        let rows = elb_logs::insert_batch(&self.pool, records).await?;
        Ok(rows as usize)
    }
}
