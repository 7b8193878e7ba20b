//! `elb_logs` table writes.

use sqlx::{MySql, MySqlPool, QueryBuilder};

use elb_log_parser::NormalizedRecord;

const INSERT_PREFIX: &str = "INSERT INTO elb_logs (\
    log_timestamp, client_ip, http_method, requested_path, \
    elb_status_code, backend_status_code, total_processing_time_ms, \
    received_bytes, sent_bytes, user_agent_full, ua_browser_family, \
    ua_os_family, log_source_file) ";

/// Build the multi-row INSERT for a batch of records.
pub fn build_insert(records: &[NormalizedRecord]) -> QueryBuilder<'_, MySql> {
    let mut builder = QueryBuilder::new(INSERT_PREFIX);
    builder.push_values(records, |mut row, rec| {
        // Stored as Eastern wall-clock time; DATETIME carries no offset.
        row.push_bind(rec.log_timestamp.naive_local())
            .push_bind(rec.client_ip.as_str())
            .push_bind(rec.http_method.as_str())
            .push_bind(rec.requested_path.as_str())
            .push_bind(rec.elb_status_code)
            .push_bind(rec.backend_status_code)
            .push_bind(rec.total_processing_time_ms)
            .push_bind(rec.received_bytes)
            .push_bind(rec.sent_bytes)
            .push_bind(rec.user_agent_full.as_str())
            .push_bind(rec.ua_browser_family.as_str())
            .push_bind(rec.ua_os_family.as_str())
            .push_bind(rec.log_source_file.as_str());
    });
    builder
}

/// Insert a batch of records in one statement.
pub async fn insert_batch(pool: &MySqlPool, records: &[NormalizedRecord]) -> Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }
    let result = build_insert(records).build().execute(pool).await?;
    Ok(result.rows_affected())
}
