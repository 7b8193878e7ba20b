//! ELB log loader, run as a one-shot batch job.
//!
//! Reads configuration from the environment, loads every gzip access log
//! under the configured S3 prefix, and appends parsed records to MySQL.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use elb_etl::config::EtlConfig;
use elb_etl::db::{self, MySqlSink};
use elb_etl::pipeline::EtlPipeline;
use elb_etl::store::S3ObjectStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "elb-etl starting");

    // ── Load config ─────────────────────────────────────────────
    let config = EtlConfig::from_env()?;
    tracing::info!(
        bucket = %config.bucket,
        prefix = %config.prefix,
        batch_size = config.batch_size,
        "config loaded"
    );

    // ── Collaborators ───────────────────────────────────────────
    let store = S3ObjectStore::from_config(&config).await;

    tracing::info!(host = %config.db_host, database = %config.db_name, "connecting to MySQL");
    let pool = db::connect(config.connect_options()).await?;
    let sink = MySqlSink::new(pool);

    // ── Run ─────────────────────────────────────────────────────
    let pipeline = EtlPipeline::new(
        Arc::new(store),
        Arc::new(sink),
        config.prefix.clone(),
        config.batch_size,
    );
    let summary = pipeline.run().await?;

    tracing::info!(summary = %serde_json::to_string(&summary)?, "elb-etl finished");
    Ok(())
}
