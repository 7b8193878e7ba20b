//! ELB log loader: library crate for the `elb-etl` binary.
//!
//! Lists gzip-compressed ALB access logs in S3, parses every line with
//! `elb-log-parser`, and appends the records to MySQL in batches. Storage
//! and sink are trait objects so tests (and `elb-e2e-tests`) can run the
//! whole pipeline in memory.

pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod mock;
pub mod pipeline;
pub mod store;

pub use config::EtlConfig;
pub use db::{MySqlSink, RecordSink};
pub use error::{EtlError, EtlResult};
pub use mock::{MemorySink, MockObjectStore};
pub use pipeline::{EtlPipeline, RunSummary};
pub use store::{ObjectStore, S3ObjectStore};
