//! Loader configuration, read from environment variables.

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use crate::error::{EtlError, EtlResult};

/// Rows per INSERT upper bound: 13 columns must stay under MySQL's
/// 65 535 placeholder limit.
pub const MAX_BATCH_SIZE: usize = 5000;

/// Top-level loader configuration.
#[derive(Clone, Deserialize)]
pub struct EtlConfig {
    /// S3 bucket holding the access logs (AWS_BUCKET_NAME).
    pub bucket: String,
    /// Key prefix to list under (AWS_LOG_PREFIX).
    #[serde(default)]
    pub prefix: String,
    /// AWS region override; None uses the default provider chain.
    #[serde(default)]
    pub region: Option<String>,
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    pub db_user: String,
    #[serde(default)]
    pub db_pass: String,
    pub db_name: String,
    /// Records per INSERT statement (ETL_BATCH_SIZE).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_db_port() -> u16 {
    3306
}

fn default_batch_size() -> usize {
    1000
}

impl EtlConfig {
    /// Load config from process environment variables.
    pub fn from_env() -> EtlResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EtlResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| EtlError::Config(format!("{key} is not set")))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_port: u16 = match optional("DB_PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| EtlError::Config(format!("DB_PORT is not a port: {v}")))?,
            None => default_db_port(),
        };
        let batch_size: usize = match optional("ETL_BATCH_SIZE") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| EtlError::Config(format!("ETL_BATCH_SIZE is not a number: {v}")))?,
            None => default_batch_size(),
        };

        let config = Self {
            bucket: required("AWS_BUCKET_NAME")?,
            prefix: lookup("AWS_LOG_PREFIX").unwrap_or_default(),
            region: optional("AWS_REGION"),
            db_host: required("DB_HOST")?,
            db_port,
            db_user: required("DB_USER")?,
            db_pass: lookup("DB_PASS").unwrap_or_default(),
            db_name: required("DB_NAME")?,
            batch_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> EtlResult<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(EtlError::Config(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }

    /// MySQL connection options (credentials are not URL-encoded).
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_pass)
            .database(&self.db_name)
    }
}

impl std::fmt::Debug for EtlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtlConfig")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("region", &self.region)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_pass", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
