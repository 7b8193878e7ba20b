//! Object store abstraction for listing and fetching log objects from S3 or mocks.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;

use crate::config::EtlConfig;
use crate::error::{EtlError, EtlResult};

/// Read access to a bucket of log objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All object keys under `prefix`, across every listing page.
    async fn list_keys(&self, prefix: &str) -> EtlResult<Vec<String>>;

    /// Full body of one object.
    async fn fetch(&self, key: &str) -> EtlResult<Vec<u8>>;
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a store with a pre-built S3 client.
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the AWS default provider chain.
    pub async fn from_config(config: &EtlConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        Self::new(S3Client::new(&sdk_config), config.bucket.clone())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, prefix: &str) -> EtlResult<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                EtlError::Storage(format!(
                    "list s3://{}/{prefix}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|obj| obj.key())
                    .map(String::from),
            );
        }
        Ok(keys)
    }

    async fn fetch(&self, key: &str) -> EtlResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                EtlError::Storage(format!(
                    "get s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| EtlError::Storage(format!("read s3://{}/{key}: {e}", self.bucket)))?;
        Ok(body.into_bytes().to_vec())
    }
}
