//! Blob store for original upload bytes, backed by any S3-compatible
//! endpoint (MinIO in development).

use crate::config::StorageConfig;
use crate::error::{PipelineError, Result};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::info;

pub struct SpreadsheetStore {
    bucket: Bucket,
}

impl SpreadsheetStore {
    pub fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket_name: &str,
    ) -> Result<Self> {
        let region = Region::Custom {
            region: "us-east-1".to_owned(),
            endpoint: endpoint.to_owned(),
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        // Path-style access, required for MinIO
        let bucket = *bucket.with_path_style();

        Ok(SpreadsheetStore { bucket })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let region = Region::Custom {
            region: config.get_region().to_owned(),
            endpoint: config.endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(
                config
                    .get_access_key()
                    .map_err(|e| PipelineError::Storage(e.to_string()))?,
            ),
            Some(
                config
                    .get_secret_key()
                    .map_err(|e| PipelineError::Storage(e.to_string()))?,
            ),
            None,
            None,
            None,
        )
        .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let bucket = Bucket::new(&config.bucket_name, region, credentials)
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let bucket = if config.is_path_style() {
            *bucket.with_path_style()
        } else {
            *bucket
        };

        Ok(SpreadsheetStore { bucket })
    }

    pub async fn ensure_bucket(&self) -> Result<()> {
        match self.bucket.exists().await {
            Ok(true) => {
                info!("Bucket '{}' already exists", self.bucket.name);
                Ok(())
            }
            Ok(false) => {
                let config = s3::BucketConfiguration::default();
                s3::Bucket::create(
                    &self.bucket.name,
                    self.bucket.region.clone(),
                    self.bucket
                        .credentials()
                        .await
                        .map_err(|e| PipelineError::Storage(e.to_string()))?,
                    config,
                )
                .await
                .map_err(|e| PipelineError::Storage(format!("Failed to create bucket: {e}")))?;
                info!("Created bucket: {}", self.bucket.name);
                Ok(())
            }
            Err(e) => Err(PipelineError::Storage(format!(
                "Failed to check bucket existence: {e}"
            ))),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.bucket.head_object(key).await.is_ok()
    }

    /// Store raw upload bytes under `key`. Unless `overwrite` is set, an
    /// existing object at that key is an error.
    pub async fn put(&self, key: &str, bytes: &[u8], overwrite: bool) -> Result<()> {
        if !overwrite && self.exists(key).await {
            return Err(PipelineError::Storage(format!(
                "Object already exists: {key}"
            )));
        }

        let response = self
            .bucket
            .put_object(key, bytes)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        if response.status_code() == 200 {
            info!("Stored upload: {key} ({} bytes)", bytes.len());
            Ok(())
        } else {
            Err(PipelineError::Storage(format!(
                "Failed to store object: HTTP {}",
                response.status_code()
            )))
        }
    }

    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        if response.status_code() == 200 {
            Ok(response.bytes().to_vec())
        } else {
            Err(PipelineError::Storage(format!(
                "Failed to get object: HTTP {}",
                response.status_code()
            )))
        }
    }

    /// Presigned download URL for sharing an original file.
    pub async fn signed_url(&self, key: &str, ttl_secs: u32) -> Result<String> {
        self.bucket
            .presign_get(key, ttl_secs, None)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket.name
    }
}
