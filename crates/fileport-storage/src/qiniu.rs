//! Qiniu Kodo through its S3-compatible endpoint.

use crate::s3::{public_base_url, S3Settings, S3Storage};
use crate::traits::{StorageError, StorageResult};
use crate::BackendKind;
use fileport_core::QiniuConfig;

/// Region used when the configuration leaves it blank (East China)
pub const DEFAULT_REGION: &str = "cn-east-1";

/// Derive S3 settings from a Qiniu configuration.
///
/// Requires the access key, secret key and bucket.
pub fn settings(config: &QiniuConfig) -> StorageResult<S3Settings> {
    let mut missing = Vec::new();
    if config.access_key.trim().is_empty() {
        missing.push("access_key");
    }
    if config.secret_key.trim().is_empty() {
        missing.push("secret_key");
    }
    if config.bucket.trim().is_empty() {
        missing.push("bucket");
    }
    if !missing.is_empty() {
        return Err(StorageError::ConfigError(format!(
            "qiniu config is incomplete, missing: {}",
            missing.join(", ")
        )));
    }

    let bucket = config.bucket.trim().to_string();
    let region = match config.region.trim() {
        "" => {
            tracing::warn!(
                bucket = %bucket,
                region = DEFAULT_REGION,
                "Qiniu region not set, using default"
            );
            DEFAULT_REGION.to_string()
        }
        region => region.to_string(),
    };
    let bucket_host = format!("{}.s3.{}.qiniucs.com", bucket, region);

    Ok(S3Settings {
        kind: BackendKind::Qiniu,
        endpoint: format!("https://{}", bucket_host),
        public_base_url: public_base_url(&config.domain, &bucket_host),
        access_key_id: config.access_key.trim().to_string(),
        secret_access_key: config.secret_key.trim().to_string(),
        bucket,
        region,
    })
}

/// Create the Qiniu uploader. Reachability is checked on first use.
pub fn connect(config: &QiniuConfig) -> StorageResult<S3Storage> {
    S3Storage::new(settings(config)?)
}
