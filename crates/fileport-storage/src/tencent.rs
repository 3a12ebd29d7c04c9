//! Tencent COS through its S3-compatible endpoint.

use crate::s3::{public_base_url, S3Settings, S3Storage};
use crate::traits::{StorageError, StorageResult};
use crate::BackendKind;
use fileport_core::TencentConfig;

/// Derive S3 settings from a COS configuration.
///
/// Objects are addressed as `{bucket}.cos.{region}.myqcloud.com`.
pub fn settings(config: &TencentConfig) -> StorageResult<S3Settings> {
    if config.secret_id.trim().is_empty()
        || config.secret_key.trim().is_empty()
        || config.bucket_name.trim().is_empty()
        || config.region.trim().is_empty()
    {
        return Err(StorageError::ConfigError(
            "tencent COS configuration is incomplete: secret_id, secret_key, bucket_name and region are required"
                .to_string(),
        ));
    }

    let bucket = config.bucket_name.trim().to_string();
    let region = config.region.trim().to_string();
    let bucket_host = format!("{}.cos.{}.myqcloud.com", bucket, region);

    Ok(S3Settings {
        kind: BackendKind::Tencent,
        endpoint: format!("https://{}", bucket_host),
        public_base_url: public_base_url(&config.domain, &bucket_host),
        access_key_id: config.secret_id.trim().to_string(),
        secret_access_key: config.secret_key.trim().to_string(),
        bucket,
        region,
    })
}

/// Create the COS uploader and verify the bucket answers before returning it.
pub async fn connect(config: &TencentConfig) -> StorageResult<S3Storage> {
    let storage = S3Storage::new(settings(config)?)?;
    storage.verify_bucket().await?;
    Ok(storage)
}
