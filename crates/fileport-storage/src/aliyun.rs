//! Aliyun OSS through its S3-compatible endpoint.

use crate::s3::{public_base_url, strip_scheme, S3Settings, S3Storage};
use crate::traits::{StorageError, StorageResult};
use crate::BackendKind;
use fileport_core::AliyunConfig;

/// Derive S3 settings from an OSS configuration.
///
/// `endpoint` is the regional host (`oss-cn-hangzhou.aliyuncs.com`), with or
/// without a scheme. Objects are addressed as `{bucket}.{endpoint}`.
pub fn settings(config: &AliyunConfig) -> StorageResult<S3Settings> {
    if config.endpoint.trim().is_empty()
        || config.access_key_id.trim().is_empty()
        || config.access_key_secret.trim().is_empty()
        || config.bucket_name.trim().is_empty()
    {
        return Err(StorageError::ConfigError(
            "aliyun OSS configuration is incomplete: endpoint, access_key_id, access_key_secret and bucket_name are required"
                .to_string(),
        ));
    }

    let host = strip_scheme(&config.endpoint);
    let scheme = if config.endpoint.trim().starts_with("http://") {
        "http"
    } else {
        "https"
    };
    let bucket = config.bucket_name.trim().to_string();
    let bucket_host = format!("{}.{}", bucket, host);

    Ok(S3Settings {
        kind: BackendKind::Aliyun,
        region: region_from_host(host),
        endpoint: format!("{}://{}", scheme, bucket_host),
        public_base_url: public_base_url(&config.domain, &bucket_host),
        access_key_id: config.access_key_id.trim().to_string(),
        secret_access_key: config.access_key_secret.trim().to_string(),
        bucket,
    })
}

/// Create the OSS uploader. Reachability is checked on first use.
pub fn connect(config: &AliyunConfig) -> StorageResult<S3Storage> {
    S3Storage::new(settings(config)?)
}

/// `oss-cn-hangzhou.aliyuncs.com` and `oss-cn-hangzhou-internal.aliyuncs.com`
/// both sign for `oss-cn-hangzhou`.
fn region_from_host(host: &str) -> String {
    let first = host.split('.').next().unwrap_or(host);
    first.trim_end_matches("-internal").to_string()
}
