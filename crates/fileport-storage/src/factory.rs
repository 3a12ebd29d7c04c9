#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::{aliyun, qiniu, tencent};
use crate::{BackendConfig, BackendKind, StorageError, StorageResult, Uploader};
use std::sync::Arc;

/// Create an uploader of `kind` from `config`.
///
/// The configuration variant must match `kind`, otherwise
/// `StorageError::InvalidConfig` is returned and no backend is touched. Field
/// validation is left to the backend constructor. Only the Tencent backend
/// talks to the network here, to verify its bucket.
pub async fn create_uploader(
    kind: BackendKind,
    config: BackendConfig,
) -> StorageResult<Arc<dyn Uploader>> {
    tracing::debug!(backend = %kind, "Creating uploader");

    let uploader: Arc<dyn Uploader> = match (kind, config) {
        #[cfg(feature = "storage-local")]
        (BackendKind::Local, BackendConfig::Local(cfg)) => {
            Arc::new(LocalStorage::new(&cfg).await?)
        }

        #[cfg(not(feature = "storage-local"))]
        (BackendKind::Local, BackendConfig::Local(_)) => {
            return Err(StorageError::ConfigError(
                "Local storage backend not available (storage-local feature not enabled)"
                    .to_string(),
            ))
        }

        #[cfg(feature = "storage-s3")]
        (BackendKind::Qiniu, BackendConfig::Qiniu(cfg)) => Arc::new(qiniu::connect(&cfg)?),

        #[cfg(feature = "storage-s3")]
        (BackendKind::Aliyun, BackendConfig::Aliyun(cfg)) => Arc::new(aliyun::connect(&cfg)?),

        #[cfg(feature = "storage-s3")]
        (BackendKind::Tencent, BackendConfig::Tencent(cfg)) => {
            Arc::new(tencent::connect(&cfg).await?)
        }

        #[cfg(not(feature = "storage-s3"))]
        (
            kind @ (BackendKind::Qiniu | BackendKind::Aliyun | BackendKind::Tencent),
            config,
        ) if config.kind() == kind => {
            return Err(StorageError::ConfigError(format!(
                "{} storage backend not available (storage-s3 feature not enabled)",
                kind
            )))
        }

        (expected, config) => {
            return Err(StorageError::InvalidConfig {
                expected,
                found: config.kind(),
            })
        }
    };

    tracing::info!(backend = %kind, "Uploader initialized");
    Ok(uploader)
}

/// Create an uploader from a backend name such as `"local"` or `"tencent"`.
///
/// Unknown names fail with `StorageError::UnsupportedType`.
pub async fn create_uploader_for(
    kind: &str,
    config: BackendConfig,
) -> StorageResult<Arc<dyn Uploader>> {
    let kind: BackendKind = kind.parse()?;
    create_uploader(kind, config).await
}

/// Create the uploader the configuration variant describes.
pub async fn create_uploader_from_config(
    config: BackendConfig,
) -> StorageResult<Arc<dyn Uploader>> {
    create_uploader(config.kind(), config).await
}

/// Create an uploader for testing (uses local storage in a fresh directory)
#[cfg(all(test, feature = "storage-local"))]
pub async fn create_test_uploader() -> StorageResult<(tempfile::TempDir, Arc<dyn Uploader>)> {
    use fileport_core::LocalConfig;

    let temp_dir = tempfile::tempdir().map_err(|e| StorageError::backend("tempdir", e))?;
    let config = LocalConfig::new(temp_dir.path().to_string_lossy());
    let uploader = create_uploader(BackendKind::Local, config.into()).await?;
    Ok((temp_dir, uploader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileport_core::{AliyunConfig, LocalConfig, QiniuConfig, TencentConfig};

    #[tokio::test]
    async fn local_kind_with_local_config() {
        let (_dir, uploader) = create_test_uploader().await.unwrap();
        assert_eq!(uploader.backend_kind(), BackendKind::Local);
    }

    #[tokio::test]
    async fn wrong_variant_is_invalid_config() {
        let result = create_uploader(BackendKind::Local, QiniuConfig::default().into()).await;
        assert!(matches!(
            result,
            Err(StorageError::InvalidConfig {
                expected: BackendKind::Local,
                found: BackendKind::Qiniu
            })
        ));

        let result = create_uploader(BackendKind::Tencent, LocalConfig::default().into()).await;
        assert!(matches!(result, Err(StorageError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn unknown_kind_is_unsupported() {
        let result = create_uploader_for("not-a-real-kind", LocalConfig::default().into()).await;
        assert!(
            matches!(result, Err(StorageError::UnsupportedType(ref k)) if k == "not-a-real-kind")
        );
    }

    #[tokio::test]
    async fn incomplete_provider_config_fails_in_constructor() {
        let result = create_uploader(BackendKind::Qiniu, QiniuConfig::default().into()).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));

        let result = create_uploader(BackendKind::Tencent, TencentConfig::default().into()).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[cfg(feature = "storage-s3")]
    #[tokio::test]
    async fn aliyun_is_built_without_network() {
        let config = AliyunConfig {
            endpoint: "oss-cn-hangzhou.aliyuncs.com".to_string(),
            access_key_id: "LTAIexample".to_string(),
            access_key_secret: "secret".to_string(),
            bucket_name: "media".to_string(),
            domain: String::new(),
        };

        let uploader = create_uploader_from_config(config.into()).await.unwrap();
        assert_eq!(uploader.backend_kind(), BackendKind::Aliyun);
    }
}
