//! Configuration module
//!
//! Plain configuration records, one per storage backend, plus the
//! `BackendConfig` union the uploader factory consumes. Records carry no
//! behaviour; field-level validation happens in the backend constructors.
//!
//! Configs can be built programmatically, deserialized (for example from TOML,
//! tagged by a `backend` field) or read from the environment.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage_types::BackendKind;

/// Base path used by the local backend when none is configured
pub const DEFAULT_LOCAL_BASE_PATH: &str = "storage/uploads";

/// Environment variable naming the backend `BackendConfig::from_env` loads
pub const BACKEND_ENV_VAR: &str = "UPLOADER_BACKEND";

/// Local filesystem storage
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Root directory for stored files. Empty means `storage/uploads`.
    pub base_path: String,
}

impl LocalConfig {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Configured base path, or the default when unset
    pub fn effective_base_path(&self) -> &str {
        if self.base_path.trim().is_empty() {
            DEFAULT_LOCAL_BASE_PATH
        } else {
            &self.base_path
        }
    }
}

/// Qiniu Kodo
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QiniuConfig {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Public domain bound to the bucket, e.g. `cdn.example.com`
    pub domain: String,
    /// Region id such as `cn-east-1`
    pub region: String,
}

/// Aliyun OSS
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliyunConfig {
    /// Regional endpoint host, e.g. `oss-cn-hangzhou.aliyuncs.com`
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub bucket_name: String,
    pub domain: String,
}

/// Tencent COS
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TencentConfig {
    pub secret_id: String,
    pub secret_key: String,
    /// Bucket name including the APPID suffix, e.g. `media-1250000000`
    pub bucket_name: String,
    pub region: String,
    pub domain: String,
}

/// Configuration for exactly one backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    Local(LocalConfig),
    Qiniu(QiniuConfig),
    Aliyun(AliyunConfig),
    Tencent(TencentConfig),
}

impl BackendConfig {
    /// The backend kind this configuration is shaped for
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Local(_) => BackendKind::Local,
            BackendConfig::Qiniu(_) => BackendKind::Qiniu,
            BackendConfig::Aliyun(_) => BackendKind::Aliyun,
            BackendConfig::Tencent(_) => BackendKind::Tencent,
        }
    }

    /// Load the backend selected by `UPLOADER_BACKEND` (default `local`).
    ///
    /// Reads a `.env` file when present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`BackendConfig::from_env`], resolving variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = non_empty(&lookup, BACKEND_ENV_VAR).unwrap_or_else(|| "local".to_string());
        let kind: BackendKind = backend.parse()?;

        let config = match kind {
            BackendKind::Local => BackendConfig::Local(LocalConfig::from_lookup(&lookup)),
            BackendKind::Qiniu => BackendConfig::Qiniu(
                QiniuConfig::from_lookup(&lookup).ok_or_else(|| {
                    anyhow::anyhow!(
                        "QINIU_ACCESS_KEY and QINIU_SECRET_KEY must be set when UPLOADER_BACKEND=qiniu"
                    )
                })?,
            ),
            BackendKind::Aliyun => BackendConfig::Aliyun(
                AliyunConfig::from_lookup(&lookup).ok_or_else(|| {
                    anyhow::anyhow!(
                        "ALI_ACCESS_KEY and ALI_SECRET_KEY must be set when UPLOADER_BACKEND=aliyun"
                    )
                })?,
            ),
            BackendKind::Tencent => BackendConfig::Tencent(
                TencentConfig::from_lookup(&lookup).ok_or_else(|| {
                    anyhow::anyhow!(
                        "TENCENT_SECRET_ID and TENCENT_SECRET_KEY must be set when UPLOADER_BACKEND=tencent"
                    )
                })?,
            ),
        };

        Ok(config)
    }
}

impl From<LocalConfig> for BackendConfig {
    fn from(config: LocalConfig) -> Self {
        BackendConfig::Local(config)
    }
}

impl From<QiniuConfig> for BackendConfig {
    fn from(config: QiniuConfig) -> Self {
        BackendConfig::Qiniu(config)
    }
}

impl From<AliyunConfig> for BackendConfig {
    fn from(config: AliyunConfig) -> Self {
        BackendConfig::Aliyun(config)
    }
}

impl From<TencentConfig> for BackendConfig {
    fn from(config: TencentConfig) -> Self {
        BackendConfig::Tencent(config)
    }
}

impl LocalConfig {
    /// Reads `LOCAL_STORAGE_PATH`; always succeeds since the path has a default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        Self {
            base_path: non_empty(&lookup, "LOCAL_STORAGE_PATH").unwrap_or_default(),
        }
    }
}

impl QiniuConfig {
    /// Returns `None` unless `QINIU_ACCESS_KEY` and `QINIU_SECRET_KEY` are set.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<Self> {
        Some(Self {
            access_key: non_empty(&lookup, "QINIU_ACCESS_KEY")?,
            secret_key: non_empty(&lookup, "QINIU_SECRET_KEY")?,
            bucket: non_empty(&lookup, "QINIU_BUCKET").unwrap_or_default(),
            domain: non_empty(&lookup, "QINIU_DOMAIN").unwrap_or_default(),
            region: non_empty(&lookup, "QINIU_REGION").unwrap_or_default(),
        })
    }
}

impl AliyunConfig {
    /// Returns `None` unless `ALI_ACCESS_KEY` and `ALI_SECRET_KEY` are set.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<Self> {
        Some(Self {
            access_key_id: non_empty(&lookup, "ALI_ACCESS_KEY")?,
            access_key_secret: non_empty(&lookup, "ALI_SECRET_KEY")?,
            endpoint: non_empty(&lookup, "ALI_ENDPOINT").unwrap_or_default(),
            bucket_name: non_empty(&lookup, "ALI_BUCKET").unwrap_or_default(),
            domain: non_empty(&lookup, "ALI_DOMAIN").unwrap_or_default(),
        })
    }
}

impl TencentConfig {
    /// Returns `None` unless `TENCENT_SECRET_ID` and `TENCENT_SECRET_KEY` are set.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<Self> {
        Some(Self {
            secret_id: non_empty(&lookup, "TENCENT_SECRET_ID")?,
            secret_key: non_empty(&lookup, "TENCENT_SECRET_KEY")?,
            bucket_name: non_empty(&lookup, "TENCENT_BUCKET").unwrap_or_default(),
            region: non_empty(&lookup, "TENCENT_REGION").unwrap_or_default(),
            domain: non_empty(&lookup, "TENCENT_DOMAIN").unwrap_or_default(),
        })
    }
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Credentials never end up in logs or panic messages.
fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

impl fmt::Debug for QiniuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiniuConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &redact(&self.secret_key))
            .field("bucket", &self.bucket)
            .field("domain", &self.domain)
            .field("region", &self.region)
            .finish()
    }
}

impl fmt::Debug for AliyunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliyunConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &redact(&self.access_key_secret))
            .field("bucket_name", &self.bucket_name)
            .field("domain", &self.domain)
            .finish()
    }
}

impl fmt::Debug for TencentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TencentConfig")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &redact(&self.secret_key))
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("domain", &self.domain)
            .finish()
    }
}
