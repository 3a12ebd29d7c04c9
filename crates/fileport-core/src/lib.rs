//! Fileport Core Library
//!
//! This crate provides the backend kind tag and the per-backend configuration
//! types shared by the uploader implementations in `fileport-storage`.

pub mod config;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AliyunConfig, BackendConfig, LocalConfig, QiniuConfig, TencentConfig};
pub use storage_types::{BackendKind, UnknownBackendKind};
// Note: Uploader, StorageError, StorageResult live in the fileport-storage crate
