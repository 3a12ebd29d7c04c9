//! Fileport Storage Library
//!
//! This crate provides the `Uploader` abstraction and its implementations for
//! the local filesystem and for Qiniu Kodo, Aliyun OSS and Tencent COS.
//!
//! # Storage key format
//!
//! All backends use the same key layout:
//!
//! - `{YYYY}/{MM}/{DD}/{base}_{unix_nanos}{ext}`
//!
//! The local backend returns this key as a path relative to its base
//! directory; remote backends return `https://{domain-or-bucket-host}/{key}`.
//! Key generation is centralized in the `keys` module so all backends stay
//! consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(feature = "storage-s3")]
pub mod qiniu;
#[cfg(feature = "storage-s3")]
pub mod aliyun;
#[cfg(feature = "storage-s3")]
pub mod tencent;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_uploader, create_uploader_for, create_uploader_from_config};
pub use fileport_core::{BackendConfig, BackendKind};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Settings, S3Storage};
pub use traits::{StorageError, StorageResult, UploadedFile, Uploader};
