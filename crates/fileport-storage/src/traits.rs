//! Uploader abstraction trait
//!
//! This module defines the Uploader trait that all storage backends implement,
//! the error type they share, and the `UploadedFile` handle accepted by
//! `upload_file`.

use crate::BackendKind;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use fileport_core::UnknownBackendKind;
use std::fmt;
use std::io::Cursor;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Uploader operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// A caller-supplied argument violates a precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The configuration variant does not match the requested backend kind
    #[error("Invalid config for {expected} uploader: got {found} configuration")]
    InvalidConfig {
        expected: BackendKind,
        found: BackendKind,
    },

    #[error("Unsupported uploader type: {0}")]
    UnsupportedType(String),

    #[error("Failed to decode base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("File not found: {0}")]
    NotFound(String),

    /// Field-level configuration problem detected by a backend constructor
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The filesystem or object store rejected the operation
    #[error("{message}: {source}")]
    Backend {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    pub fn backend(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::Backend {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl From<UnknownBackendKind> for StorageError {
    fn from(err: UnknownBackendKind) -> Self {
        StorageError::UnsupportedType(err.0)
    }
}

/// Result type for uploader operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An uploaded file: original name, a readable byte stream and, when known,
/// the declared size.
pub struct UploadedFile {
    filename: String,
    size: Option<u64>,
    reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            filename: filename.into(),
            size: None,
            reader: Box::pin(reader),
        }
    }

    /// Wrap content that is already in memory
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();
        let size = data.len() as u64;
        Self::new(filename, Cursor::new(data)).with_size(size)
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Drain the stream, returning the filename and the full content
    pub async fn into_content(mut self) -> std::io::Result<(String, Vec<u8>)> {
        let capacity = self.size.unwrap_or(0).min(64 * 1024 * 1024) as usize;
        let mut buffer = Vec::with_capacity(capacity);
        self.reader.read_to_end(&mut buffer).await?;
        Ok((self.filename, buffer))
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("filename", &self.filename)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Uploader abstraction trait
///
/// Implemented by the local filesystem backend and the S3-compatible object
/// storage backends. Implementations are read-only after construction, so a
/// single instance can serve concurrent calls.
///
/// **Locators:** uploads return a URL for remote backends and a path relative
/// to the base directory for local storage. `delete` and `exists` accept the
/// bare object key or whatever the upload returned.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload a file handle, reading its stream to the end first.
    async fn upload_file(&self, file: UploadedFile) -> StorageResult<String> {
        if file.filename().trim().is_empty() {
            return Err(StorageError::InvalidInput(
                "file name cannot be empty".to_string(),
            ));
        }
        if file.size() == Some(0) {
            return Err(StorageError::InvalidInput("file cannot be empty".to_string()));
        }

        let (filename, content) = file
            .into_content()
            .await
            .map_err(|e| StorageError::backend("Failed to read uploaded file", e))?;

        self.upload_binary(&filename, content).await
    }

    /// Store `content` under a key derived from `filename` and return its locator.
    ///
    /// The filename only contributes the base name and extension of the key.
    async fn upload_binary(&self, filename: &str, content: Vec<u8>) -> StorageResult<String>;

    /// Decode standard base64 and upload the result.
    async fn upload_base64(&self, filename: &str, encoded: &str) -> StorageResult<String> {
        if encoded.is_empty() {
            return Err(StorageError::InvalidInput(
                "base64 content cannot be empty".to_string(),
            ));
        }

        let content = STANDARD.decode(encoded)?;
        self.upload_binary(filename, content).await
    }

    /// Delete a previously uploaded object
    async fn delete(&self, locator: &str) -> StorageResult<()>;

    /// Check whether an object exists
    async fn exists(&self, locator: &str) -> StorageResult<bool>;

    /// Get the backend kind
    fn backend_kind(&self) -> BackendKind;
}

/// Preconditions shared by every `upload_binary` implementation.
pub(crate) fn ensure_upload_input(filename: &str, content: &[u8]) -> StorageResult<()> {
    if filename.trim().is_empty() {
        return Err(StorageError::InvalidInput(
            "file name cannot be empty".to_string(),
        ));
    }
    if content.is_empty() {
        return Err(StorageError::InvalidInput(
            "content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_locator(locator: &str) -> StorageResult<()> {
    if locator.trim().is_empty() {
        return Err(StorageError::InvalidInput(
            "file path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
