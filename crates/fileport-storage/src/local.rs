use crate::keys::generate_object_key;
use crate::traits::{ensure_locator, ensure_upload_input, StorageError, StorageResult, Uploader};
use crate::BackendKind;
use async_trait::async_trait;
use fileport_core::LocalConfig;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Local filesystem uploader
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// The base directory (`storage/uploads` when unset) is created if it does
    /// not exist. A base path that points at a regular file is rejected.
    pub async fn new(config: &LocalConfig) -> StorageResult<Self> {
        let base_path = PathBuf::from(config.effective_base_path());

        if let Ok(meta) = fs::metadata(&base_path).await {
            if !meta.is_dir() {
                return Err(StorageError::ConfigError(format!(
                    "Storage base path {} is not a directory",
                    base_path.display()
                )));
            }
        }

        create_dir(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a locator to a filesystem path under the base directory.
    ///
    /// Absolute paths and `..` segments are rejected so a locator can never
    /// reach outside the storage directory.
    fn key_to_path(&self, locator: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(locator);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !contained || locator.starts_with('/') || locator.starts_with('\\') {
            return Err(StorageError::InvalidInput(format!(
                "path {} resolves outside the storage directory",
                locator
            )));
        }

        Ok(self.base_path.join(relative))
    }

    /// Locator returned to callers: the path relative to the base directory,
    /// or the full path if it cannot be expressed relatively.
    fn locator_for(&self, path: &Path) -> String {
        match path.strip_prefix(&self.base_path) {
            Ok(relative) => relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.display().to_string(),
        }
    }

    /// Ensure the date directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            create_dir(parent).await.map_err(|e| {
                StorageError::backend(
                    format!("Failed to create storage directory {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

async fn create_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(path).await
}

async fn create_file(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);
    options.open(path).await
}

#[async_trait]
impl Uploader for LocalStorage {
    async fn upload_binary(&self, filename: &str, content: Vec<u8>) -> StorageResult<String> {
        ensure_upload_input(filename, &content)?;

        let key = generate_object_key(filename);
        let path = self.key_to_path(&key)?;
        let size = content.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = create_file(&path).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "Local storage create failed");
            StorageError::backend(format!("Failed to create file {}", path.display()), e)
        })?;

        file.write_all(&content).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "Local storage write failed");
            StorageError::backend(format!("Failed to write file {}", path.display()), e)
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::backend(format!("Failed to sync file {}", path.display()), e)
        })?;

        let locator = self.locator_for(&path);

        tracing::info!(
            path = %path.display(),
            key = %locator,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(locator)
    }

    async fn delete(&self, locator: &str) -> StorageResult<()> {
        ensure_locator(locator)?;
        let path = self.key_to_path(locator)?;
        let start = std::time::Instant::now();

        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                return StorageError::NotFound(path.display().to_string());
            }
            tracing::error!(error = %e, path = %path.display(), "Local storage delete failed");
            StorageError::backend(format!("Failed to delete file {}", path.display()), e)
        })?;

        tracing::info!(
            path = %path.display(),
            key = %locator,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, locator: &str) -> StorageResult<bool> {
        ensure_locator(locator)?;
        let path = self.key_to_path(locator)?;
        fs::try_exists(&path).await.map_err(|e| {
            StorageError::backend(format!("Failed to stat file {}", path.display()), e)
        })
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
