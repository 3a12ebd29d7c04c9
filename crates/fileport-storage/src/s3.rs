//! S3-compatible object storage uploader.
//!
//! Qiniu Kodo, Aliyun OSS and Tencent COS all expose S3-compatible APIs, so a
//! single `object_store` client serves the three of them. The provider modules
//! only derive the endpoint, region and public URL for this type.

use crate::keys::generate_object_key;
use crate::traits::{ensure_locator, ensure_upload_input, StorageError, StorageResult, Uploader};
use crate::BackendKind;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::fmt;

/// Characters left unescaped in a URL path segment (RFC 3986 unreserved)
const URL_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Connection settings for one S3-compatible bucket
#[derive(Clone)]
pub struct S3Settings {
    pub kind: BackendKind,
    pub bucket: String,
    pub region: String,
    /// Virtual-hosted bucket endpoint, e.g. `https://media.oss-cn-hangzhou.aliyuncs.com`
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Prefix of returned object URLs, without a trailing slash
    pub public_base_url: String,
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("kind", &self.kind)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

/// S3-compatible uploader
#[derive(Clone, Debug)]
pub struct S3Storage {
    store: AmazonS3,
    kind: BackendKind,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    /// Build the client. No request is sent; see [`S3Storage::verify_bucket`].
    pub fn new(settings: S3Settings) -> StorageResult<Self> {
        let allow_http = settings.endpoint.starts_with("http://");

        let store = AmazonS3Builder::new()
            .with_region(settings.region.clone())
            .with_bucket_name(settings.bucket.clone())
            .with_access_key_id(settings.access_key_id.clone())
            .with_secret_access_key(settings.secret_access_key.clone())
            .with_endpoint(settings.endpoint.clone())
            .with_virtual_hosted_style_request(true)
            .with_allow_http(allow_http)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            kind: settings.kind,
            bucket: settings.bucket,
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Confirm the bucket is reachable with the configured credentials by
    /// listing at most one page of objects.
    ///
    /// The credentials need list permission on the bucket (the same grant a
    /// bucket HEAD needs on S3). Upload-only keys fail here with
    /// `StorageError::Backend`; build the uploader with [`S3Storage::new`] to
    /// skip the check.
    pub async fn verify_bucket(&self) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let mut listing = self.store.list(None);

        if let Some(Err(e)) = listing.next().await {
            tracing::error!(
                error = %e,
                backend = %self.kind,
                bucket = %self.bucket,
                "Bucket connectivity check failed"
            );
            return Err(StorageError::backend(
                format!("Failed to connect to {} bucket {}", self.kind, self.bucket),
                e,
            ));
        }

        tracing::debug!(
            backend = %self.kind,
            bucket = %self.bucket,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Bucket connectivity check passed"
        );
        Ok(())
    }

    /// Public URL of an object key. Each key segment is percent-encoded.
    pub fn public_url(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, URL_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.public_base_url, encoded)
    }

    /// Object key for a locator.
    ///
    /// Accepts a bare key, a URL produced by [`S3Storage::public_url`], or any
    /// other `scheme://host/key` URL. URL paths are percent-decoded; bare
    /// keys are taken literally.
    pub fn object_key<'a>(&self, locator: &'a str) -> Cow<'a, str> {
        let locator = locator.trim();

        if let Some(key) = locator
            .strip_prefix(self.public_base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return percent_decode_str(key).decode_utf8_lossy();
        }

        if let Some(rest) = locator
            .strip_prefix("https://")
            .or_else(|| locator.strip_prefix("http://"))
        {
            let key = rest.split_once('/').map(|(_, key)| key).unwrap_or("");
            return percent_decode_str(key).decode_utf8_lossy();
        }

        Cow::Borrowed(locator.trim_start_matches('/'))
    }

    fn location_for(&self, locator: &str) -> StorageResult<Path> {
        ensure_locator(locator)?;
        let key = self.object_key(locator);
        if key.is_empty() {
            return Err(StorageError::InvalidInput(format!(
                "no object key in {}",
                locator
            )));
        }
        object_path(&key)
    }
}

/// Object store path holding `key` verbatim. Keys with empty segments or
/// control characters are rejected rather than escaped.
fn object_path(key: &str) -> StorageResult<Path> {
    Path::parse(key)
        .map_err(|e| StorageError::InvalidInput(format!("invalid object key {}: {}", key, e)))
}

#[async_trait]
impl Uploader for S3Storage {
    async fn upload_binary(&self, filename: &str, content: Vec<u8>) -> StorageResult<String> {
        ensure_upload_input(filename, &content)?;

        let key = generate_object_key(filename);
        let location = object_path(&key)?;
        let size = content.len() as u64;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(Bytes::from(content)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.kind,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::backend(format!("Failed to upload {} to {}", key, self.kind), e)
        })?;

        let url = self.public_url(&key);

        tracing::info!(
            backend = %self.kind,
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, locator: &str) -> StorageResult<()> {
        let location = self.location_for(locator)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.kind,
                bucket = %self.bucket,
                key = %location,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object delete failed"
            );
            StorageError::backend(format!("Failed to delete {} from {}", location, self.kind), e)
        })?;

        tracing::info!(
            backend = %self.kind,
            bucket = %self.bucket,
            key = %location,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(())
    }

    async fn exists(&self, locator: &str) -> StorageResult<bool> {
        let location = self.location_for(locator)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::backend(
                format!("Failed to stat {} on {}", location, self.kind),
                e,
            )),
        }
    }

    fn backend_kind(&self) -> BackendKind {
        self.kind
    }
}

/// Host part of an endpoint that may or may not carry a scheme
pub(crate) fn strip_scheme(endpoint: &str) -> &str {
    let endpoint = endpoint.trim();
    endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .unwrap_or(endpoint)
        .trim_end_matches('/')
}

/// `https://{domain}` when a custom domain is configured, otherwise the
/// provider-derived bucket host.
pub(crate) fn public_base_url(domain: &str, bucket_host: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.is_empty() {
        format!("https://{}", bucket_host)
    } else if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}
